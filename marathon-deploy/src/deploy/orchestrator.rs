//! End-to-end deploy protocol

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::deploy::fsm::{DeploymentEvent, DeploymentFsm, DeploymentState};
use crate::deploy::gateway::OrchestratorGateway;
use crate::deploy::poll::{Clock, PollOptions};
use crate::deploy::watcher::{ConvergenceReport, ConvergenceWatcher, MissingVersionPolicy};
use crate::deploy::{guard, probe, publisher};
use crate::errors::DeployError;
use crate::models::app::{absolute_app_id, AppSpec};
use crate::models::deployment::PublishOutcome;

/// Deploy protocol settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Wait for a running deployment of the app before updating it
    pub wait_on_running_deployment: bool,

    /// Budget for the running deployment to finish
    pub running_deployment_timeout: Duration,

    /// Wait for the published version to be rolled out
    pub wait_for_successful_deployment: bool,

    /// Rollout budget per instance
    pub successful_deployment_timeout_per_instance: Duration,

    /// Delay between two status checks
    pub poll_interval: Duration,

    /// Delay before the first status check after an update
    pub convergence_initial_delay: Duration,

    /// Handling of a target version that no task runs yet
    pub missing_version_policy: MissingVersionPolicy,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            wait_on_running_deployment: true,
            running_deployment_timeout: Duration::from_secs(300),
            wait_for_successful_deployment: true,
            successful_deployment_timeout_per_instance: Duration::from_secs(300),
            poll_interval: Duration::from_secs(5),
            convergence_initial_delay: Duration::from_secs(10),
            missing_version_policy: MissingVersionPolicy::Reconcile,
        }
    }
}

/// Result of a successful deploy invocation
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub app_id: String,

    /// Whether the app existed before and was updated
    pub updated: bool,

    pub outcome: PublishOutcome,

    /// Present when convergence was awaited
    pub convergence: Option<ConvergenceReport>,

    /// States the invocation went through
    pub states: Vec<DeploymentState>,
}

/// Publishes an app and waits for it to converge
pub struct DeploymentOrchestrator {
    gateway: Arc<dyn OrchestratorGateway>,
    clock: Arc<dyn Clock>,
    options: DeployOptions,
}

impl DeploymentOrchestrator {
    pub fn new(
        gateway: Arc<dyn OrchestratorGateway>,
        clock: Arc<dyn Clock>,
        options: DeployOptions,
    ) -> Self {
        Self {
            gateway,
            clock,
            options,
        }
    }

    /// Run the whole protocol for `spec`
    pub async fn deploy(&self, spec: &AppSpec) -> Result<DeploymentReport, DeployError> {
        let app_id = absolute_app_id(&spec.id);
        let mut fsm = DeploymentFsm::new();

        match self.run_protocol(&mut fsm, &app_id, spec).await {
            Ok(report) => Ok(report),
            Err(e) => {
                let failed_in = fsm.state();
                if let Err(transition_error) = fsm.process(DeploymentEvent::Fail(e.to_string())) {
                    error!("{}", transition_error);
                }
                error!("Deployment of app {} failed while {:?}: {}", app_id, failed_in, e);
                Err(e)
            }
        }
    }

    async fn run_protocol(
        &self,
        fsm: &mut DeploymentFsm,
        app_id: &str,
        spec: &AppSpec,
    ) -> Result<DeploymentReport, DeployError> {
        let gateway = self.gateway.as_ref();
        let clock = self.clock.as_ref();

        transition(fsm, DeploymentEvent::Probe)?;
        let exists = probe::app_exists(gateway, app_id).await?;

        if exists {
            info!("{} already exists - will be updated", app_id);
            if self.options.wait_on_running_deployment {
                transition(fsm, DeploymentEvent::Guard)?;
                let options = PollOptions::new(
                    self.options.poll_interval,
                    self.options.running_deployment_timeout,
                );
                guard::await_no_prior_deployment(gateway, clock, app_id, options).await?;
            }
        } else {
            info!("{} does not exist yet - will be created", app_id);
        }

        transition(fsm, DeploymentEvent::Publish)?;
        let published_at = clock.now();
        let outcome = publisher::publish(gateway, app_id, exists, spec).await?;

        if !self.options.wait_for_successful_deployment {
            transition(fsm, DeploymentEvent::Complete)?;
            info!(
                "App {} version {} accepted, not waiting for the rollout",
                app_id, outcome.version
            );
            return Ok(DeploymentReport {
                app_id: app_id.to_string(),
                updated: exists,
                outcome,
                convergence: None,
                states: fsm.history().to_vec(),
            });
        }

        transition(fsm, DeploymentEvent::AwaitConvergence)?;
        let timeout = outcome
            .convergence_timeout(self.options.successful_deployment_timeout_per_instance);
        let initial_delay = if exists {
            self.options.convergence_initial_delay
        } else {
            Duration::ZERO
        };
        info!(
            "Waiting up to {} seconds for app {} to converge on version {}",
            timeout.as_secs(),
            app_id,
            outcome.version
        );

        let watcher = ConvergenceWatcher::new(gateway, clock, self.options.missing_version_policy);
        let options =
            PollOptions::new(self.options.poll_interval, timeout).with_initial_delay(initial_delay);
        let convergence = watcher
            .await_convergence(app_id, &outcome.version, options, published_at)
            .await?;

        transition(fsm, DeploymentEvent::Complete)?;

        Ok(DeploymentReport {
            app_id: app_id.to_string(),
            updated: exists,
            outcome,
            convergence: Some(convergence),
            states: fsm.history().to_vec(),
        })
    }
}

fn transition(fsm: &mut DeploymentFsm, event: DeploymentEvent) -> Result<DeploymentState, DeployError> {
    let state = fsm.process(event).map_err(DeployError::InvalidTransition)?;
    info!("Deployment state: {:?}", state);
    Ok(state)
}
