//! Wait for a published version to be fully rolled out

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::deploy::gateway::OrchestratorGateway;
use crate::deploy::poll::{Clock, PollOptions, PollTimer};
use crate::errors::{DeployError, GatewayError};
use crate::models::app::AppStatus;
use crate::models::deployment::deploying_versions;

/// What to do when no task runs the target version yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingVersionPolicy {
    /// Look the version up among in-flight deployments and abort when it
    /// is not there either
    #[default]
    Reconcile,

    /// Keep polling and let the timeout decide
    Ignore,
}

impl std::str::FromStr for MissingVersionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reconcile" | "strict" => Ok(MissingVersionPolicy::Reconcile),
            "ignore" | "tolerant" => Ok(MissingVersionPolicy::Ignore),
            _ => Err(format!("Invalid missing version policy: {}", s)),
        }
    }
}

/// Summary of a successful convergence wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvergenceReport {
    /// Number of status fetches
    pub polls: u32,

    /// Time spent waiting, initial delay included
    pub elapsed: Duration,

    /// Time from publication until a task of the target version first
    /// passed a health check
    pub time_to_first_healthy: Option<Duration>,
}

enum PollState {
    Converged,
    Pending,
}

/// Polls app status until every task runs the target version and is healthy
pub struct ConvergenceWatcher<'a> {
    gateway: &'a dyn OrchestratorGateway,
    clock: &'a dyn Clock,
    policy: MissingVersionPolicy,
}

impl<'a> ConvergenceWatcher<'a> {
    pub fn new(
        gateway: &'a dyn OrchestratorGateway,
        clock: &'a dyn Clock,
        policy: MissingVersionPolicy,
    ) -> Self {
        Self {
            gateway,
            clock,
            policy,
        }
    }

    /// Wait until `target_version` of `app_id` has converged.
    ///
    /// `published_at` is when publication started and anchors the time to
    /// first healthy instance.
    pub async fn await_convergence(
        &self,
        app_id: &str,
        target_version: &str,
        options: PollOptions,
        published_at: Instant,
    ) -> Result<ConvergenceReport, DeployError> {
        info!(
            "Checking app {} with new version {} for successful deployment...",
            app_id, target_version
        );

        let mut timer = PollTimer::start(self.clock, options).await;
        let mut polls = 0;
        let mut time_to_first_healthy = None;

        loop {
            polls += 1;
            let status = self
                .gateway
                .get_app(app_id)
                .await
                .map_err(|source| status_check_failed(app_id, source))?;

            if time_to_first_healthy.is_none() && has_healthy_task(&status, target_version) {
                let elapsed = self.clock.now().saturating_duration_since(published_at);
                info!("Time to first healthy instance is {:?}", elapsed);
                time_to_first_healthy = Some(elapsed);
            }

            info!(
                "Checking app {}. Running tasks: {}, Staged tasks: {}, Unhealthy tasks: {}, Healthy tasks: {}. Current versions: {:?}",
                app_id,
                status.tasks_running,
                status.tasks_staged,
                status.tasks_unhealthy,
                status.tasks_healthy,
                status.current_versions()
            );

            if let PollState::Converged = self.evaluate(app_id, target_version, &status).await? {
                info!(
                    "App {} converged on version {} after {} polls",
                    app_id, target_version, polls
                );
                return Ok(ConvergenceReport {
                    polls,
                    elapsed: timer.elapsed(),
                    time_to_first_healthy,
                });
            }

            if !timer.wait_next().await {
                return Err(DeployError::ConvergenceTimeout {
                    app_id: app_id.to_string(),
                    target_version: target_version.to_string(),
                    timeout: options.timeout,
                });
            }
        }
    }

    async fn evaluate(
        &self,
        app_id: &str,
        target_version: &str,
        status: &AppStatus,
    ) -> Result<PollState, DeployError> {
        if matching_tasks(status, target_version) > 0 {
            return Ok(if is_converged(status, target_version) {
                PollState::Converged
            } else {
                PollState::Pending
            });
        }

        match self.policy {
            MissingVersionPolicy::Ignore => {
                warn!(
                    "No task of app {} runs version {} yet",
                    app_id, target_version
                );
                Ok(PollState::Pending)
            }
            MissingVersionPolicy::Reconcile => {
                let deployments = self
                    .gateway
                    .list_deployments()
                    .await
                    .map_err(|source| status_check_failed(app_id, source))?;
                let versions = deploying_versions(&deployments, app_id);

                if versions.iter().any(|v| v == target_version) {
                    info!(
                        "Version {} of app {} is still being deployed",
                        target_version, app_id
                    );
                    Ok(PollState::Pending)
                } else {
                    Err(DeployError::VersionUnreachable {
                        app_id: app_id.to_string(),
                        target_version: target_version.to_string(),
                        current_versions: status.current_versions(),
                    })
                }
            }
        }
    }
}

fn status_check_failed(app_id: &str, source: GatewayError) -> DeployError {
    DeployError::StatusCheckFailed {
        app_id: app_id.to_string(),
        source,
    }
}

fn matching_tasks(status: &AppStatus, target_version: &str) -> usize {
    status
        .tasks
        .iter()
        .filter(|t| t.version == target_version)
        .count()
}

/// Every task runs `target_version` and Marathon counts all of them healthy.
///
/// Health comes from Marathon's `tasksHealthy` counter, not from the
/// individual health check results.
pub fn is_converged(status: &AppStatus, target_version: &str) -> bool {
    let matching = matching_tasks(status, target_version);
    matching > 0 && status.tasks_healthy as usize == matching && status.tasks.len() == matching
}

fn has_healthy_task(status: &AppStatus, target_version: &str) -> bool {
    status
        .tasks
        .iter()
        .any(|t| t.version == target_version && t.is_alive())
}
