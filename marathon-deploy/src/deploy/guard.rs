//! Wait for deployments already running against an app

use tracing::info;

use crate::deploy::gateway::OrchestratorGateway;
use crate::deploy::poll::{Clock, PollOptions, PollTimer};
use crate::errors::DeployError;
use crate::models::deployment::deploying_versions;

/// Block until no in-flight deployment affects `app_id`.
///
/// Publishing over a rollout that is still in progress makes two rollouts
/// of the same app overlap on the Marathon side.
pub async fn await_no_prior_deployment(
    gateway: &dyn OrchestratorGateway,
    clock: &dyn Clock,
    app_id: &str,
    options: PollOptions,
) -> Result<(), DeployError> {
    let mut timer = PollTimer::start(clock, options).await;

    loop {
        info!("Checking app {} for deployments in progress...", app_id);
        let deployments = gateway.list_deployments().await.map_err(|source| {
            DeployError::PriorDeploymentCheckFailed {
                app_id: app_id.to_string(),
                source,
            }
        })?;

        let versions = deploying_versions(&deployments, app_id);
        info!(
            "Checking app {}. Apps currently being deployed: {}, versions: {:?}",
            app_id,
            versions.len(),
            versions
        );

        if versions.is_empty() {
            return Ok(());
        }

        if !timer.wait_next().await {
            return Err(DeployError::PriorDeploymentTimeout {
                app_id: app_id.to_string(),
                timeout: options.timeout,
            });
        }
    }
}
