//! App existence probe

use tracing::debug;

use crate::deploy::gateway::OrchestratorGateway;
use crate::errors::DeployError;

/// Check whether Marathon already knows `app_id`.
///
/// A 404 means the app does not exist; any other failure is surfaced.
pub async fn app_exists(gateway: &dyn OrchestratorGateway, app_id: &str) -> Result<bool, DeployError> {
    match gateway.get_app(app_id).await {
        Ok(status) => {
            debug!("App {} exists with {} instances", app_id, status.instances);
            Ok(true)
        }
        Err(e) if e.is_not_found() => Ok(false),
        Err(source) => Err(DeployError::ProbeFailed {
            app_id: app_id.to_string(),
            source,
        }),
    }
}
