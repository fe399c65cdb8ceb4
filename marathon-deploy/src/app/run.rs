//! Deploy invocation

use std::sync::Arc;

use tracing::info;

use crate::app::options::RunOptions;
use crate::deploy::gateway::OrchestratorGateway;
use crate::deploy::orchestrator::{DeploymentOrchestrator, DeploymentReport};
use crate::deploy::poll::{Clock, TokioClock};
use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::http::client::HttpClient;
use crate::storage::descriptor::load_app_spec;

/// Deploy the configured app against the configured Marathon host
pub async fn run(options: RunOptions) -> Result<DeploymentReport, DeployError> {
    let http_gateway =
        |options: &RunOptions| -> Result<Arc<dyn OrchestratorGateway>, DeployError> {
            let client = HttpClient::new(&options.marathon_host, options.request_timeout)
                .map_err(|e| {
                    DeployError::ConfigError(format!("Unable to build HTTP client: {}", e))
                })?;
            Ok(Arc::new(client))
        };

    run_with(options, http_gateway, Arc::new(TokioClock)).await
}

/// Deploy with an injected gateway and clock.
///
/// The app definition is loaded before the gateway is built, so a missing
/// or malformed file fails without any call to Marathon.
pub async fn run_with<G>(
    options: RunOptions,
    gateway: G,
    clock: Arc<dyn Clock>,
) -> Result<DeploymentReport, DeployError>
where
    G: FnOnce(&RunOptions) -> Result<Arc<dyn OrchestratorGateway>, DeployError>,
{
    let config_file = File::new(&options.marathon_config_file);
    let spec = load_app_spec(&config_file).await?;

    info!(
        "Deploying Marathon config for {} from {} to {}",
        spec.id,
        config_file.path().display(),
        options.marathon_host
    );

    let gateway = gateway(&options)?;
    let orchestrator = DeploymentOrchestrator::new(gateway, clock, options.deploy);
    orchestrator.deploy(&spec).await
}
