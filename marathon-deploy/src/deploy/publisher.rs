//! Create or update an app definition

use tracing::info;

use crate::deploy::gateway::OrchestratorGateway;
use crate::errors::{DeployError, GatewayError};
use crate::models::app::AppSpec;
use crate::models::deployment::{deploying_versions, PublishOutcome};

/// Publish `spec` exactly once, creating the app when it does not exist yet.
pub async fn publish(
    gateway: &dyn OrchestratorGateway,
    app_id: &str,
    exists: bool,
    spec: &AppSpec,
) -> Result<PublishOutcome, DeployError> {
    let published = if exists {
        update(gateway, app_id, spec).await
    } else {
        create(gateway, app_id, spec).await
    };

    published.map_err(|source| match source {
        PublishError::Gateway(source) => DeployError::PublishFailed {
            app_id: app_id.to_string(),
            source,
        },
        PublishError::Ambiguous(versions) => DeployError::AmbiguousVersion {
            app_id: app_id.to_string(),
            versions,
        },
    })
}

enum PublishError {
    Gateway(GatewayError),
    Ambiguous(Vec<String>),
}

impl From<GatewayError> for PublishError {
    fn from(err: GatewayError) -> Self {
        PublishError::Gateway(err)
    }
}

async fn create(
    gateway: &dyn OrchestratorGateway,
    app_id: &str,
    spec: &AppSpec,
) -> Result<PublishOutcome, PublishError> {
    let created = gateway.create_app(spec).await?;

    let version = match created.version {
        Some(version) => version,
        None => {
            // Marathon did not echo the version: it is the one being rolled out
            let deployments = gateway.list_deployments().await?;
            let mut versions = deploying_versions(&deployments, app_id);
            if versions.len() != 1 {
                return Err(PublishError::Ambiguous(versions));
            }
            versions.remove(0)
        }
    };

    info!("Created app {} with version {}", app_id, version);

    Ok(PublishOutcome {
        version,
        deployment_id: created.deployment_ids.into_iter().next(),
        instances: spec.instances.unwrap_or(1),
    })
}

async fn update(
    gateway: &dyn OrchestratorGateway,
    app_id: &str,
    spec: &AppSpec,
) -> Result<PublishOutcome, PublishError> {
    // an absent instance count keeps the current size, which sizes the timeout
    let current = gateway.get_app(app_id).await?;
    let updated = gateway.update_app(app_id, spec).await?;

    info!(
        "Updated app {} to version {} (deployment {})",
        app_id,
        updated.version,
        updated.deployment_id.as_deref().unwrap_or("unknown")
    );

    Ok(PublishOutcome {
        version: updated.version,
        deployment_id: updated.deployment_id,
        instances: spec.instances.unwrap_or(current.instances),
    })
}
