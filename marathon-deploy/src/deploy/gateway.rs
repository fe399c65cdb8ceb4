//! Control plane gateway

use async_trait::async_trait;

use crate::errors::GatewayError;
use crate::http::client::HttpClient;
use crate::models::app::{AppSpec, AppStatus};
use crate::models::deployment::{CreatedApp, DeploymentRecord, UpdatedApp};

/// Typed calls to the Marathon control plane
///
/// Every call either returns a typed result or a classified [`GatewayError`].
#[async_trait]
pub trait OrchestratorGateway: Send + Sync {
    /// Fetch the current status of an app
    async fn get_app(&self, app_id: &str) -> Result<AppStatus, GatewayError>;

    /// List all in-flight deployments
    async fn list_deployments(&self) -> Result<Vec<DeploymentRecord>, GatewayError>;

    /// Create a new app
    async fn create_app(&self, spec: &AppSpec) -> Result<CreatedApp, GatewayError>;

    /// Update an existing app
    async fn update_app(&self, app_id: &str, spec: &AppSpec) -> Result<UpdatedApp, GatewayError>;
}

#[async_trait]
impl OrchestratorGateway for HttpClient {
    async fn get_app(&self, app_id: &str) -> Result<AppStatus, GatewayError> {
        let app = self.fetch_app(app_id).await?;
        Ok(app.into())
    }

    async fn list_deployments(&self) -> Result<Vec<DeploymentRecord>, GatewayError> {
        let deployments = self.get_deployments().await?;
        Ok(deployments.into_iter().map(DeploymentRecord::from).collect())
    }

    async fn create_app(&self, spec: &AppSpec) -> Result<CreatedApp, GatewayError> {
        let app = self.post_app(spec).await?;
        Ok(app.into())
    }

    async fn update_app(&self, app_id: &str, spec: &AppSpec) -> Result<UpdatedApp, GatewayError> {
        let response = self.put_app(app_id, spec).await?;
        Ok(response.into())
    }
}
