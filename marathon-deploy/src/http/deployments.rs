//! Deployments API client

use marathon_api::Deployment;

use crate::errors::GatewayError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// List deployments currently in progress
    pub async fn get_deployments(&self) -> Result<Vec<Deployment>, GatewayError> {
        self.get("/v2/deployments").await
    }
}
