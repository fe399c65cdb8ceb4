//! Apps API client

use marathon_api::{App, GetAppResponse, UpdateAppResponse};

use crate::errors::GatewayError;
use crate::http::client::HttpClient;
use crate::models::app::AppSpec;

fn app_path(app_id: &str) -> String {
    format!("/v2/apps/{}", app_id.trim_matches('/'))
}

impl HttpClient {
    /// Fetch an app with its tasks
    pub async fn fetch_app(&self, app_id: &str) -> Result<App, GatewayError> {
        let response: GetAppResponse = self.get(&app_path(app_id)).await?;
        Ok(response.app)
    }

    /// Create a new app
    pub async fn post_app(&self, spec: &AppSpec) -> Result<App, GatewayError> {
        self.post("/v2/apps", spec).await
    }

    /// Replace the definition of an existing app
    ///
    /// Not forced: Marathon rejects the update while another deployment
    /// of the app is locked.
    pub async fn put_app(
        &self,
        app_id: &str,
        spec: &AppSpec,
    ) -> Result<UpdateAppResponse, GatewayError> {
        self.put(&app_path(app_id), &[("force", "false")], spec).await
    }
}
