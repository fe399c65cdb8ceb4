//! Deployment models

use std::time::Duration;

/// An in-flight rollout as listed by Marathon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRecord {
    /// Marathon deployment id
    pub id: String,

    /// Version being rolled out
    pub version: String,

    /// Apps touched by the rollout
    pub affected_app_ids: Vec<String>,
}

impl DeploymentRecord {
    pub fn affects(&self, app_id: &str) -> bool {
        self.affected_app_ids.iter().any(|id| id == app_id)
    }
}

impl From<marathon_api::Deployment> for DeploymentRecord {
    fn from(deployment: marathon_api::Deployment) -> Self {
        Self {
            id: deployment.id,
            version: deployment.version,
            affected_app_ids: deployment.affected_apps,
        }
    }
}

/// Versions of all deployments affecting `app_id`, sorted
pub fn deploying_versions(deployments: &[DeploymentRecord], app_id: &str) -> Vec<String> {
    let mut versions: Vec<String> = deployments
        .iter()
        .filter(|d| d.affects(app_id))
        .map(|d| d.version.clone())
        .collect();
    versions.sort();
    versions.dedup();
    versions
}

/// What Marathon answered to a create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedApp {
    pub id: String,
    /// Version of the created app, when Marathon reports it
    pub version: Option<String>,
    pub deployment_ids: Vec<String>,
}

impl From<marathon_api::App> for CreatedApp {
    fn from(app: marathon_api::App) -> Self {
        Self {
            id: app.id,
            version: app.version,
            deployment_ids: app.deployments.into_iter().map(|d| d.id).collect(),
        }
    }
}

/// What Marathon answered to an update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedApp {
    pub version: String,
    pub deployment_id: Option<String>,
}

impl From<marathon_api::UpdateAppResponse> for UpdatedApp {
    fn from(response: marathon_api::UpdateAppResponse) -> Self {
        Self {
            version: response.version,
            deployment_id: response.deployment_id,
        }
    }
}

/// Result of publishing an app definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Version now being rolled out
    pub version: String,

    /// Marathon deployment id, when known
    pub deployment_id: Option<String>,

    /// Instance count used to size the convergence timeout
    pub instances: u32,
}

impl PublishOutcome {
    /// Convergence budget: `per_instance` for every instance, at least one.
    ///
    /// Saturates at `Duration::MAX`.
    pub fn convergence_timeout(&self, per_instance: Duration) -> Duration {
        per_instance
            .checked_mul(self.instances.max(1))
            .unwrap_or(Duration::MAX)
    }
}
