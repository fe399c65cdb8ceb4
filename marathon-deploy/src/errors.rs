//! Error types for the deploy step

use std::path::PathBuf;
use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

/// Classified failure of a single call to the control plane
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The requested resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("Server error: {status} - {body}")]
    ServerError { status: StatusCode, body: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}

/// Terminal error of a deploy invocation
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("Marathon config file not found: {}", path.display())]
    DescriptorNotFound { path: PathBuf },

    #[error("Invalid Marathon config file {}: {reason}", path.display())]
    DescriptorInvalid { path: PathBuf, reason: String },

    #[error("Failed to check if app {app_id} exists")]
    ProbeFailed {
        app_id: String,
        #[source]
        source: GatewayError,
    },

    #[error("Failed to list running deployments for app {app_id}")]
    PriorDeploymentCheckFailed {
        app_id: String,
        #[source]
        source: GatewayError,
    },

    #[error("Previous deployment of app {app_id} still hanging. Didn't finish in {} seconds", timeout.as_secs())]
    PriorDeploymentTimeout { app_id: String, timeout: Duration },

    #[error("Failed to publish app {app_id}")]
    PublishFailed {
        app_id: String,
        #[source]
        source: GatewayError,
    },

    #[error("Expected exactly one deploying version for new app {app_id}, but got {versions:?}")]
    AmbiguousVersion { app_id: String, versions: Vec<String> },

    #[error("Failed to check status of app {app_id}")]
    StatusCheckFailed {
        app_id: String,
        #[source]
        source: GatewayError,
    },

    #[error("No version {target_version} of app {app_id} running or deploying, running versions are {current_versions:?}, deployment aborted")]
    VersionUnreachable {
        app_id: String,
        target_version: String,
        current_versions: Vec<String>,
    },

    #[error("Deployment of version {target_version} of app {app_id} still hanging. Didn't finish in {} seconds", timeout.as_secs())]
    ConvergenceTimeout {
        app_id: String,
        target_version: String,
        timeout: Duration,
    },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl DeployError {
    /// Gateway failure underneath this error, if any
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            DeployError::ProbeFailed { source, .. }
            | DeployError::PriorDeploymentCheckFailed { source, .. }
            | DeployError::PublishFailed { source, .. }
            | DeployError::StatusCheckFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
