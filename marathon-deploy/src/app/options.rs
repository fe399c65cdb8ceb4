//! Application configuration options

use std::path::PathBuf;
use std::time::Duration;

use crate::deploy::orchestrator::DeployOptions;

/// Options of a single deploy invocation
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Marathon API base URL
    pub marathon_host: String,

    /// App definition to publish
    pub marathon_config_file: PathBuf,

    /// Timeout of a single HTTP request
    pub request_timeout: Duration,

    /// Deploy protocol settings
    pub deploy: DeployOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            marathon_host: "http://localhost:8080".to_string(),
            marathon_config_file: PathBuf::from("target/marathon.json"),
            request_timeout: Duration::from_secs(30),
            deploy: DeployOptions::default(),
        }
    }
}
