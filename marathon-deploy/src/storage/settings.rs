//! Settings file management

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::options::RunOptions;
use crate::deploy::orchestrator::DeployOptions;
use crate::deploy::watcher::MissingVersionPolicy;
use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::logs::{LogLevel, LogOptions};

/// Deploy settings
///
/// Read from an optional JSON settings file, then overridden from the
/// command line. Both snake_case and the camelCase option names are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the Marathon API
    #[serde(default, alias = "marathonHost")]
    pub marathon_host: String,

    /// App definition to publish
    #[serde(default = "default_marathon_config_file", alias = "marathonConfigFile")]
    pub marathon_config_file: PathBuf,

    /// Wait for running deployments of the app before updating it
    #[serde(default = "default_true", alias = "waitOnRunningDeployment")]
    pub wait_on_running_deployment: bool,

    #[serde(
        default = "default_timeout_secs",
        alias = "waitOnRunningDeploymentTimeoutInSec"
    )]
    pub wait_on_running_deployment_timeout_in_sec: u64,

    /// Wait until the published version is rolled out
    #[serde(default = "default_true", alias = "waitForSuccessfulDeployment")]
    pub wait_for_successful_deployment: bool,

    /// Rollout budget per instance
    #[serde(
        default = "default_timeout_secs",
        alias = "waitForSuccessfulDeploymentTimeoutInSec"
    )]
    pub wait_for_successful_deployment_timeout_in_sec: u64,

    /// Polling interval in seconds
    #[serde(default = "default_poll_interval", alias = "pollIntervalSecs")]
    pub poll_interval_secs: u64,

    /// Delay before the first convergence check after an update
    #[serde(
        default = "default_convergence_initial_delay",
        alias = "convergenceInitialDelaySecs"
    )]
    pub convergence_initial_delay_secs: u64,

    /// Timeout of a single HTTP request
    #[serde(default = "default_request_timeout", alias = "requestTimeoutSecs")]
    pub request_timeout_secs: u64,

    #[serde(default, alias = "missingVersionPolicy")]
    pub missing_version_policy: MissingVersionPolicy,

    /// Log level
    #[serde(default, alias = "logLevel")]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default, alias = "jsonLogs")]
    pub json_logs: bool,
}

/// Upper bound of every duration setting: one week
const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

fn default_true() -> bool {
    true
}

fn default_marathon_config_file() -> PathBuf {
    PathBuf::from("target/marathon.json")
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_poll_interval() -> u64 {
    5
}

fn default_convergence_initial_delay() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            marathon_host: String::new(),
            marathon_config_file: default_marathon_config_file(),
            wait_on_running_deployment: true,
            wait_on_running_deployment_timeout_in_sec: default_timeout_secs(),
            wait_for_successful_deployment: true,
            wait_for_successful_deployment_timeout_in_sec: default_timeout_secs(),
            poll_interval_secs: default_poll_interval(),
            convergence_initial_delay_secs: default_convergence_initial_delay(),
            request_timeout_secs: default_request_timeout(),
            missing_version_policy: MissingVersionPolicy::default(),
            log_level: LogLevel::Info,
            json_logs: false,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn load(file: &File) -> Result<Self, DeployError> {
        file.read_json::<Settings>().await.map_err(|e| {
            DeployError::ConfigError(format!(
                "Unable to read settings file {}: {}",
                file.path().display(),
                e
            ))
        })
    }

    /// Apply `key=value` overrides from the command line.
    ///
    /// Unknown keys are left to the caller.
    pub fn apply_overrides(&mut self, args: &HashMap<String, String>) -> Result<(), DeployError> {
        for (key, value) in args {
            match normalize_key(key).as_str() {
                "marathon_host" => self.marathon_host = value.clone(),
                "marathon_config_file" => self.marathon_config_file = PathBuf::from(value),
                "wait_on_running_deployment" => {
                    self.wait_on_running_deployment = parse_value(key, value)?
                }
                "wait_on_running_deployment_timeout_in_sec" => {
                    self.wait_on_running_deployment_timeout_in_sec = parse_value(key, value)?
                }
                "wait_for_successful_deployment" => {
                    self.wait_for_successful_deployment = parse_value(key, value)?
                }
                "wait_for_successful_deployment_timeout_in_sec" => {
                    self.wait_for_successful_deployment_timeout_in_sec = parse_value(key, value)?
                }
                "poll_interval_secs" => self.poll_interval_secs = parse_value(key, value)?,
                "convergence_initial_delay_secs" => {
                    self.convergence_initial_delay_secs = parse_value(key, value)?
                }
                "request_timeout_secs" => self.request_timeout_secs = parse_value(key, value)?,
                "missing_version_policy" => {
                    self.missing_version_policy = parse_value(key, value)?
                }
                "log_level" => self.log_level = parse_value(key, value)?,
                "json_logs" => self.json_logs = parse_value(key, value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Reject settings the deploy step cannot run with
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.marathon_host.trim().is_empty() {
            return Err(DeployError::ConfigError(
                "marathonHost is required".to_string(),
            ));
        }

        let url = Url::parse(&self.marathon_host).map_err(|e| {
            DeployError::ConfigError(format!(
                "Invalid marathonHost {}: {}",
                self.marathon_host, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DeployError::ConfigError(format!(
                "Invalid marathonHost {}: unsupported scheme {}",
                self.marathon_host,
                url.scheme()
            )));
        }

        let non_zero = [
            (
                "waitOnRunningDeploymentTimeoutInSec",
                self.wait_on_running_deployment_timeout_in_sec,
            ),
            (
                "waitForSuccessfulDeploymentTimeoutInSec",
                self.wait_for_successful_deployment_timeout_in_sec,
            ),
            ("pollIntervalSecs", self.poll_interval_secs),
            ("requestTimeoutSecs", self.request_timeout_secs),
        ];
        for (name, value) in non_zero {
            if value == 0 {
                return Err(DeployError::ConfigError(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        let bounded = non_zero.into_iter().chain([(
            "convergenceInitialDelaySecs",
            self.convergence_initial_delay_secs,
        )]);
        for (name, value) in bounded {
            if value > MAX_DURATION_SECS {
                return Err(DeployError::ConfigError(format!(
                    "{} must not exceed {} seconds",
                    name, MAX_DURATION_SECS
                )));
            }
        }

        Ok(())
    }

    /// Logging options for these settings
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_level: self.log_level.clone(),
            json_format: self.json_logs,
        }
    }

    /// Validate and convert into runtime options
    pub fn to_run_options(&self) -> Result<RunOptions, DeployError> {
        self.validate()?;

        Ok(RunOptions {
            marathon_host: self.marathon_host.clone(),
            marathon_config_file: self.marathon_config_file.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            deploy: DeployOptions {
                wait_on_running_deployment: self.wait_on_running_deployment,
                running_deployment_timeout: Duration::from_secs(
                    self.wait_on_running_deployment_timeout_in_sec,
                ),
                wait_for_successful_deployment: self.wait_for_successful_deployment,
                successful_deployment_timeout_per_instance: Duration::from_secs(
                    self.wait_for_successful_deployment_timeout_in_sec,
                ),
                poll_interval: Duration::from_secs(self.poll_interval_secs),
                convergence_initial_delay: Duration::from_secs(
                    self.convergence_initial_delay_secs,
                ),
                missing_version_policy: self.missing_version_policy,
            },
        })
    }
}

/// `waitOnRunningDeployment` / `wait-on-running-deployment` -> `wait_on_running_deployment`
fn normalize_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len() + 8);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            normalized.push('_');
            normalized.push(c.to_ascii_lowercase());
        } else if c == '-' {
            normalized.push('_');
        } else {
            normalized.push(c);
        }
    }
    normalized
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, DeployError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| DeployError::ConfigError(format!("Invalid value for {}: {} ({})", key, value, e)))
}
