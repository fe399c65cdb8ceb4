//! Utility functions

use serde::{Deserialize, Serialize};

/// Version information for the binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Parse `--key=value` and standalone `--flag` arguments
pub fn parse_cli_args<I>(args: I) -> std::collections::HashMap<String, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli_args = std::collections::HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    cli_args
}

/// Format an error with its chain of causes
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_args() {
        let args = ["--marathonHost=http://marathon:8080", "--version", "stray"]
            .into_iter()
            .map(String::from);
        let parsed = parse_cli_args(args);

        assert_eq!(parsed.get("marathonHost").unwrap(), "http://marathon:8080");
        assert_eq!(parsed.get("version").unwrap(), "true");
        assert!(!parsed.contains_key("stray"));
    }

    #[test]
    fn test_version_info_carries_build_metadata() {
        let info = version_info();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.build_time, env!("BUILD_TIME"));
        assert_eq!(info.git_hash, env!("GIT_HASH"));
        assert!(info.build_time.ends_with("UTC"));
    }

    #[test]
    fn test_error_chain() {
        let err = crate::errors::DeployError::ProbeFailed {
            app_id: "/svc".to_string(),
            source: crate::errors::GatewayError::NotFound("/v2/apps/svc".to_string()),
        };
        assert_eq!(
            error_chain(&err),
            "Failed to check if app /svc exists: Not found: /v2/apps/svc"
        );
    }
}
