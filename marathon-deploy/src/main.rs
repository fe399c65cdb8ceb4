//! Marathon Deploy - Entry Point
//!
//! Publishes a Marathon app definition and blocks until the new version is
//! fully rolled out, so a pipeline can treat the deploy as one step.

use std::env;
use std::process::ExitCode;

use marathon_deploy::app::run::run;
use marathon_deploy::filesys::file::File;
use marathon_deploy::logs::init_logging;
use marathon_deploy::storage::settings::Settings;
use marathon_deploy::utils::{error_chain, parse_cli_args, version_info};

use tracing::{error, info};

const USAGE: &str = "Usage: marathon-deploy --marathonHost=<url> [--marathonConfigFile=<path>] \
[--settings=<path>] [--waitOnRunningDeployment=<bool>] \
[--waitOnRunningDeploymentTimeoutInSec=<secs>] [--waitForSuccessfulDeployment=<bool>] \
[--waitForSuccessfulDeploymentTimeoutInSec=<secs>] [--missingVersionPolicy=reconcile|ignore] \
[--logLevel=<level>] [--jsonLogs=<bool>] [--version]";

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = parse_cli_args(env::args().skip(1));

    // Print version and exit
    if cli_args.contains_key("version") {
        let version = version_info();
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", version.version),
        }
        return ExitCode::SUCCESS;
    }

    if cli_args.contains_key("help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    // Settings file first, command line wins
    let mut settings = match cli_args.get("settings") {
        Some(path) => match Settings::load(&File::new(path)).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    if let Err(e) = settings.apply_overrides(&cli_args) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = init_logging(settings.log_options()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let options = match settings.to_run_options() {
        Ok(options) => options,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(options).await {
        Ok(report) => {
            info!(
                "Deployment of app {} version {} finished",
                report.app_id, report.outcome.version
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Deployment failed: {}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}
