//! cpctl - Entry Point
//!
//! Drives the deployment control-plane API from the command line. With no
//! command it runs the full deployment lifecycle.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use colored::Colorize;
use serde::Serialize;
use tracing::{error, info};

use cpctl::app::options::RunOptions;
use cpctl::app::run::{latest_revision, run};
use cpctl::config::{ClientConfig, DeploymentSettings};
use cpctl::errors::ClientError;
use cpctl::http::HttpClient;
use cpctl::logs::{init_logging, LogOptions};
use cpctl::utils::version_info;
use cpctl::wait::poller::{
    no_shutdown, signal_or_never, until_shutdown, wait_for_deployment, ShutdownSignal,
    WaitOptions,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    if cli_args.contains_key("version") {
        return print_json(&version_info());
    }

    if cli_args.contains_key("help") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let log_options = LogOptions {
        log_level: config.log_level,
        json_format: cli_args.contains_key("json-logs"),
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let client = match HttpClient::new(&config) {
        Ok(client) => client,
        Err(e) => return fail(&e),
    };

    // One signal listener for the whole command; whatever is in flight is dropped when it fires
    let command = execute(&client, &config, &cli_args);
    match until_shutdown(command, shutdown_signal()).await {
        Ok(code) => code,
        Err(ClientError::Interrupted) => {
            eprintln!("{} interrupted", "error:".red().bold());
            ExitCode::from(130)
        }
        Err(e) => fail(&e),
    }
}

async fn execute(
    client: &HttpClient,
    config: &ClientConfig,
    cli_args: &HashMap<String, String>,
) -> Result<ExitCode, ClientError> {
    if cli_args.contains_key("listeners") {
        // Listener errors are reported as an {error, message} document on stdout
        return match client.list_listeners().await {
            Ok(listeners) => Ok(print_json(&listeners)),
            Err(e) => {
                print_json(&e.to_error_response());
                Ok(ExitCode::FAILURE)
            }
        };
    }

    if let Some(id) = cli_args.get("get") {
        client.get_deployment(id).await.map(|d| print_json(&d))
    } else if let Some(id) = cli_args.get("revisions") {
        client.list_revisions(id).await.map(|r| print_json(&r))
    } else if let Some(id) = cli_args.get("wait") {
        wait_latest(client, config, id).await.map(|r| print_json(&r))
    } else if let Some(id) = cli_args.get("delete") {
        client.delete_deployment(id).await.map(|_| ExitCode::SUCCESS)
    } else {
        run_lifecycle(client, config, cli_args.contains_key("keep")).await
    }
}

async fn run_lifecycle(
    client: &HttpClient,
    config: &ClientConfig,
    keep_deployment: bool,
) -> Result<ExitCode, ClientError> {
    let mut options = RunOptions::new(config, DeploymentSettings::from_env()?)?;
    options.keep_deployment = keep_deployment;

    info!(
        "Running deployment lifecycle against {} for {}",
        client.base_url(),
        options.deployment.name
    );
    let report = run(client, &options, no_shutdown()).await?;
    println!(
        "{} deployment {} (revisions {} -> {})",
        "Completed".green().bold(),
        report.deployment_id,
        report.initial_revision_id,
        report.patched_revision_id
    );
    Ok(ExitCode::SUCCESS)
}

async fn wait_latest(
    client: &HttpClient,
    config: &ClientConfig,
    deployment_id: &str,
) -> Result<cpctl::models::Revision, ClientError> {
    let latest = latest_revision(client, deployment_id).await?;
    wait_for_deployment(
        client,
        deployment_id,
        &latest.id,
        &WaitOptions::from(config),
        &mut no_shutdown(),
    )
    .await
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&ClientError::from(e)),
    }
}

fn fail(e: &ClientError) -> ExitCode {
    error!("{}", e);
    eprintln!("{} {}", "error:".red().bold(), e);
    ExitCode::FAILURE
}

fn print_usage() {
    println!(
        "Usage: cpctl [COMMAND]

Commands:
  (none)               Create, wait, patch, wait, delete a deployment
  --keep               With no command, leave the deployment in place
  --listeners          List listeners
  --get=<id>           Show a deployment
  --revisions=<id>     List revisions of a deployment, newest first
  --wait=<id>          Wait for the latest revision of a deployment
  --delete=<id>        Delete a deployment
  --json-logs          Log as JSON lines
  --version            Print version information

Environment:
  CONTROL_PLANE_HOST, LANGSMITH_API_KEY, INTEGRATION_ID,
  CPCTL_MAX_WAIT_SECS, CPCTL_POLL_INTERVAL_SECS, CPCTL_LOG_LEVEL,
  CPCTL_DEPLOYMENT_NAME, CPCTL_REPO_URL, CPCTL_REPO_REF, CPCTL_CONFIG_PATH,
  CPCTL_SECRET_NAMES"
    );
}

fn shutdown_signal() -> ShutdownSignal {
    Box::pin(await_shutdown_signal())
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!("Unable to listen for SIGTERM: {}", e);
                await_ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = await_ctrl_c() => {}
        }
    }

    #[cfg(not(unix))]
    {
        await_ctrl_c().await;
    }
}

async fn await_ctrl_c() {
    signal_or_never(tokio::signal::ctrl_c(), "Ctrl+C").await;
}
