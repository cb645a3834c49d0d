use api::AppState;
use clap::{Args, Parser};
use provisioner::{DatabaseName, ProvisionError, Provisioner};
use resolver::EndpointResolver;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod telemetry;

use config::{Config, ConfigError};
use telemetry::TelemetryError;

#[derive(Parser)]
#[command(name = "fanout", version)]
enum CliCommand {
    /// Run the HTTP API
    Api(ConfigArgs),
    /// Create a database unless it already exists, then exit
    Provision {
        #[command(flatten)]
        config: ConfigArgs,
        /// Name of the database to ensure
        name: String,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the YAML config file
    #[arg(long)]
    config: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] api::ApiError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting");
            eprintln!("fanout: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: CliCommand) -> Result<(), CliError> {
    let path = match &cli {
        CliCommand::Api(args) => &args.config,
        CliCommand::Provision { config, .. } => &config.config,
    };
    let config = Config::from_file(path)?;
    let _telemetry = telemetry::init(&config.common)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli {
        CliCommand::Api(_) => rt.block_on(run_api(config)),
        CliCommand::Provision { name, .. } => rt.block_on(run_provision(config, &name)),
    }
}

async fn run_api(config: Config) -> Result<(), CliError> {
    let api_config = config.api;
    let provisioner = Provisioner::new(
        api_config.database.control_url.as_str(),
        api_config.database.pool_settings(),
    )?;
    let listener = api_config.listener.clone();

    tracing::info!(host = %listener.host, port = listener.port, "Starting API");
    let state = AppState::new(
        api_config,
        EndpointResolver::default(),
        Arc::new(provisioner),
    );
    api::serve(&listener, state).await?;
    Ok(())
}

async fn run_provision(config: Config, name: &str) -> Result<(), CliError> {
    let name = name.parse::<DatabaseName>().map_err(ProvisionError::from)?;
    let database = &config.api.database;
    let provisioner = Provisioner::new(database.control_url.as_str(), database.pool_settings())?;

    let outcome = provisioner.ensure(&name).await?;
    println!("{name}: {}", outcome.as_str());
    Ok(())
}
