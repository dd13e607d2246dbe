use anyhow::Context;
use clap::Parser;
use parking_slot::adapters::response::Status;
use parking_slot::utils::{logger, validation::Validate};
use parking_slot::{CliConfig, ParkingApp, ParkingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = ParkingConfig::from_file(&cli.config)
        .with_context(|| format!("cannot load configuration from {}", cli.config))?;
    if let Some(data_path) = &cli.data_path {
        config.store.data_path = data_path.clone();
    }

    logger::init_logger(cli.verbose, &config.logging.level, config.log_format());
    tracing::info!("Starting parking-slot CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let app = ParkingApp::start(&config)
        .await
        .context("cannot open the slot store")?;

    let response = app.handle(cli.command.into()).await;

    // shut down even when the command failed
    app.shutdown().await.context("cannot write the slot store")?;

    println!("{}", serde_json::to_string_pretty(&response.body)?);
    tracing::info!(status = response.status.code(), "Command finished");

    let exit_code = match response.status {
        Status::Ok => 0,
        Status::ServiceUnavailable => 3,
        Status::InternalServerError => 4,
        _ => 2,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
