//! # Service Host
//!
//! Runs a gRPC or gRPC-Web transport under a [`ServiceCoordinator`] until
//! Ctrl-C is received.

use anyhow::Result;
use clap::Parser;
use common::config::loader::{load_config, load_from_file};
use common::config::ConfigValidation;
use common::logging::init_logging;
use grpc_service::{create_transport, ServiceConfig, ServiceCoordinator, StopSignal};
use service_logger::ServerLogger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tonic::service::Routes;
use tracing::{error, info, warn};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct HostArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "service.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error), overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Generate sample configuration file at the config path
    #[arg(long)]
    gen_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = HostArgs::parse();

    if args.gen_config {
        return generate_config(&args.config);
    }

    let mut config = resolve_config(&args.config)?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    for warning in config.warnings() {
        warn!("Configuration warning: {}", warning);
    }

    run_service(config).await
}

fn generate_config(path: &Path) -> Result<()> {
    let toml_content = toml::to_string_pretty(&ServiceConfig::default())?;
    std::fs::write(path, toml_content)?;

    println!("Generated configuration file: {}", path.display());
    Ok(())
}

fn resolve_config(path: &Path) -> Result<ServiceConfig> {
    let config = if path.exists() {
        load_from_file(path)?
    } else {
        load_config()?
    };

    Ok(config)
}

async fn run_service(config: ServiceConfig) -> Result<()> {
    let transport = create_transport(&config.transport, Routes::default()).await?;
    if let Some(addr) = transport.local_addr() {
        info!("{} transport bound to {}", config.transport.kind, addr);
    }

    let mut logger_config = config.logger.clone();
    logger_config.server_name = config.name.clone();
    let logger = Arc::new(ServerLogger::new(logger_config)?);

    let service = ServiceCoordinator::new(config.transport.kind);
    service
        .setup(
            &config.name,
            Some(transport),
            Some(logger),
            Some(StopSignal::new()),
        )
        .await?;

    let shutdown = service.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Received shutdown signal, stopping service...");
        if let Err(e) = shutdown.stop().await {
            error!("Failed to stop service: {}", e);
        }
    });

    info!("Starting {}", config.name);
    service.serve().await?;

    info!("{} stopped", config.name);
    Ok(())
}
