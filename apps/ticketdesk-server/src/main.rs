mod config;
mod cors;
mod db;
mod logging;
mod signals;
mod web;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tickets::TicketsModule;
use tokio::net::TcpListener;

use crate::config::AppConfig;

/// Ticketdesk Server - multi-tenant support ticket backend
#[derive(Parser)]
#[command(name = "ticketdesk-server")]
#[command(about = "Ticketdesk Server - multi-tenant support ticket backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // defaults -> YAML (if provided) -> env (TICKETDESK__*) -> CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging, cli.verbose);

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Ticketdesk Server starting");
    config.validate()?;

    let db = db::connect(&config.database).await?;
    TicketsModule::migrate(&db)
        .await
        .context("database migration failed")?;

    let module = TicketsModule::init(db, &config.auth, &config.tickets)?;
    let router = web::build_router(&module, &config)?;

    let addr: SocketAddr = format!("{}:{}", config.server.bind_addr, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.bind_addr, config.server.port
            )
        })?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = signals::wait_for_shutdown().await {
                tracing::error!(error = %e, "Signal handling failed, shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("Ticketdesk Server stopped");
    Ok(())
}
