//! API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api_starter::api::AppState;
use api_starter::app::create_app;
use api_starter::config::Config;
use api_starter::database::{DatabaseConfig, DatabaseManager};
use api_starter::metrics;
use api_starter::utils::shutdown_signal;

/// How often expired rate limit windows are dropped.
const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// HTTP JSON API starter server.
#[derive(Parser, Debug)]
#[command(name = "api-starter")]
#[command(about = "HTTP JSON API starter with query filter/sort/pagination translation")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("api_starter=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("API STARTER - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Check database url
    print!("Resolving database url... ");
    match DatabaseConfig::from_config(&config).connection_url() {
        Ok(Some(_)) => println!("OK"),
        Ok(None) => println!("SKIPPED (DATABASE_URI not set)"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Database url invalid"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Mode: {}", config.app_env);
    println!("  Port: {}", config.port);
    println!("  Database: {}", display_or_unset(config.database_name()));
    println!(
        "  Rate Limit: {} requests / {} min",
        config.rate_limit_max, config.rate_limit_window_min
    );
    println!("  Body Limit: {} bytes", config.body_limit_bytes);
    println!("  Static Dir: {}", config.static_dir);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let mode = config.app_env;
    let port = config.port;

    // Initialize metrics
    let metrics_handle = metrics::install_recorder()?;

    // Database is owned here and handed to the app; teardown happens below
    let database = Arc::new(DatabaseManager::new(DatabaseConfig::from_config(&config)));

    let state = AppState::new(config, database.clone()).with_metrics(metrics_handle);
    let rate_limiter = state.rate_limiter.clone();
    let app = create_app(state).await?;

    // Periodically drop expired rate limit windows
    let purge_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = rate_limiter.purge_expired();
            if purged > 0 {
                debug!(purged, "Purged expired rate limit windows");
            }
        }
    });

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("App is running in {} mode on port {} 🚀...", mode, port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    purge_handle.abort();

    if let Err(e) = database.disconnect().await {
        warn!("Database disconnect failed: {}", e);
    }

    info!("Server stopped");
    Ok(())
}
