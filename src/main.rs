//! VisionVani API backend entry point.

use std::net::{IpAddr, SocketAddr};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use visionvani_backend::app::{create_app, API_PREFIX, OPENAPI_PATH};
use visionvani_backend::config::get_settings;
use visionvani_backend::cors::allowed_origins;
use visionvani_backend::utils::shutdown_signal;

/// VisionVani API backend.
#[derive(Parser, Debug)]
#[command(name = "visionvani-backend")]
#[command(about = "HTTP backend for the VisionVani frontend")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "LOG_JSON")]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Address to bind.
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on.
        #[arg(short, long, env = "PORT", default_value = "8000")]
        port: u16,
    },

    /// Load and validate settings, then print a summary.
    CheckConfig,

    /// Print the OpenAPI document as JSON.
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("visionvani_backend=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so stdout carries only command output.
    let json = args
        .json_logs
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let plain = (!args.json_logs).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(json)
        .with(plain)
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::Serve { host, port }) => cmd_serve(SocketAddr::new(host, port)).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Openapi) => cmd_openapi(),
        None => cmd_serve(SocketAddr::new(args.host, args.port)).await,
    }
}

/// Assemble the application and serve it until shutdown.
async fn cmd_serve(addr: SocketAddr) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let app = create_app().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("Service: {} v{}", app.title(), app.version());
    for route in app.routes() {
        info!("Route {} {} ({})", route.method, route.path, route.collection);
    }

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {} (API under {}, docs at {})", addr, API_PREFIX, OPENAPI_PATH);

    axum::serve(listener, app.into_router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("VISIONVANI BACKEND - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let settings = match get_settings() {
        Ok(s) => {
            println!("OK");
            s
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  API Title: {}", settings.api_title);
    println!("  API Version: {}", settings.api_version);
    println!("  Environment: {}", settings.environment);
    match &settings.frontend_origin {
        Some(origin) => println!("  Frontend Origin: {}", origin),
        None => println!("  Frontend Origin: not set"),
    }
    println!(
        "  CORS Mode: {}",
        if settings.has_frontend_origin() { "explicit origin" } else { "development defaults" }
    );
    println!("  CORS Allow-List:");
    for origin in allowed_origins(settings) {
        println!("    - {}", origin);
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the OpenAPI document.
fn cmd_openapi() -> anyhow::Result<()> {
    let app = create_app()?;
    println!("{}", app.openapi_json()?);
    Ok(())
}
