//! MCP Server Entry Point
//!
//! Parses the command line, loads the layered configuration, initializes
//! logging and runs the requested command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use aytch_mcp::core::{Config, McpServer, TransportService};
use aytch_mcp::domains::resources::ResourceService;
use aytch_mcp::domains::tools::ToolRegistry;

#[derive(Parser)]
#[command(
    name = "aytch_mcp",
    about = "Aytch4K Model Context Protocol server",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server
    Start(StartArgs),
    /// Write a default configuration
    Init {
        /// Directory to create the configuration in
        #[arg(long, default_value = "./config")]
        dir: PathBuf,
    },
    /// List the enabled resources
    ListResources {
        /// Path to the configuration directory or file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the enabled tools
    ListTools {
        /// Path to the configuration directory or file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct StartArgs {
    /// Host to bind the HTTP server to
    #[arg(long)]
    host: Option<String>,
    /// Port to bind the HTTP server to
    #[arg(long)]
    port: Option<u16>,
    /// Path to the configuration directory or file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
    /// Enable debug mode
    #[arg(long)]
    debug: bool,
    /// Transport to serve on
    #[arg(long, value_parser = ["stdio", "http"])]
    transport: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Start(StartArgs::default())) {
        Command::Start(args) => start(args).await,
        Command::Init { dir } => init(&dir),
        Command::ListResources { config } => list_resources(config.as_deref()).await,
        Command::ListTools { config } => list_tools(config.as_deref()),
        Command::Version => {
            println!("AytchMCP version: {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Apply `start` flags on top of the loaded configuration.
///
/// Returns a notice for flags that had no effect. Logging is not set up yet
/// at this point, so the caller logs it.
fn apply_start_args(config: &mut Config, args: &StartArgs) -> Result<Option<&'static str>> {
    if let Some(kind) = &args.transport {
        config.transport = config
            .transport
            .clone()
            .with_kind(kind)
            .with_context(|| format!("transport '{}' is not compiled in", kind))?;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.to_lowercase();
    }
    if args.debug {
        config.server.debug = true;
    }

    if args.host.is_some() || args.port.is_some() {
        #[cfg(feature = "http")]
        if let Some(http) = config.transport.http_mut() {
            if let Some(host) = &args.host {
                http.host = host.clone();
            }
            if let Some(port) = args.port {
                http.port = port;
            }
            return Ok(None);
        }
        return Ok(Some("--host and --port only apply to the HTTP transport"));
    }
    Ok(None)
}

async fn start(args: StartArgs) -> Result<()> {
    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    let notice = apply_start_args(&mut config, &args)?;

    init_logging(config.effective_log_level(), config.logging.with_timestamps);
    if let Some(notice) = notice {
        warn!("{}", notice);
    }

    info!("Starting {} v{}", config.server.name, config.server.version);
    if config.credentials.openweather_api_key.is_none() {
        info!("OPENWEATHER_API_KEY not set; the weather tool will serve mock data");
    }

    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::new(config);
    info!("Server initialized");

    transport.run(server).await?;

    info!("Server shutting down");
    Ok(())
}

fn init(dir: &Path) -> Result<()> {
    let written = Config::write_defaults(dir)
        .with_context(|| format!("writing configuration to {}", dir.display()))?;
    for path in written {
        println!("Created configuration file: {}", path.display());
    }
    println!("Initialized MCP server configuration in {}", dir.display());
    Ok(())
}

async fn list_resources(config: Option<&Path>) -> Result<()> {
    let config = Config::load(config).context("loading configuration")?;
    let service = ResourceService::new(&config.resources);

    println!("Available resources:");
    for resource in service.list_resources().await {
        println!("  - {} ({})", resource.raw.name, resource.raw.uri);
    }
    Ok(())
}

fn list_tools(config: Option<&Path>) -> Result<()> {
    let config = Config::load(config).context("loading configuration")?;
    let registry = ToolRegistry::new(Arc::new(config));

    println!("Available tools:");
    for name in registry.tool_names() {
        println!("  - {}", name);
    }
    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs always go to stderr: with the STDIO transport, stdout carries
/// the protocol.
fn init_logging(level: &str, with_timestamps: bool) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" | "critical" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
