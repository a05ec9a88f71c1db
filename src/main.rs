//! MCP Keygate CLI application.
//!
//! This is the main entry point for the server binary.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use mcp_keygate::config::default_config_path;
use mcp_keygate::utils::logging::init_logging;
use mcp_keygate::{Config, McpServer};

/// MCP tool server with header and URL parameter authorization fallback
#[derive(Parser)]
#[command(name = "mcp-keygate")]
#[command(about = "MCP tool server with header and URL parameter authorization fallback")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host to bind the server to (default: localhost)
    #[arg(long)]
    host: Option<String>,

    /// Port to run the server on (default: 8000)
    #[arg(short, long)]
    port: Option<u16>,

    /// Authorized API keys (space-separated). If none are provided, all requests are allowed.
    #[arg(short, long, num_args = 0.., value_delimiter = ' ')]
    keys: Option<Vec<String>>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the server (default)
    Serve,

    /// Generate a default configuration file
    Config {
        /// Output file path
        #[arg(short, long, default_value_os_t = default_config_path())]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file to validate
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show server information
    Info,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => start_server(config).await?,
        Commands::Config { output, force } => generate_config(output, force)?,
        Commands::Validate { file } => validate_config(file)?,
        Commands::Info => show_info(&config),
    }

    Ok(())
}

/// Load the config file, if any, and apply command line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Loading configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(host) = &cli.host {
        config.http.bind_address = host.clone();
    }

    if let Some(port) = cli.port {
        config.http.port = port;
    }

    // `--keys` with no values selects open mode; blank values are kept so
    // that validation rejects them.
    if let Some(keys) = &cli.keys {
        config.auth.api_keys = keys.clone();
    }

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    Ok(config)
}

/// Start the server
async fn start_server(config: Config) -> anyhow::Result<()> {
    let server = McpServer::new(config).context("Invalid server configuration")?;

    info!("Server configuration:");
    info!("  Name: {}", server.config().server.name);
    info!("  Version: {}", server.config().server.version);
    if let Some(ref instructions) = server.config().server.instructions {
        info!("  Instructions: {}", instructions);
    }

    server.run().await.context("Server error")?;
    Ok(())
}

/// Generate a default configuration file
fn generate_config(output: PathBuf, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            output.display()
        );
    }

    Config::default().to_file(&output)?;

    info!("Generated configuration file: {}", output.display());
    Ok(())
}

/// Validate a configuration file
fn validate_config(file: PathBuf) -> anyhow::Result<()> {
    info!("Validating configuration file: {}", file.display());

    let config = Config::from_file(&file)?;
    config.validate()?;

    if config.is_open_mode() {
        info!("Configuration file is valid (no keys configured: open mode)");
    } else {
        info!(
            "Configuration file is valid ({} authorized key(s))",
            config.auth.api_keys.len()
        );
    }
    Ok(())
}

/// Show server information
fn show_info(config: &Config) {
    info!("MCP Keygate");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Description: {}", env!("CARGO_PKG_DESCRIPTION"));
    info!("--------------------------------");
    info!("Endpoints:");
    info!("  GET  /           Server information");
    info!("  GET  /health     Health check");
    info!("  GET  /tools      Available tools");
    info!("  GET  /auth-test  Test authorization");
    info!("  POST /execute    Execute a tool");
    info!("Authorization (in order of precedence):");
    info!("  Authorization: Bearer <key> | ApiKey <key> | <key>");
    info!("  ?key=<key>, then ?auth=<key>");
    info!(
        "Listening address: {} ({})",
        config.http.bind_addr(),
        if config.is_open_mode() {
            "open mode"
        } else {
            "keys required"
        }
    );
    info!("--------------------------------");
    info!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));
}
