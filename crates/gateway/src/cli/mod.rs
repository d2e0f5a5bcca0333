pub mod ask;
pub mod config;

use clap::{Parser, Subcommand};

/// Strata: a domain-scoped chat gateway over model-serving endpoints.
#[derive(Debug, Parser)]
#[command(name = "strata", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Send a single chat message and print the reply.
    Ask {
        /// The message to send.
        message: String,
        /// Endpoint to invoke.  Defaults to the catalog's default endpoint.
        #[arg(long)]
        endpoint: Option<String>,
        /// Domain id for prompt and endpoint scoping.
        #[arg(long)]
        domain: Option<String>,
        /// Site id to focus the answer on.
        #[arg(long)]
        site: Option<String>,
        /// Continue an existing conversation.
        #[arg(long)]
        conversation: Option<String>,
        /// Print the reply as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `STRATA_CONFIG` (or
/// `config.toml` by default).  A missing file yields the defaults.
///
/// Returns the parsed config and the path that was used.
pub fn load_config() -> anyhow::Result<(st_domain::config::Config, String)> {
    let config_path = std::env::var("STRATA_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = parse_config_file(std::path::Path::new(&config_path))?;
    Ok((config, config_path))
}

fn parse_config_file(path: &std::path::Path) -> anyhow::Result<st_domain::config::Config> {
    if !path.exists() {
        return Ok(st_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}
