//! CLI command definitions for the `orderline` binary.
//!
//! Uses clap derive macros for argument parsing. Server settings can come
//! from flags, environment variables or `config.toml`, in that priority.

pub mod preview;
pub mod serve;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use orderline_observe::LogFormat;

/// Forward pizza orders to WhatsApp.
#[derive(Parser)]
#[command(name = "orderline", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, global = true, default_value = "pretty", env = "ORDERLINE_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Also export trace spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the order server.
    Serve(ServeArgs),

    /// Show the WhatsApp session status of a running server.
    Status {
        /// Base URL of the server.
        #[arg(long, default_value = "http://127.0.0.1:3000", env = "ORDERLINE_URL")]
        url: String,

        /// Output machine-readable JSON instead of styled text.
        #[arg(long)]
        json: bool,
    },

    /// Validate an order file and print the message it would send.
    Preview {
        /// Path to a JSON order body.
        file: PathBuf,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Flags for `orderline serve`. Each one overrides `config.toml`.
#[derive(Debug, Default, clap::Args)]
pub struct ServeArgs {
    /// Port to listen on.
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Host to bind to.
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Path to config.toml (defaults to the data directory).
    #[arg(long, env = "ORDERLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// The single origin allowed to call the API cross-origin.
    #[arg(long, env = "ORDERLINE_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Directory of the static ordering page.
    #[arg(long, env = "ORDERLINE_WEB_DIR")]
    pub web_dir: Option<String>,

    /// Base URL of the WhatsApp Web bridge.
    #[arg(long, env = "ORDERLINE_BRIDGE_URL")]
    pub bridge_url: Option<String>,

    /// API key for the bridge.
    #[arg(long, env = "ORDERLINE_BRIDGE_API_KEY", hide_env_values = true)]
    pub bridge_api_key: Option<String>,
}
