//! Command-line flags
//!
//! Every flag is optional: unset flags fall through to the config file and
//! built-in defaults. `SERVER_PORT` and `MEDIA_DIR` override their flags.

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "manofwar", version, about = "Serve a media directory over HTTP")]
pub struct Cli {
    /// Config file path without extension (e.g. `config` loads `config.toml`)
    #[arg(long, default_value = "config")]
    pub config: String,

    /// Server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory containing media files
    #[arg(long = "mediadir", value_name = "DIR")]
    pub media_dir: Option<String>,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// URL prefix the media directory is mounted under
    #[arg(long)]
    pub prefix: Option<String>,

    /// Tokio worker threads (defaults to CPU cores)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level or `tracing` filter directive
    #[arg(long)]
    pub log_level: Option<String>,
}
