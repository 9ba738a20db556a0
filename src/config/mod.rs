// Configuration module entry point
// Loads the immutable process configuration and builds the shared state

mod state;
mod types;

use crate::cli::Cli;
use crate::error::StartupError;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, MediaConfig, PerformanceConfig, ServerConfig};

/// Environment variable overriding `--port`
pub const PORT_ENV: &str = "SERVER_PORT";
/// Environment variable overriding `--mediadir`
pub const MEDIA_DIR_ENV: &str = "MEDIA_DIR";

impl Config {
    /// Load configuration from defaults, the config file, flags and the
    /// process environment
    pub fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        Self::load_with(cli, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit environment lookup
    ///
    /// Precedence, lowest first: defaults, config file, flags, environment.
    pub fn load_with(
        cli: &Cli,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let env = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&cli.config).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("media.dir", "./media")?
            .set_default("media.prefix", "/media/")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("performance.request_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            // Command-line flags
            .set_override_option("server.host", cli.host.clone())?
            .set_override_option("server.port", cli.port.map(i64::from))?
            .set_override_option(
                "server.workers",
                cli.workers.and_then(|w| i64::try_from(w).ok()),
            )?
            .set_override_option("media.dir", cli.media_dir.clone())?
            .set_override_option("media.prefix", cli.prefix.clone())?
            .set_override_option("logging.level", cli.log_level.clone())?
            // Environment variables take precedence over flags
            .set_override_option("server.port", env(PORT_ENV))?
            .set_override_option("media.dir", env(MEDIA_DIR_ENV))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| StartupError::Address(format!("{}: {e}", self.server.host)))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Absolute form of the media directory, resolved against the working
    /// directory; the directory does not have to exist yet
    pub fn media_root(&self) -> Result<PathBuf, StartupError> {
        std::path::absolute(&self.media.dir).map_err(|source| StartupError::MediaDir {
            path: self.media.dir.clone(),
            source,
        })
    }
}
