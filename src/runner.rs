//! Application Runner Module
//!
//! Shared entry points for the interactive console and the scripting CLI:
//! logging setup, configuration resolution and runtime creation.

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::ApiClient;
use crate::cli::{self, Command};
use crate::config::{Config, ConfigOverrides, XdgDirs};
use crate::session::Session;

/// Options shared by every mode, taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Enable debug logging
    pub debug: bool,
    /// Enable verbose (trace-level) logging
    pub verbose: bool,
    /// Config file to read instead of the XDG default
    pub config_path: Option<PathBuf>,
    /// Flag / environment values layered over the config file
    pub overrides: ConfigOverrides,
}

impl AppConfig {
    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// Resolve the effective configuration: flags and environment over the
    /// config file over defaults.
    pub fn load(&self, dirs: &XdgDirs) -> anyhow::Result<Config> {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| dirs.config_file());
        let config = Config::load_from(&path)?.with_overrides(self.overrides.clone())?;
        Ok(config)
    }
}

fn build_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")
}

/// Run the TUI application.
///
/// Logs go to a file in the state directory; the terminal belongs to the UI.
///
/// # Errors
///
/// Returns an error if the TUI feature is not enabled or if the TUI fails to start.
#[cfg(feature = "tui")]
pub fn run_tui(app: AppConfig) -> anyhow::Result<()> {
    use std::fs::OpenOptions;

    let dirs = XdgDirs::new();
    dirs.ensure_dirs().context("Failed to create state directory")?;
    let log_path = dirs.log_file();
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(app.default_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(log_file)),
        )
        .init();

    let config = app.load(&dirs)?;
    tracing::info!(api_url = %config.api_url, "Starting console");
    let session = Session::new(config.api_token.clone());

    let runtime = build_runtime()?;
    runtime.block_on(crate::tui::run(config, session))
}

#[cfg(not(feature = "tui"))]
pub fn run_tui(_app: AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("TUI feature not enabled. Recompile with --features tui")
}

/// Run one scripting subcommand. Logs go to stderr so stdout stays parseable.
///
/// # Errors
///
/// Returns the first configuration, network or output error.
pub fn run_cli(app: AppConfig, command: Command) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(app.default_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = app.load(&XdgDirs::new())?;
    let session = Session::new(config.api_token.clone());
    let client = ApiClient::new(&config, session)?;

    let runtime = build_runtime()?;
    runtime.block_on(cli::run(command, &client, config.call_log_page_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_url": "https://file.example.com", "timeout_secs": 10}}"#).unwrap();

        let app = AppConfig {
            config_path: Some(file.path().to_path_buf()),
            overrides: ConfigOverrides {
                api_url: Some("https://flag.example.com".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = app.load(&XdgDirs::new()).unwrap();
        assert_eq!(config.api_url, "https://flag.example.com");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.call_log_page_size, 20);
    }

    #[test]
    fn test_log_level_from_flags() {
        let verbose = AppConfig {
            verbose: true,
            debug: true,
            ..Default::default()
        };
        assert_eq!(verbose.default_filter(), "trace");
        assert_eq!(AppConfig::default().default_filter(), "info");
    }
}
