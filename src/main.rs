//! voxdesk - terminal admin console for voice-agent platforms
//!
//! Without a subcommand the full-screen console starts; subcommands are for
//! scripting.

use std::path::PathBuf;

use clap::Parser;
use voxdesk::cli::Command;
use voxdesk::config::ConfigOverrides;
use voxdesk::runner::{run_cli, run_tui, AppConfig};

/// voxdesk - manage voice agents, numbers and calls from the terminal ☎
#[derive(Parser, Debug)]
#[command(name = "voxdesk")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Base URL of the platform API
    #[arg(long, env = "VOXDESK_API_URL", global = true)]
    api_url: Option<String>,

    /// Bearer token for the platform API
    #[arg(long, env = "VOXDESK_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Publishable key of the payment provider
    #[arg(long, env = "VOXDESK_STRIPE_PUBLISHABLE_KEY", hide_env_values = true, global = true)]
    stripe_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Config file (defaults to $XDG_CONFIG_HOME/voxdesk/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Enable verbose (trace-level) logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl From<&Args> for AppConfig {
    fn from(args: &Args) -> Self {
        AppConfig {
            debug: args.debug,
            verbose: args.verbose,
            config_path: args.config.clone(),
            overrides: ConfigOverrides {
                api_url: args.api_url.clone(),
                api_token: args.token.clone(),
                stripe_publishable_key: args.stripe_key.clone(),
                timeout_secs: args.timeout,
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();
    let config = AppConfig::from(&args);

    match args.command.take() {
        Some(command) => run_cli(config, command),
        None => run_tui(config),
    }
}
