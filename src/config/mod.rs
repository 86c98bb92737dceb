//! Configuration management.

mod settings;
mod xdg;

pub use settings::{Config, ConfigError, ConfigOverrides};
pub use xdg::XdgDirs;
