//! XDG Base Directory support.

use std::path::PathBuf;

/// XDG directory paths for voxdesk.
pub struct XdgDirs {
    /// Config directory (~/.config/voxdesk or XDG_CONFIG_HOME/voxdesk)
    pub config: PathBuf,
    /// State directory (~/.local/state/voxdesk or XDG_STATE_HOME/voxdesk)
    pub state: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            config: std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| home.join(".config"))
                .join("voxdesk"),
            state: std::env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| home.join(".local/state"))
                .join("voxdesk"),
        }
    }

    /// Ensure all directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config, &self.state] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Path of the JSON config file.
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Path of the TUI log file.
    pub fn log_file(&self) -> PathBuf {
        self.state.join("voxdesk.log")
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_respects_xdg_env() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", tmp.path().join("cfg"));
        std::env::set_var("XDG_STATE_HOME", tmp.path().join("state"));

        let dirs = XdgDirs::new();
        assert_eq!(dirs.config, tmp.path().join("cfg").join("voxdesk"));
        assert_eq!(dirs.config_file(), tmp.path().join("cfg/voxdesk/config.json"));
        assert_eq!(dirs.log_file(), tmp.path().join("state/voxdesk/voxdesk.log"));

        dirs.ensure_dirs().unwrap();
        assert!(dirs.state.is_dir());

        std::env::remove_var("XDG_CONFIG_HOME");
        std::env::remove_var("XDG_STATE_HOME");
    }
}
