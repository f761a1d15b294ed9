//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the job's log file.
    pub log_file_path: PathBuf,

    /// How often to check whether the log must be re-read, in seconds.
    pub poll_interval_secs: u64,

    /// How often to refresh the status line, in seconds.
    pub render_interval_secs: u64,

    /// Optional label shown before the status line (e.g. an account name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file_path: PathBuf::from("runtime.log"),
            poll_interval_secs: 5,
            render_interval_secs: 1,
            remark: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(path) = default_config_file() {
            figment = figment.merge(Toml::file(path));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (MT_*)
        figment = figment.merge(Env::prefixed("MT_"));

        let config: Self = figment.extract()?;
        config.validate().map_err(figment::Error::from)?;
        Ok(config)
    }

    /// Replaces the log path when one was given on the command line.
    #[must_use]
    pub fn with_log_file(mut self, log_file: Option<&Path>) -> Self {
        if let Some(path) = log_file {
            self.log_file_path = path.to_path_buf();
        }
        self
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub const fn render_interval(&self) -> Duration {
        Duration::from_secs(self.render_interval_secs)
    }

    fn validate(&self) -> Result<(), String> {
        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be greater than zero".to_string());
        }
        if self.render_interval_secs == 0 {
            return Err("render_interval_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Returns the platform-specific config directory for mt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mower-timer"))
}

/// Returns the default config file location.
///
/// On Linux: `~/.config/mower-timer/config.toml`
pub fn default_config_file() -> Option<PathBuf> {
    dirs_config_path().map(|p| p.join("config.toml"))
}
