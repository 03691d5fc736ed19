//! Board configuration.
//!
//! Loaded from `~/.queueboard/config.toml`, or the file given with `--config`.
//! Every key is optional; a missing default file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Board configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Heading printed above the board.
    pub title: String,

    /// Notification sound file. When unset, the terminal bell is used.
    pub sound: Option<PathBuf>,

    /// Program that plays `sound`, given the file path as its only argument.
    /// Defaults to `afplay` on macOS and `aplay` elsewhere.
    pub player: Option<String>,

    /// How often a followed feed is checked for new snapshots.
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Support Queue".to_string(),
            sound: None,
            player: None,
            poll_interval_ms: 250,
        }
    }
}

impl Config {
    /// Load config from `explicit` if given, else from `~/.queueboard/config.toml`.
    ///
    /// An explicit path must exist. The default path may be missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        if let Some(path) = explicit {
            let contents = fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            return Self::parse(&contents, path);
        }

        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };
        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(format!("failed to read {}: {e}", path.display())),
        }
    }

    /// The default config file path: `~/.queueboard/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".queueboard").join("config.toml"))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if config.sound.as_ref().is_some_and(|s| s.as_os_str().is_empty()) {
            return Err(format!(
                "sound is empty in {}\n\
                 Remove the key to use the terminal bell.",
                path.display()
            ));
        }

        Ok(config)
    }
}
