//! Configuration for gnupipe sessions.
//!
//! Settings are read from `~/.gnupipe/config.toml`. Every field is optional;
//! anything missing falls back to the defaults below.
//!
//! ```toml
//! # Plotting program, looked up on PATH
//! program = "gnuplot"
//! args = ["-persist"]
//!
//! # Initial plot style: lines, points, linespoints, impulses, dots,
//! #                     steps, errorbars, boxes, boxerrorbars
//! style = "points"
//!
//! # Warn at start-up when DISPLAY is unset (ignored on Windows)
//! check_display = true
//!
//! # Capacity of the per-session write buffer, in bytes
//! buffer_size = 8192
//!
//! # Longest combined multi-series header that will be sent
//! max_command_len = 2047
//!
//! # Log level for the gnupipe binary
//! log_level = "info"
//!
//! # Sent right after start-up when present
//! terminal = "png"
//! output = "plot.png"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::command::MAX_COMMAND_LEN;
use crate::core::style::PlotStyle;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not determine config path")]
    NoHome,
}

/// Session and binary configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plotting program
    pub program: String,
    /// Extra arguments for the program
    pub args: Vec<String>,
    /// Initial plot style
    pub style: PlotStyle,
    /// Warn when DISPLAY is unset
    pub check_display: bool,
    /// Write buffer capacity
    pub buffer_size: usize,
    /// Ceiling for multi-series header lines
    pub max_command_len: usize,
    /// Log level name for the binary
    pub log_level: String,
    /// `set terminal` value sent at start-up
    pub terminal: Option<String>,
    /// `set output` file sent at start-up
    pub output: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: "gnuplot".to_string(),
            args: Vec::new(),
            style: PlotStyle::default(),
            check_display: true,
            buffer_size: 8192,
            max_command_len: MAX_COMMAND_LEN,
            log_level: "info".to_string(),
            terminal: None,
            output: None,
        }
    }
}

impl Config {
    /// Load configuration from the default path, or defaults on any failure
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(config) = Self::load_from(&path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    /// Load configuration from `path`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::get_config_path().ok_or(ConfigError::NoHome)?;
        self.save_to(&path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory holding the config file and the log
    pub fn config_dir() -> Option<PathBuf> {
        let dir = home_dir()?.join(".gnupipe");
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.program, "gnuplot");
        assert_eq!(config.style, PlotStyle::Points);
        assert_eq!(config.max_command_len, 2047);
        assert!(config.check_display);
        assert!(config.terminal.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "program = \"gnuplot-nox\"\nstyle = \"lines\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.program, "gnuplot-nox");
        assert_eq!(config.style, PlotStyle::Lines);
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unknown_style_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "style = \"sparkles\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            args: vec!["-persist".to_string()],
            terminal: Some("png".to_string()),
            output: Some("out.png".to_string()),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
