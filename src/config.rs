//! Configuration (`survival.toml`)
//!
//! Every section is optional; anything left out falls back to its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input::KeyBindings;

/// Environment variable naming a config file when none is passed on the
/// command line.
pub const CONFIG_ENV_VAR: &str = "SURVIVAL_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playfield: PlayfieldConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub keys: KeyBindings,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Size of the virtual canvas the simulation runs in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayfieldConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Target time between frames.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Ring the terminal bell on hits.
    #[serde(default = "default_true")]
    pub bell: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file.  The terminal is the game screen, so without a file nothing
    /// is logged.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_width() -> f32 { 800.0 }
fn default_height() -> f32 { 600.0 }
fn default_frame_ms() -> u64 { 16 }
fn default_volume() -> f32 { 0.8 }
fn default_true() -> bool { true }
fn default_filter() -> String { "info".to_string() }

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            bell: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: default_filter(),
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.audio.volume = config.audio.volume.clamp(0.0, 1.0);
        config.timing.frame_ms = config.timing.frame_ms.max(1);
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &content)
    }
}

/// Load the config named by `explicit` or [`CONFIG_ENV_VAR`].  With neither
/// set, the defaults are used.
pub fn load(explicit: Option<PathBuf>) -> Result<Config, ConfigError> {
    let path = explicit.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
    match path {
        Some(path) => Config::load_from(&path),
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Action;

    fn parse(s: &str) -> Result<Config, ConfigError> {
        Config::from_toml(Path::new("test.toml"), s)
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.playfield.width, 800.0);
        assert_eq!(config.playfield.height, 600.0);
        assert_eq!(config.timing.frame_ms, 16);
        assert!(config.audio.bell);
        assert!((config.audio.volume - 0.8).abs() < f32::EPSILON);
        assert!(config.log.file.is_none());
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = parse(
            r#"
            [playfield]
            width = 1024.0

            [keys]
            fire = ["f", " "]

            [log]
            file = "survival.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.playfield.width, 1024.0);
        assert_eq!(config.playfield.height, 600.0);
        assert_eq!(config.keys.resolve("F"), Some(Action::Fire));
        // untouched bindings keep their defaults
        assert_eq!(config.keys.resolve("q"), Some(Action::Shield));
        assert_eq!(config.log.file, Some(PathBuf::from("survival.log")));
    }

    #[test]
    fn test_volume_is_clamped() {
        let config = parse("[audio]\nvolume = 3.5\n").unwrap();
        assert_eq!(config.audio.volume, 1.0);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let err = parse("[playfield\nwidth = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load_from(Path::new("/nonexistent/survival.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = Config::default();
        config.timing.frame_ms = 33;
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(parse(&text).unwrap(), config);
    }
}
