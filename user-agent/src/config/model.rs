// src/config/model.rs

use serde::Deserialize;
use std::{path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

use shared::constants::{MESSAGE_CAPACITY, dev_path};

/// Top-level runtime config
#[derive(Debug, Clone)]
pub struct Config {
    pub device:   DeviceConfig,
    pub exercise: ExerciseConfig,
    pub logging:  LoggingConfig,
}

/// Where the device lives and how to reach it
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub path:    PathBuf,
    pub backend: Backend,
}

/// What to send and how often
#[derive(Debug, Clone)]
pub struct ExerciseConfig {
    pub message:  String,
    pub read_len: usize,
    pub repeat:   u32,
    pub interval: Duration,
    pub json:     bool,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]            pub enable: bool,
    #[serde(default)]            pub file:   Option<String>,
    #[serde(default = "default_level")] pub level: String,
}
fn default_level() -> String { "INFO".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: default_level() }
    }
}

/// Holds the raw TOML before validation
#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)] pub device:   RawDevice,
    #[serde(default)] pub exercise: RawExercise,
    #[serde(default)] pub logging:  LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDevice {
    pub path:    Option<String>,
    pub backend: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawExercise {
    pub message:  Option<String>,
    pub read_len: Option<usize>,
    pub repeat:   Option<u32>,
    pub interval: Option<String>,
    #[serde(default)]
    pub json:     bool,
}

/// How the agent talks to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// A real device node opened through the filesystem
    Node,
    /// The driver loaded in-process on a simulated platform
    Simulated,
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend '{0}' (expected \"node\" or \"simulated\")")]
    InvalidBackend(String),

    #[error("invalid duration '{0}': {1}")]
    InvalidDuration(String, #[source] humantime::DurationError),

    #[error("repeat must be at least 1")]
    ZeroRepeat,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Allow `"Simulated"` → `Backend::Simulated`
impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node"                => Ok(Backend::Node),
            "simulated" | "sim"   => Ok(Backend::Simulated),
            other                 => Err(ConfigError::InvalidBackend(other.into())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig {
                path:    PathBuf::from(dev_path()),
                backend: Backend::Simulated,
            },
            exercise: ExerciseConfig {
                message:  "Hello from user space".into(),
                read_len: MESSAGE_CAPACITY,
                repeat:   1,
                interval: Duration::ZERO,
                json:     false,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let defaults = Config::default();

        let backend = match raw.device.backend {
            Some(b) => b.parse()?,
            None    => defaults.device.backend,
        };
        let interval = match raw.exercise.interval {
            Some(txt) => humantime::parse_duration(&txt)
                .map_err(|e| ConfigError::InvalidDuration(txt, e))?,
            None => defaults.exercise.interval,
        };
        let repeat = raw.exercise.repeat.unwrap_or(defaults.exercise.repeat);
        if repeat == 0 {
            return Err(ConfigError::ZeroRepeat);
        }

        Ok(Config {
            device: DeviceConfig {
                path: raw.device.path.map(PathBuf::from).unwrap_or(defaults.device.path),
                backend,
            },
            exercise: ExerciseConfig {
                message:  raw.exercise.message.unwrap_or(defaults.exercise.message),
                read_len: raw.exercise.read_len.unwrap_or(defaults.exercise.read_len),
                repeat,
                interval,
                json:     raw.exercise.json,
            },
            logging: raw.logging,
        })
    }
}
