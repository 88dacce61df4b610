use std::net::SocketAddr;
use std::path::Path;

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::olaoutput::{ChannelOrder, MAX_PIXELS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot load {path}: {reason}")]
    File { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pixel_count: usize,
    pub frame_interval_ms: u64,
    pub poll_every_frames: u32,
    pub idle_interval_ms: u64,
    pub quit_pulse_frames: u32,
    pub quit_pulse_interval_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub measure_fps: bool,
    pub output: OutputConfig,
    pub control: ControlConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub target: SocketAddr,
    pub universe: u16,
    pub channel_order: ChannelOrder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub listen: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pixel_count: 69,
            frame_interval_ms: 100,
            poll_every_frames: 1,
            idle_interval_ms: 50,
            quit_pulse_frames: 5,
            quit_pulse_interval_ms: 50,
            shutdown_timeout_ms: 10_000,
            measure_fps: false,
            output: OutputConfig::default(),
            control: ControlConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            target: SocketAddr::from(([127, 0, 0, 1], 7770)),
            universe: 0,
            channel_order: ChannelOrder::Rbg,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            listen: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config = match path {
            Some(path) => Config::from_config_file(path).map_err(|err| ConfigError::File {
                path: path.display().to_string(),
                reason: format!("{:?}", err),
            })?,
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixel_count == 0 || self.pixel_count > MAX_PIXELS {
            return Err(ConfigError::Invalid(format!(
                "pixel_count must be between 1 and {}, got {}",
                MAX_PIXELS, self.pixel_count
            )));
        }
        if self.poll_every_frames == 0 {
            return Err(ConfigError::Invalid(
                "poll_every_frames must be at least 1".to_string(),
            ));
        }
        // Zero would spin the engine; longer would make switching programs sluggish.
        for (key, value) in [
            ("frame_interval_ms", self.frame_interval_ms),
            ("idle_interval_ms", self.idle_interval_ms),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 1 and 100, got {}",
                    key, value
                )));
            }
        }
        Ok(())
    }
}
