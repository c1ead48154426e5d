//! Ride configuration, optionally loaded from TOML.
//!
//! Every section is optional; missing fields fall back to their defaults.
//!
//! ```toml
//! [track]
//! length = 24.0
//! hill_count = 4
//! origin = [-12.0, 0.0, -3.0]
//!
//! [motion]
//! top_speed = 0.001
//!
//! [seats]
//! columns = 2
//!
//! [pacing]
//! mode = "fixed_step"
//! hz = 75.0
//! max_steps = 8
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::MotionParams;
use crate::passenger::SeatLayout;
use crate::ride::Pacing;
use crate::track::TrackParams;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to build a [`Ride`](crate::Ride).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RideConfig {
    pub track: TrackParams,
    pub motion: MotionParams,
    pub seats: SeatLayout,
    pub pacing: Pacing,
}

impl RideConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(mut self, track: TrackParams) -> Self {
        self.track = track;
        self
    }

    pub fn motion(mut self, motion: MotionParams) -> Self {
        self.motion = motion;
        self
    }

    pub fn seats(mut self, seats: SeatLayout) -> Self {
        self.seats = seats;
        self
    }

    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RideConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.track.validate()?;
        self.motion.validate()?;
        self.seats.validate()?;
        self.pacing.validate()
    }
}
