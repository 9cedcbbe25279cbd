use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::window::{Point, Size};

pub const DEFAULT_Z_INDEX_MIN: i32 = 1024;
pub const DEFAULT_Z_INDEX_MAX: i32 = 2047;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read window config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid window config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Construction-time settings for one window store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowStoreConfig {
    pub z_index_min: i32,
    pub z_index_max: i32,
    /// Used only the first time a key is admitted
    pub default_position: Point,
    pub default_size: Size,
    /// Floor applied by resize drags, not by open
    pub minimum_size: Size,
}

impl Default for WindowStoreConfig {
    fn default() -> Self {
        Self {
            z_index_min: DEFAULT_Z_INDEX_MIN,
            z_index_max: DEFAULT_Z_INDEX_MAX,
            default_position: Point::new(64.0, 64.0),
            default_size: Size::new(480.0, 360.0),
            minimum_size: Size::new(160.0, 120.0),
        }
    }
}

impl WindowStoreConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Number of windows that can be open at once
    pub fn capacity(&self) -> usize {
        let span = i64::from(self.z_index_max) - i64::from(self.z_index_min) + 1;
        usize::try_from(span).unwrap_or(usize::MAX)
    }

    /// Repair values the store cannot work with instead of rejecting them
    pub fn sanitized(self) -> Self {
        let (mut z_min, z_max) = if self.z_index_min > self.z_index_max {
            (self.z_index_max, self.z_index_min)
        } else {
            (self.z_index_min, self.z_index_max)
        };
        // Keep one value below the floor representable
        if z_min == i32::MIN {
            z_min += 1;
        }
        let z_max = z_max.max(z_min);

        Self {
            z_index_min: z_min,
            z_index_max: z_max,
            default_position: self.default_position.sanitized(),
            default_size: self.default_size.sanitized(),
            minimum_size: self.minimum_size.sanitized(),
        }
    }
}
