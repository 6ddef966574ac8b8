//! Rule configuration.

use crate::error::{DetectorError, DetectorResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for wall detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Minimum level quantity that counts as a wall.
    pub min_volume: Decimal,
    /// Maximum distance from the side's best price, in percent.
    pub max_distance_pct: Decimal,
    /// Minimum time between two wall alerts.
    pub cooldown_secs: u64,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            min_volume: Decimal::from(10),
            max_distance_pct: Decimal::new(1, 1), // 0.1%
            cooldown_secs: 120,
        }
    }
}

impl WallConfig {
    pub fn validate(&self) -> DetectorResult<()> {
        if self.min_volume <= Decimal::ZERO {
            return Err(DetectorError::ConfigError(format!(
                "wall.min_volume ({}) must be positive",
                self.min_volume
            )));
        }
        if self.max_distance_pct.is_sign_negative() {
            return Err(DetectorError::ConfigError(format!(
                "wall.max_distance_pct ({}) must be non-negative",
                self.max_distance_pct
            )));
        }
        Ok(())
    }
}

/// Configuration for spread-spike detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Spread (quote units) that always counts as a spike.
    pub absolute_threshold: Decimal,
    /// Spike when spread >= baseline * multiplier.
    pub multiplier: Decimal,
    /// Minimum time between two spread alerts.
    pub cooldown_secs: u64,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            absolute_threshold: Decimal::from(10),
            multiplier: Decimal::from(3),
            cooldown_secs: 60,
        }
    }
}

impl SpreadConfig {
    pub fn validate(&self) -> DetectorResult<()> {
        if self.absolute_threshold <= Decimal::ZERO {
            return Err(DetectorError::ConfigError(format!(
                "spread.absolute_threshold ({}) must be positive",
                self.absolute_threshold
            )));
        }
        // A multiplier of 1 or less would fire on every widening tick.
        if self.multiplier <= Decimal::ONE {
            return Err(DetectorError::ConfigError(format!(
                "spread.multiplier ({}) must be greater than 1",
                self.multiplier
            )));
        }
        Ok(())
    }
}
