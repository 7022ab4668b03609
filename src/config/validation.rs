//! Configuration validation.

use crate::config::PlannerConfig;
use crate::error::{ConfigError, Result};

/// Validate every axis limit set.
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate_config(config: &PlannerConfig) -> Result<()> {
    for axis in config.axes.iter() {
        if !(axis.max_velocity.is_finite() && axis.max_velocity >= 0.0) {
            return Err(ConfigError::InvalidMaxVelocity(axis.max_velocity).into());
        }
        if let Some(v) = axis.min_velocity {
            if !(v.is_finite() && v <= 0.0) {
                return Err(ConfigError::InvalidMinVelocity(v).into());
            }
        }
        if !(axis.max_acceleration.is_finite() && axis.max_acceleration >= 0.0) {
            return Err(ConfigError::InvalidMaxAcceleration(axis.max_acceleration).into());
        }
        if let Some(a) = axis.min_acceleration {
            if !(a.is_finite() && a <= 0.0) {
                return Err(ConfigError::InvalidMinAcceleration(a).into());
            }
        }
        if !(axis.max_jerk.is_finite() && axis.max_jerk > 0.0) {
            return Err(ConfigError::InvalidMaxJerk(axis.max_jerk).into());
        }
    }
    Ok(())
}
