//! Configuration module for jerk-motion.
//!
//! Provides types for loading and validating per-axis kinematic limits
//! from TOML files (with `std` feature) or pre-parsed data, and for
//! applying them to an [`InputParameter`](crate::InputParameter).

#[cfg(feature = "std")]
mod loader;
mod validation;

#[cfg(feature = "std")]
pub use loader::load_config;
pub use validation::validate_config;

use heapless::Vec;
use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::input::InputParameter;

/// Maximum number of axes in a configuration.
pub const MAX_AXES: usize = 16;

/// Kinematic limit set for one axis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AxisLimits {
    /// Maximum velocity (>= 0).
    pub max_velocity: f64,
    /// Minimum velocity (<= 0); negated maximum when omitted.
    #[serde(default)]
    pub min_velocity: Option<f64>,
    /// Maximum acceleration (>= 0).
    pub max_acceleration: f64,
    /// Minimum acceleration (<= 0); negated maximum when omitted.
    #[serde(default)]
    pub min_acceleration: Option<f64>,
    /// Maximum jerk (> 0).
    pub max_jerk: f64,
}

/// Planner configuration: one limit set per axis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlannerConfig {
    /// Per-axis limits, in DoF order.
    pub axes: Vec<AxisLimits, MAX_AXES>,
}

impl PlannerConfig {
    /// Copy the configured limits into a planning input.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AxisCount`] when the axis count does not
    /// match the input's degrees of freedom.
    pub fn apply_to<const DOFS: usize>(&self, input: &mut InputParameter<DOFS>) -> Result<()> {
        if self.axes.len() != DOFS {
            return Err(ConfigError::AxisCount { expected: DOFS, actual: self.axes.len() }.into());
        }

        let mut min_velocity = [0.0; DOFS];
        let mut min_acceleration = [0.0; DOFS];
        let mut any_min_velocity = false;
        let mut any_min_acceleration = false;

        for (dof, axis) in self.axes.iter().enumerate() {
            input.max_velocity[dof] = axis.max_velocity;
            input.max_acceleration[dof] = axis.max_acceleration;
            input.max_jerk[dof] = axis.max_jerk;

            min_velocity[dof] = axis.min_velocity.unwrap_or(-axis.max_velocity);
            min_acceleration[dof] = axis.min_acceleration.unwrap_or(-axis.max_acceleration);
            any_min_velocity |= axis.min_velocity.is_some();
            any_min_acceleration |= axis.min_acceleration.is_some();
        }

        input.min_velocity = any_min_velocity.then_some(min_velocity);
        input.min_acceleration = any_min_acceleration.then_some(min_acceleration);
        Ok(())
    }
}
