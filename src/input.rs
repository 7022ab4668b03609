//! Planner input: per-DoF states, bounds, and planning modes.

use libm::fabs;
use serde::Deserialize;

use crate::error::InputError;

/// How a degree of freedom is controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Full kinematic target: position, velocity, acceleration.
    #[default]
    Position,
    /// Velocity and acceleration target only.
    Velocity,
}

/// How a degree of freedom takes part in duration synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// All participating DoFs share the trajectory duration.
    #[default]
    Time,
    /// Shared duration plus shared timing and jerk signs, scaled by
    /// displacement; requires collinear boundary states.
    Phase,
    /// Like `Time`, except a DoF with zero target velocity and acceleration
    /// is left at its own minimum duration.
    TimeIfNecessary,
    /// The DoF ignores the common duration and runs its fastest profile.
    None,
}

/// Whether the trajectory duration may be arbitrary or must be a multiple
/// of the control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationDiscretization {
    /// Any duration.
    #[default]
    Continuous,
    /// Durations are rounded up onto multiples of the control cycle.
    Discrete,
}

/// Immutable planning input for `DOFS` degrees of freedom.
///
/// Minimum fields per enabled DoF are the current state, the target state
/// (target position only in [`ControlMode::Position`]) and the positive
/// bounds; the signed minima default to the negated maxima.
#[derive(Debug, Clone, PartialEq)]
pub struct InputParameter<const DOFS: usize> {
    /// Per-DoF participation. Disabled DoFs hold their current state.
    pub enabled: [bool; DOFS],
    /// Control mode applied to every DoF without a per-DoF override.
    pub control_mode: ControlMode,
    /// Optional per-DoF control modes.
    pub per_dof_control_mode: Option<[ControlMode; DOFS]>,

    /// Current position.
    pub current_position: [f64; DOFS],
    /// Current velocity.
    pub current_velocity: [f64; DOFS],
    /// Current acceleration.
    pub current_acceleration: [f64; DOFS],
    /// Target position (ignored in velocity control).
    pub target_position: [f64; DOFS],
    /// Target velocity.
    pub target_velocity: [f64; DOFS],
    /// Target acceleration.
    pub target_acceleration: [f64; DOFS],

    /// Maximum velocity (>= 0).
    pub max_velocity: [f64; DOFS],
    /// Minimum velocity (<= 0); negated maximum when absent.
    pub min_velocity: Option<[f64; DOFS]>,
    /// Maximum acceleration (>= 0).
    pub max_acceleration: [f64; DOFS],
    /// Minimum acceleration (<= 0); negated maximum when absent.
    pub min_acceleration: Option<[f64; DOFS]>,
    /// Maximum jerk (> 0).
    pub max_jerk: [f64; DOFS],

    /// Synchronization mode applied to every DoF without an override.
    pub synchronization: SyncMode,
    /// Optional per-DoF synchronization modes.
    pub per_dof_synchronization: Option<[SyncMode; DOFS]>,
    /// Duration discretization policy.
    pub duration_discretization: DurationDiscretization,
    /// Optional lower bound on the trajectory duration in seconds.
    pub minimum_duration: Option<f64>,
}

impl<const DOFS: usize> Default for InputParameter<DOFS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DOFS: usize> InputParameter<DOFS> {
    /// Input with all states zeroed, all DoFs enabled, and default modes.
    pub fn new() -> Self {
        Self {
            enabled: [true; DOFS],
            control_mode: ControlMode::default(),
            per_dof_control_mode: None,
            current_position: [0.0; DOFS],
            current_velocity: [0.0; DOFS],
            current_acceleration: [0.0; DOFS],
            target_position: [0.0; DOFS],
            target_velocity: [0.0; DOFS],
            target_acceleration: [0.0; DOFS],
            max_velocity: [0.0; DOFS],
            min_velocity: None,
            max_acceleration: [0.0; DOFS],
            min_acceleration: None,
            max_jerk: [0.0; DOFS],
            synchronization: SyncMode::default(),
            per_dof_synchronization: None,
            duration_discretization: DurationDiscretization::default(),
            minimum_duration: None,
        }
    }

    /// Number of degrees of freedom.
    #[inline]
    pub const fn degrees_of_freedom(&self) -> usize {
        DOFS
    }

    /// Resolved minimum velocity for a DoF.
    #[inline]
    pub fn min_velocity_at(&self, dof: usize) -> f64 {
        match &self.min_velocity {
            Some(v) => v[dof],
            None => -self.max_velocity[dof],
        }
    }

    /// Resolved minimum acceleration for a DoF.
    #[inline]
    pub fn min_acceleration_at(&self, dof: usize) -> f64 {
        match &self.min_acceleration {
            Some(a) => a[dof],
            None => -self.max_acceleration[dof],
        }
    }

    /// Resolved control mode for a DoF.
    #[inline]
    pub fn control_mode_at(&self, dof: usize) -> ControlMode {
        match &self.per_dof_control_mode {
            Some(m) => m[dof],
            None => self.control_mode,
        }
    }

    /// Resolved synchronization mode for a DoF.
    #[inline]
    pub fn sync_mode_at(&self, dof: usize) -> SyncMode {
        match &self.per_dof_synchronization {
            Some(m) => m[dof],
            None => self.synchronization,
        }
    }

    /// Check the input contract for every enabled DoF.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), InputError> {
        for dof in 0..DOFS {
            if !self.enabled[dof] {
                continue;
            }

            let values = [
                self.current_position[dof],
                self.current_velocity[dof],
                self.current_acceleration[dof],
                self.target_position[dof],
                self.target_velocity[dof],
                self.target_acceleration[dof],
                self.max_velocity[dof],
                self.min_velocity_at(dof),
                self.max_acceleration[dof],
                self.min_acceleration_at(dof),
                self.max_jerk[dof],
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(InputError::NonFinite { dof });
            }

            if self.max_jerk[dof] <= 0.0 {
                return Err(InputError::NonPositiveJerk { dof });
            }
            if self.max_velocity[dof] < 0.0 || self.min_velocity_at(dof) > 0.0 {
                return Err(InputError::VelocityBounds { dof });
            }
            if self.max_acceleration[dof] < 0.0 || self.min_acceleration_at(dof) > 0.0 {
                return Err(InputError::AccelerationBounds { dof });
            }

            if self.control_mode_at(dof) == ControlMode::Position {
                let vf = self.target_velocity[dof];
                if vf > self.max_velocity[dof] || vf < self.min_velocity_at(dof) {
                    return Err(InputError::TargetVelocityOutOfBounds { dof });
                }
            }
            let af = self.target_acceleration[dof];
            if af > self.max_acceleration[dof] || af < self.min_acceleration_at(dof) {
                return Err(InputError::TargetAccelerationOutOfBounds { dof });
            }

            if let Some(t_min) = self.minimum_duration {
                if !(t_min.is_finite() && t_min >= 0.0) {
                    return Err(InputError::InvalidMinimumDuration);
                }
            }
        }
        Ok(())
    }

    /// Whether `other` describes the same planning problem.
    pub fn is_same_problem(&self, other: &Self) -> bool {
        self == other
    }
}

/// Convenience check used by the `TimeIfNecessary` synchronization mode.
pub(crate) fn target_is_stationary(vf: f64, af: f64) -> bool {
    fabs(vf) < f64::EPSILON && fabs(af) < f64::EPSILON
}
