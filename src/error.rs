//! Error types for the jerk-motion library.
//!
//! Provides unified error handling across input validation, planning, and
//! configuration loading.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all jerk-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input contract violation
    Input(InputError),
    /// Trajectory planning failure
    Planning(PlanningError),
    /// Configuration parsing or validation error
    Config(ConfigError),
}

/// Input contract violations, reported per degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// A state or bound is NaN or infinite
    NonFinite {
        /// Offending degree of freedom
        dof: usize,
    },
    /// Maximum jerk must be strictly positive
    NonPositiveJerk {
        /// Offending degree of freedom
        dof: usize,
    },
    /// Velocity bounds must satisfy min <= 0 <= max
    VelocityBounds {
        /// Offending degree of freedom
        dof: usize,
    },
    /// Acceleration bounds must satisfy min <= 0 <= max
    AccelerationBounds {
        /// Offending degree of freedom
        dof: usize,
    },
    /// Target velocity lies outside the velocity bounds
    TargetVelocityOutOfBounds {
        /// Offending degree of freedom
        dof: usize,
    },
    /// Target acceleration lies outside the acceleration bounds
    TargetAccelerationOutOfBounds {
        /// Offending degree of freedom
        dof: usize,
    },
    /// The minimum-duration floor must be finite and non-negative
    InvalidMinimumDuration,
}

/// Planning failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanningError {
    /// The time-optimal search found no valid profile for a DoF
    ExecutionTime {
        /// Degree of freedom without a valid profile
        dof: usize,
    },
    /// No common duration satisfies every DoF, or the duration-constrained
    /// re-derivation failed at the selected duration
    Synchronization,
    /// The trajectory duration exceeds the enforced ceiling
    TrajectoryDuration {
        /// Computed duration in seconds
        duration: f64,
    },
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Axis count does not match the planner's degrees of freedom
    AxisCount {
        /// Axes expected by the planner
        expected: usize,
        /// Axes found in the configuration
        actual: usize,
    },
    /// Invalid maximum velocity (must be >= 0)
    InvalidMaxVelocity(f64),
    /// Invalid minimum velocity (must be <= 0)
    InvalidMinVelocity(f64),
    /// Invalid maximum acceleration (must be >= 0)
    InvalidMaxAcceleration(f64),
    /// Invalid minimum acceleration (must be <= 0)
    InvalidMinAcceleration(f64),
    /// Invalid maximum jerk (must be > 0)
    InvalidMaxJerk(f64),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Input(e) => write!(f, "Input error: {}", e),
            Error::Planning(e) => write!(f, "Planning error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NonFinite { dof } => {
                write!(f, "Non-finite state or bound for DoF {}", dof)
            }
            InputError::NonPositiveJerk { dof } => {
                write!(f, "Maximum jerk for DoF {} must be > 0", dof)
            }
            InputError::VelocityBounds { dof } => {
                write!(f, "Velocity bounds for DoF {} must satisfy min <= 0 <= max", dof)
            }
            InputError::AccelerationBounds { dof } => {
                write!(f, "Acceleration bounds for DoF {} must satisfy min <= 0 <= max", dof)
            }
            InputError::TargetVelocityOutOfBounds { dof } => {
                write!(f, "Target velocity for DoF {} exceeds the velocity bounds", dof)
            }
            InputError::TargetAccelerationOutOfBounds { dof } => {
                write!(f, "Target acceleration for DoF {} exceeds the acceleration bounds", dof)
            }
            InputError::InvalidMinimumDuration => {
                write!(f, "Minimum duration must be finite and >= 0")
            }
        }
    }
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningError::ExecutionTime { dof } => {
                write!(f, "No valid extremal profile for DoF {}", dof)
            }
            PlanningError::Synchronization => {
                write!(f, "No common duration satisfies all degrees of freedom")
            }
            PlanningError::TrajectoryDuration { duration } => {
                write!(f, "Trajectory duration {} s exceeds the enforced ceiling", duration)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::AxisCount { expected, actual } => {
                write!(f, "Expected {} axes, found {}", expected, actual)
            }
            ConfigError::InvalidMaxVelocity(v) => {
                write!(f, "Invalid max velocity: {}. Must be >= 0", v)
            }
            ConfigError::InvalidMinVelocity(v) => {
                write!(f, "Invalid min velocity: {}. Must be <= 0", v)
            }
            ConfigError::InvalidMaxAcceleration(v) => {
                write!(f, "Invalid max acceleration: {}. Must be >= 0", v)
            }
            ConfigError::InvalidMinAcceleration(v) => {
                write!(f, "Invalid min acceleration: {}. Must be <= 0", v)
            }
            ConfigError::InvalidMaxJerk(v) => write!(f, "Invalid max jerk: {}. Must be > 0", v),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Error::Input(e)
    }
}

impl From<PlanningError> for Error {
    fn from(e: PlanningError) -> Self {
        Error::Planning(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for InputError {}

#[cfg(feature = "std")]
impl std::error::Error for PlanningError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
