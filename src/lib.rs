//! # jerk-motion
//!
//! Time-optimal, jerk-limited trajectory generation for multi-axis motion
//! systems.
//!
//! ## Features
//!
//! - **Time-optimal**: per-axis seven-segment jerk profiles, provably the
//!   fastest under velocity, acceleration, and jerk bounds
//! - **Synchronized**: all axes reach their targets at one common duration,
//!   optionally phase-synchronized for straight-line motion
//! - **Arbitrary states**: non-zero initial and target velocity and
//!   acceleration; inputs outside their limits are braked back first
//! - **Asymmetric bounds**: independent minimum velocity and acceleration
//! - **no_std compatible**: the planner core works without the standard
//!   library and performs no allocation
//! - **Configuration-driven**: per-axis limits loadable from TOML files
//!
//! ## Quick Start
//!
//! ```rust
//! use jerk_motion::{InputParameter, TrajectoryPlanner};
//!
//! let planner = TrajectoryPlanner::<1>::new();
//!
//! let mut input = InputParameter::<1>::new();
//! input.target_position = [1.0];
//! input.max_velocity = [1.0];
//! input.max_acceleration = [1.0];
//! input.max_jerk = [1.0];
//!
//! let trajectory = planner.calculate(&input, 0.01).unwrap();
//! let state = trajectory.at_time(trajectory.duration() / 2.0);
//! assert!(state.position[0] > 0.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod config;
pub mod error;
pub mod input;
pub mod plan;
pub mod profile;
pub mod roots;
pub mod trajectory;

mod planner;

// Re-exports for ergonomic API
pub use error::{ConfigError, Error, InputError, PlanningError, Result};
pub use input::{ControlMode, DurationDiscretization, InputParameter, SyncMode};
pub use planner::TrajectoryPlanner;
pub use profile::{BrakeProfile, Direction, JerkSigns, LimitKind, PositionExtrema, Profile};
pub use trajectory::{Trajectory, TrajectorySection, TrajectoryState};

// Configuration types
pub use config::{validate_config, AxisLimits, PlannerConfig};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;
