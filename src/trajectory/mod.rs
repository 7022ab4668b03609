//! Trajectory planning and sampling facade.
//!
//! Orchestrates the per-DoF passes: braking for limit-violating inputs,
//! the time-optimal search, common-duration selection, and the per-DoF
//! resolution of the synchronization modes (including phase synchronization
//! for collinear inputs and duration-constrained re-derivation for the
//! rest). The completed trajectory is immutable and sampled read-only.

use libm::fabs;

use crate::error::{Error, PlanningError, Result};
use crate::input::{
    target_is_stationary, ControlMode, DurationDiscretization, InputParameter, SyncMode,
};
use crate::plan::{
    synchronize, Block, PositionMinTime, PositionSyncTime, VelocityMinTime, VelocitySyncTime,
};
use crate::profile::{BrakeProfile, Direction, JerkSigns, LimitKind, PositionExtrema, Profile};

/// Soft ceiling on the trajectory duration, enforced on request.
pub const MAX_DURATION: f64 = 7.6e3;

/// Where a sampled time falls relative to the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectorySection {
    /// Inside the planned trajectory.
    Within,
    /// At or beyond the duration; constant-acceleration extrapolation.
    Beyond,
}

/// Kinematic state of every DoF at one sampled time.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryState<const DOFS: usize> {
    /// Position per DoF.
    pub position: [f64; DOFS],
    /// Velocity per DoF.
    pub velocity: [f64; DOFS],
    /// Acceleration per DoF.
    pub acceleration: [f64; DOFS],
    /// Section the sample falls in.
    pub section: TrajectorySection,
}

/// A completed, immutable trajectory over `DOFS` degrees of freedom.
#[derive(Debug, Clone)]
pub struct Trajectory<const DOFS: usize> {
    profiles: [Profile; DOFS],
    duration: f64,
    independent_min_durations: [f64; DOFS],
    p0s: [f64; DOFS],
    v0s: [f64; DOFS],
    a0s: [f64; DOFS],
}

impl<const DOFS: usize> Trajectory<DOFS> {
    /// Plan a trajectory for the given input.
    ///
    /// `delta_time` is the control cycle used for discrete durations.
    ///
    /// # Errors
    ///
    /// See [`PlanningError`] for the failure modes.
    pub(crate) fn plan(
        input: &InputParameter<DOFS>,
        delta_time: f64,
        enforce_duration_limit: bool,
    ) -> Result<Self> {
        input.validate()?;

        let mut profiles = [Profile::default(); DOFS];
        let mut blocks = [Block::default(); DOFS];
        let mut independent_min_durations = [0.0; DOFS];
        let mut p0s = [0.0; DOFS];
        let mut v0s = [0.0; DOFS];
        let mut a0s = [0.0; DOFS];

        for dof in 0..DOFS {
            if !input.enabled[dof] {
                // Disabled DoFs hold their current state.
                profiles[dof].set_boundary(
                    input.current_position[dof],
                    input.current_velocity[dof],
                    input.current_acceleration[dof],
                    input.current_position[dof],
                    input.current_velocity[dof],
                    input.current_acceleration[dof],
                );
                continue;
            }

            let v_min = input.min_velocity_at(dof);
            let a_min = input.min_acceleration_at(dof);
            let control = input.control_mode_at(dof);

            let mut brake = match control {
                ControlMode::Position => BrakeProfile::position_brake(
                    input.current_velocity[dof],
                    input.current_acceleration[dof],
                    input.max_velocity[dof],
                    v_min,
                    input.max_acceleration[dof],
                    a_min,
                    input.max_jerk[dof],
                ),
                ControlMode::Velocity => BrakeProfile::velocity_control_brake(
                    input.current_acceleration[dof],
                    input.max_acceleration[dof],
                    a_min,
                    input.max_jerk[dof],
                ),
            };
            let (p0, v0, a0) = brake.integrate_from(
                input.current_position[dof],
                input.current_velocity[dof],
                input.current_acceleration[dof],
            );
            p0s[dof] = p0;
            v0s[dof] = v0;
            a0s[dof] = a0;

            let mut working = Profile::default();
            working.brake = brake;
            working.set_boundary(
                p0,
                v0,
                a0,
                input.target_position[dof],
                input.target_velocity[dof],
                input.target_acceleration[dof],
            );

            let block = match control {
                ControlMode::Position => PositionMinTime::new(
                    p0,
                    v0,
                    a0,
                    input.target_position[dof],
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_velocity[dof],
                    v_min,
                    input.max_acceleration[dof],
                    a_min,
                    input.max_jerk[dof],
                )
                .plan(&working),
                ControlMode::Velocity => VelocityMinTime::new(
                    v0,
                    a0,
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_acceleration[dof],
                    a_min,
                    input.max_jerk[dof],
                )
                .plan(&working),
            };
            let block = block.ok_or(Error::Planning(PlanningError::ExecutionTime { dof }))?;

            // Default every DoF to its fastest profile; synchronization
            // overwrites where needed. Zero-duration plans then sample
            // correctly without special cases.
            profiles[dof] = block.p_min;
            independent_min_durations[dof] = block.t_min;
            blocks[dof] = block;
        }

        let delta = match input.duration_discretization {
            DurationDiscretization::Discrete => Some(delta_time),
            DurationDiscretization::Continuous => None,
        };
        let sync = synchronize(&blocks, input.minimum_duration, delta)
            .ok_or(Error::Planning(PlanningError::Synchronization))?;
        let duration = sync.t_sync;

        if enforce_duration_limit && duration > MAX_DURATION {
            return Err(Error::Planning(PlanningError::TrajectoryDuration { duration }));
        }

        let eps_t = 16.0 * f64::EPSILON * (1.0 + duration);

        // The limiting DoF's profile comes straight from its block, unless
        // quantization moved the duration off it.
        let mut limiting_dof = sync.limiting_dof;
        if let (Some(dof), Some(profile)) = (sync.limiting_dof, sync.profile) {
            if fabs(profile.total_duration() - duration) < eps_t {
                profiles[dof] = profile;
            } else {
                limiting_dof = None;
            }
        }

        let assemble = |profiles: [Profile; DOFS]| Self {
            profiles,
            duration,
            independent_min_durations,
            p0s,
            v0s,
            a0s,
        };

        if duration == 0.0 {
            return Ok(assemble(profiles));
        }

        if (0..DOFS).all(|d| input.sync_mode_at(d) == SyncMode::None) {
            return Ok(assemble(profiles));
        }

        // Phase synchronization for collinear inputs.
        if (0..DOFS).any(|d| input.sync_mode_at(d) == SyncMode::Phase)
            && (0..DOFS).all(|d| input.control_mode_at(d) == ControlMode::Position)
        {
            if let Some(limiting) = limiting_dof {
                if let Some(new_max_jerk) =
                    phase_scaled_jerks(input, limiting, profiles[limiting].direction)
                {
                    let mut phase_ok = true;
                    for dof in 0..DOFS {
                        if !input.enabled[dof]
                            || dof == limiting
                            || input.sync_mode_at(dof) != SyncMode::Phase
                        {
                            continue;
                        }

                        let limiting_profile = profiles[limiting];
                        let p = &mut profiles[dof];
                        let t_profile = duration - p.brake.duration;

                        p.t = limiting_profile.t;
                        p.set_boundary(
                            p0s[dof],
                            v0s[dof],
                            a0s[dof],
                            input.target_position[dof],
                            input.target_velocity[dof],
                            input.target_acceleration[dof],
                        );
                        match limiting_profile.jerk_signs {
                            JerkSigns::Uddu => p.set_uddu(new_max_jerk[dof]),
                            JerkSigns::Udud => p.set_udud(new_max_jerk[dof]),
                        }

                        if !p.check_with_timing(
                            LimitKind::None,
                            t_profile,
                            new_max_jerk[dof],
                            input.target_position[dof],
                            input.target_velocity[dof],
                            input.target_acceleration[dof],
                            input.max_velocity[dof],
                            input.min_velocity_at(dof),
                            input.max_acceleration[dof],
                            input.min_acceleration_at(dof),
                            input.max_jerk[dof],
                        ) {
                            phase_ok = false;
                        }
                        p.limits = limiting_profile.limits;
                    }

                    if phase_ok
                        && (0..DOFS).all(|d| {
                            matches!(input.sync_mode_at(d), SyncMode::Phase | SyncMode::None)
                        })
                    {
                        return Ok(assemble(profiles));
                    }
                }
            }
        }

        // Time synchronization: every remaining DoF re-derives its profile
        // at the enforced duration.
        for dof in 0..DOFS {
            if !input.enabled[dof] || input.sync_mode_at(dof) == SyncMode::None {
                continue;
            }
            if Some(dof) == limiting_dof {
                continue;
            }

            if input.sync_mode_at(dof) == SyncMode::TimeIfNecessary
                && target_is_stationary(
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                )
            {
                profiles[dof] = blocks[dof].p_min;
                continue;
            }

            // An extremal profile whose duration already matches is reused.
            if fabs(duration - blocks[dof].t_min) < eps_t {
                profiles[dof] = blocks[dof].p_min;
                continue;
            }
            if let Some(interval) = blocks[dof].a {
                if fabs(duration - interval.right) < eps_t {
                    profiles[dof] = interval.profile;
                    continue;
                }
            }
            if let Some(interval) = blocks[dof].b {
                if fabs(duration - interval.right) < eps_t {
                    profiles[dof] = interval.profile;
                    continue;
                }
            }

            let p = &mut profiles[dof];
            let t_profile = duration - p.brake.duration;
            p.set_boundary(
                p0s[dof],
                v0s[dof],
                a0s[dof],
                input.target_position[dof],
                input.target_velocity[dof],
                input.target_acceleration[dof],
            );

            let found = match input.control_mode_at(dof) {
                ControlMode::Position => PositionSyncTime::new(
                    t_profile,
                    p0s[dof],
                    v0s[dof],
                    a0s[dof],
                    input.target_position[dof],
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_velocity[dof],
                    input.min_velocity_at(dof),
                    input.max_acceleration[dof],
                    input.min_acceleration_at(dof),
                    input.max_jerk[dof],
                )
                .plan(p),
                ControlMode::Velocity => VelocitySyncTime::new(
                    t_profile,
                    v0s[dof],
                    a0s[dof],
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_acceleration[dof],
                    input.min_acceleration_at(dof),
                    input.max_jerk[dof],
                )
                .plan(p),
            };
            if !found {
                return Err(Error::Planning(PlanningError::Synchronization));
            }
        }

        Ok(assemble(profiles))
    }

    /// Duration of the synchronized trajectory in seconds.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Number of degrees of freedom.
    #[inline]
    pub const fn degrees_of_freedom(&self) -> usize {
        DOFS
    }

    /// Minimum duration each DoF would need on its own.
    #[inline]
    pub fn independent_min_durations(&self) -> &[f64; DOFS] {
        &self.independent_min_durations
    }

    /// Per-DoF profiles of the completed trajectory.
    #[inline]
    pub fn profiles(&self) -> &[Profile; DOFS] {
        &self.profiles
    }

    /// Starting state of a DoF after its brake prefix.
    #[inline]
    pub fn start_state(&self, dof: usize) -> (f64, f64, f64) {
        (self.p0s[dof], self.v0s[dof], self.a0s[dof])
    }

    /// Kinematic state of every DoF at time `time`.
    ///
    /// Beyond the duration the state continues with constant acceleration
    /// from each DoF's final state.
    pub fn at_time(&self, time: f64) -> TrajectoryState<DOFS> {
        let mut state = TrajectoryState {
            position: [0.0; DOFS],
            velocity: [0.0; DOFS],
            acceleration: [0.0; DOFS],
            section: TrajectorySection::Within,
        };

        if time >= self.duration {
            state.section = TrajectorySection::Beyond;
            for dof in 0..DOFS {
                let p = &self.profiles[dof];
                let t_diff = time - p.total_duration();
                let (pos, vel, acc) = Profile::integrate(t_diff, p.pf, p.vf, p.af, 0.0);
                state.position[dof] = pos;
                state.velocity[dof] = vel;
                state.acceleration[dof] = acc;
            }
            return state;
        }

        for dof in 0..DOFS {
            let p = &self.profiles[dof];
            let mut t_diff = time;

            if p.brake.duration > 0.0 {
                if t_diff < p.brake.duration {
                    let index = if t_diff < p.brake.t[0] { 0 } else { 1 };
                    if index > 0 {
                        t_diff -= p.brake.t[index - 1];
                    }
                    let (pos, vel, acc) = Profile::integrate(
                        t_diff,
                        p.brake.p[index],
                        p.brake.v[index],
                        p.brake.a[index],
                        p.brake.j[index],
                    );
                    state.position[dof] = pos;
                    state.velocity[dof] = vel;
                    state.acceleration[dof] = acc;
                    continue;
                }
                t_diff -= p.brake.duration;
            }

            // A DoF outside time synchronization may finish early.
            if t_diff >= p.t_sum[6] {
                let (pos, vel, acc) =
                    Profile::integrate(t_diff - p.t_sum[6], p.pf, p.vf, p.af, 0.0);
                state.position[dof] = pos;
                state.velocity[dof] = vel;
                state.acceleration[dof] = acc;
                continue;
            }

            let index = p.t_sum.iter().position(|&s| s > t_diff).unwrap_or(6);
            if index > 0 {
                t_diff -= p.t_sum[index - 1];
            }
            let (pos, vel, acc) =
                Profile::integrate(t_diff, p.p[index], p.v[index], p.a[index], p.j[index]);
            state.position[dof] = pos;
            state.velocity[dof] = vel;
            state.acceleration[dof] = acc;
        }
        state
    }

    /// Minimum and maximum position attained per DoF, with the times
    /// thereof.
    pub fn position_extrema(&self) -> [PositionExtrema; DOFS] {
        core::array::from_fn(|dof| self.profiles[dof].position_extrema())
    }

    /// Earliest time in `[0, duration]` at which a DoF passes through
    /// `position`, if it does.
    pub fn first_time_at_position(&self, dof: usize, position: f64) -> Option<f64> {
        if dof >= DOFS {
            return None;
        }
        let (time, _, _) = self.profiles[dof].first_state_at_position(position)?;
        if time <= self.duration + 1e-12 {
            Some(time)
        } else {
            None
        }
    }
}

/// Scaled per-DoF jerks for phase synchronization, or `None` when the
/// boundary states are not collinear with the displacements.
fn phase_scaled_jerks<const DOFS: usize>(
    input: &InputParameter<DOFS>,
    limiting_dof: usize,
    limiting_direction: Direction,
) -> Option<[f64; DOFS]> {
    const EPS_COLINEAR: f64 = 10.0 * f64::EPSILON;

    let mut pd = [0.0; DOFS];
    let mut scales: Option<(f64, f64, f64, f64)> = None;
    for dof in 0..DOFS {
        if input.sync_mode_at(dof) != SyncMode::Phase {
            continue;
        }
        pd[dof] = input.target_position[dof] - input.current_position[dof];
        if scales.is_none() && fabs(pd[dof]) > f64::EPSILON {
            scales = Some((
                input.current_velocity[dof] / pd[dof],
                input.current_acceleration[dof] / pd[dof],
                input.target_velocity[dof] / pd[dof],
                input.target_acceleration[dof] / pd[dof],
            ));
        }
    }
    // Zero displacement everywhere: nothing to scale against.
    let (v0_scale, a0_scale, vf_scale, af_scale) = scales?;

    let max_jerk_limiting = match limiting_direction {
        Direction::Up => input.max_jerk[limiting_dof],
        Direction::Down => -input.max_jerk[limiting_dof],
    };

    let mut new_max_jerk = [0.0; DOFS];
    for dof in 0..DOFS {
        if dof == limiting_dof || input.sync_mode_at(dof) != SyncMode::Phase {
            continue;
        }
        if fabs(input.current_velocity[dof] - v0_scale * pd[dof]) > EPS_COLINEAR
            || fabs(input.current_acceleration[dof] - a0_scale * pd[dof]) > EPS_COLINEAR
            || fabs(input.target_velocity[dof] - vf_scale * pd[dof]) > EPS_COLINEAR
            || fabs(input.target_acceleration[dof] - af_scale * pd[dof]) > EPS_COLINEAR
        {
            return None;
        }
        new_max_jerk[dof] = (pd[dof] / pd[limiting_dof]) * max_jerk_limiting;
    }
    Some(new_max_jerk)
}
