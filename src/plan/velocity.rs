//! Profile search for velocity control.
//!
//! Velocity-controlled axes only shape the acceleration: three segments at
//! most (ramp, optional hold at the bound, ramp) take the state from
//! `(v0, a0)` to `(vf, af)`. The position integrates along freely.

use libm::{fabs, sqrt};

use crate::plan::block::{Block, ValidProfiles};
use crate::profile::{Direction, LimitKind, Profile};
use crate::roots;

/// Time-optimal search for one velocity-controlled DoF.
#[derive(Debug)]
pub struct VelocityMinTime {
    v0: f64,
    a0: f64,
    vf: f64,
    af: f64,
    a_max: f64,
    a_min: f64,
    j_max: f64,
    valid: ValidProfiles,
}

impl VelocityMinTime {
    /// New search over the given boundary states and bounds.
    #[allow(clippy::too_many_arguments)]
    pub fn new(v0: f64, a0: f64, vf: f64, af: f64, a_max: f64, a_min: f64, j_max: f64) -> Self {
        Self { v0, a0, vf, af, a_max, a_min, j_max, valid: ValidProfiles::new() }
    }

    /// Run the enumeration and assemble the block.
    pub fn plan(&mut self, working: &Profile) -> Option<Block> {
        let mut profile = *working;
        profile.v[0] = self.v0;
        profile.a[0] = self.a0;

        let up = (self.a_max, self.j_max);
        let down = (self.a_min, -self.j_max);
        let (first, second) = if self.vf >= self.v0 { (up, down) } else { (down, up) };

        for (a_peak, j) in [first, second] {
            self.time_none(&mut profile, j);
            self.time_acc0(&mut profile, a_peak, j);
        }

        Block::calculate(&mut self.valid)
    }

    fn check_and_add(&mut self, profile: &mut Profile, limits: LimitKind, j: f64) {
        if profile.check_velocity(limits, self.vf, self.af, self.a_max, self.a_min) {
            let mut candidate = *profile;
            candidate.limits = limits;
            candidate.direction = if j > 0.0 { Direction::Up } else { Direction::Down };
            let _ = self.valid.push(candidate);
        }
    }

    // Acceleration spike without touching the bound.
    fn time_none(&mut self, profile: &mut Profile, j: f64) {
        let s = if j > 0.0 { 1.0 } else { -1.0 };
        let arg = j * (self.vf - self.v0) + (self.a0 * self.a0 + self.af * self.af) / 2.0;
        if arg < 0.0 {
            return;
        }
        let a_peak = s * sqrt(arg);

        profile.t = [
            (a_peak - self.a0) / j,
            0.0,
            (a_peak - self.af) / j,
            0.0,
            0.0,
            0.0,
            0.0,
        ];
        profile.set_uddu(j);
        self.check_and_add(profile, LimitKind::None, j);
    }

    // Hold at the acceleration bound.
    fn time_acc0(&mut self, profile: &mut Profile, a_peak: f64, j: f64) {
        if fabs(a_peak) < f64::EPSILON {
            return;
        }
        profile.t = [
            (a_peak - self.a0) / j,
            (self.vf - self.v0) / a_peak
                - (2.0 * a_peak * a_peak - self.a0 * self.a0 - self.af * self.af)
                    / (2.0 * j * a_peak),
            (a_peak - self.af) / j,
            0.0,
            0.0,
            0.0,
            0.0,
        ];
        profile.set_uddu(j);
        self.check_and_add(profile, LimitKind::Acc0, j);
    }
}

/// Duration-constrained search for one velocity-controlled DoF.
///
/// The acceleration peak is the unknown; with the hold time eliminated
/// through the duration constraint, the velocity equation is a plain
/// quadratic in the peak.
#[derive(Debug, Clone, Copy)]
pub struct VelocitySyncTime {
    tf: f64,
    v0: f64,
    a0: f64,
    vf: f64,
    af: f64,
    a_max: f64,
    a_min: f64,
    j_max: f64,
}

impl VelocitySyncTime {
    /// New search for a profile of duration exactly `tf` (brake excluded).
    #[allow(clippy::too_many_arguments)]
    pub fn new(tf: f64, v0: f64, a0: f64, vf: f64, af: f64, a_max: f64, a_min: f64, j_max: f64) -> Self {
        Self { tf, v0, a0, vf, af, a_max, a_min, j_max }
    }

    /// Find a valid profile meeting the duration; first hit wins.
    pub fn plan(&self, profile: &mut Profile) -> bool {
        profile.v[0] = self.v0;
        profile.a[0] = self.a0;

        let (first, second) = if self.vf >= self.v0 {
            (self.j_max, -self.j_max)
        } else {
            (-self.j_max, self.j_max)
        };

        for j in [first, second] {
            let b = self.a0 + self.af + j * self.tf;
            let c = (self.a0 * self.a0 + self.af * self.af) / 2.0 + j * (self.vf - self.v0);
            for a_peak in roots::solve_quadratic(-b, c) {
                profile.t = [
                    (a_peak - self.a0) / j,
                    self.tf - (2.0 * a_peak - self.a0 - self.af) / j,
                    (a_peak - self.af) / j,
                    0.0,
                    0.0,
                    0.0,
                    0.0,
                ];
                profile.set_uddu(j);
                if profile.check_velocity_with_timing(
                    LimitKind::None,
                    self.tf,
                    self.vf,
                    self.af,
                    self.a_max,
                    self.a_min,
                ) {
                    return true;
                }
            }
        }
        false
    }
}
