//! Seven-segment constant-jerk motion profiles.
//!
//! A profile is the per-axis building block of every trajectory: seven
//! segments of constant jerk whose signs follow one of two patterns, with
//! per-segment entry samples obtained by forward integration. Validity
//! checking (target reached, envelopes respected) lives here, as do the
//! queries that only need a single profile: position extrema and the first
//! time a position is crossed.

mod brake;

pub use brake::BrakeProfile;

use libm::fabs;

use crate::roots;

/// Absolute tolerance on the final position.
pub const EPS_POSITION: f64 = 1e-8;
/// Absolute tolerance on the final velocity.
pub const EPS_VELOCITY: f64 = 1e-8;
/// Absolute tolerance on the final acceleration.
pub const EPS_ACCELERATION: f64 = 1e-10;

const EPS_TIME: f64 = 1e-12;
const EPS_TOTAL_TIME: f64 = 1e-9;
const T_MAX: f64 = 1e12;

/// Sign of the leading jerk segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Leading jerk is positive.
    #[default]
    Up,
    /// Leading jerk is negative.
    Down,
}

/// Jerk sign pattern over the seven segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JerkSigns {
    /// `{+j, 0, -j, 0, -j, 0, +j}`
    #[default]
    Uddu,
    /// `{+j, 0, -j, 0, +j, 0, -j}`
    Udud,
}

/// Which kinematic bounds saturate during the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitKind {
    /// No bound saturates.
    #[default]
    None,
    /// Positive acceleration bound.
    Acc0,
    /// Negative acceleration bound.
    Acc1,
    /// Velocity bound.
    Vel,
    /// Both acceleration bounds.
    Acc0Acc1,
    /// Positive acceleration and velocity bounds.
    Acc0Vel,
    /// Negative acceleration and velocity bounds.
    Acc1Vel,
    /// All three bounds.
    Acc0Acc1Vel,
}

/// Minimum and maximum position over a profile, with the times thereof.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionExtrema {
    /// Smallest position attained.
    pub min: f64,
    /// Largest position attained.
    pub max: f64,
    /// Time at which the minimum is attained.
    pub t_min: f64,
    /// Time at which the maximum is attained.
    pub t_max: f64,
}

/// Seven-segment constant-jerk profile for one degree of freedom.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Profile {
    /// Segment durations.
    pub t: [f64; 7],
    /// Running sums of the segment durations.
    pub t_sum: [f64; 7],
    /// Segment jerks.
    pub j: [f64; 7],
    /// Position at segment entry; index 7 is the final position.
    pub p: [f64; 8],
    /// Velocity at segment entry; index 7 is the final velocity.
    pub v: [f64; 8],
    /// Acceleration at segment entry; index 7 is the final acceleration.
    pub a: [f64; 8],
    /// Target position.
    pub pf: f64,
    /// Target velocity.
    pub vf: f64,
    /// Target acceleration.
    pub af: f64,
    /// Saturated bounds.
    pub limits: LimitKind,
    /// Sign of the leading jerk.
    pub direction: Direction,
    /// Jerk sign pattern.
    pub jerk_signs: JerkSigns,
    /// Braking prefix prepended to the profile.
    pub brake: BrakeProfile,
}

impl Profile {
    /// Integrate a single constant-jerk segment over duration `t`.
    #[inline]
    pub fn integrate(t: f64, p0: f64, v0: f64, a0: f64, j: f64) -> (f64, f64, f64) {
        (
            p0 + t * (v0 + t * (a0 / 2.0 + t * j / 6.0)),
            v0 + t * (a0 + t * j / 2.0),
            a0 + t * j,
        )
    }

    /// Apply the UDDU jerk pattern with magnitude-signed jerk `j`.
    #[inline]
    pub fn set_uddu(&mut self, j: f64) {
        self.j = [j, 0.0, -j, 0.0, -j, 0.0, j];
        self.jerk_signs = JerkSigns::Uddu;
    }

    /// Apply the UDUD jerk pattern with magnitude-signed jerk `j`.
    #[inline]
    pub fn set_udud(&mut self, j: f64) {
        self.j = [j, 0.0, -j, 0.0, j, 0.0, -j];
        self.jerk_signs = JerkSigns::Udud;
    }

    /// Set the boundary states the profile starts from and must reach.
    pub fn set_boundary(&mut self, p0: f64, v0: f64, a0: f64, pf: f64, vf: f64, af: f64) {
        self.p[0] = p0;
        self.v[0] = v0;
        self.a[0] = a0;
        self.pf = pf;
        self.vf = vf;
        self.af = af;
    }

    /// Total profile duration excluding the brake prefix.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.t_sum[6]
    }

    /// Total motion time including the brake prefix.
    #[inline]
    pub fn total_duration(&self) -> f64 {
        self.t_sum[6] + self.brake.duration
    }

    /// Validate a position-control candidate against its saturation tag:
    /// integrates the segments and requires the target state to be reached
    /// with velocity and acceleration inside their bounds throughout.
    ///
    /// The tag pins the shape: every bound it names must actually be held
    /// for a strictly positive time, which prunes degenerate duplicates of
    /// the less-saturated families.
    #[allow(clippy::too_many_arguments)]
    pub fn check(
        &mut self,
        limits: LimitKind,
        pf: f64,
        vf: f64,
        af: f64,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
    ) -> bool {
        self.validate(limits, None, Some(pf), vf, af, Some((v_max, v_min)), a_max, a_min)
    }

    /// Validate a candidate that must additionally meet a fixed total
    /// duration `tf` with jerk magnitude `jf` bounded by `j_max`.
    #[allow(clippy::too_many_arguments)]
    pub fn check_with_timing(
        &mut self,
        limits: LimitKind,
        tf: f64,
        jf: f64,
        pf: f64,
        vf: f64,
        af: f64,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
        j_max: f64,
    ) -> bool {
        if fabs(jf) > fabs(j_max) * (1.0 + 1e-12) {
            return false;
        }
        self.validate(limits, Some(tf), Some(pf), vf, af, Some((v_max, v_min)), a_max, a_min)
    }

    /// Validate a velocity-control candidate: the position is free, only the
    /// final velocity and acceleration and the acceleration envelope matter.
    pub fn check_velocity(
        &mut self,
        limits: LimitKind,
        vf: f64,
        af: f64,
        a_max: f64,
        a_min: f64,
    ) -> bool {
        self.validate(limits, None, None, vf, af, None, a_max, a_min)
    }

    /// Velocity-control variant of [`check_with_timing`](Self::check_with_timing).
    #[allow(clippy::too_many_arguments)]
    pub fn check_velocity_with_timing(
        &mut self,
        limits: LimitKind,
        tf: f64,
        vf: f64,
        af: f64,
        a_max: f64,
        a_min: f64,
    ) -> bool {
        self.validate(limits, Some(tf), None, vf, af, None, a_max, a_min)
    }

    #[allow(clippy::too_many_arguments)]
    fn validate(
        &mut self,
        limits: LimitKind,
        tf: Option<f64>,
        pf: Option<f64>,
        vf: f64,
        af: f64,
        v_bounds: Option<(f64, f64)>,
        a_max: f64,
        a_min: f64,
    ) -> bool {
        for i in 0..7 {
            if self.t[i] < 0.0 {
                if self.t[i] < -EPS_TIME {
                    return false;
                }
                self.t[i] = 0.0;
            }
            if !self.t[i].is_finite() {
                return false;
            }
        }

        // A saturated bound must be held for a strictly positive time.
        let (need_t1, need_t3, need_t5) = match limits {
            LimitKind::None => (false, false, false),
            LimitKind::Acc0 => (true, false, false),
            LimitKind::Acc1 => (false, false, true),
            LimitKind::Vel => (false, true, false),
            LimitKind::Acc0Acc1 => (true, false, true),
            LimitKind::Acc0Vel => (true, true, false),
            LimitKind::Acc1Vel => (false, true, true),
            LimitKind::Acc0Acc1Vel => (true, true, true),
        };
        if (need_t1 && self.t[1] <= f64::EPSILON)
            || (need_t3 && self.t[3] <= f64::EPSILON)
            || (need_t5 && self.t[5] <= f64::EPSILON)
        {
            return false;
        }

        self.t_sum[0] = self.t[0];
        for i in 1..7 {
            self.t_sum[i] = self.t_sum[i - 1] + self.t[i];
        }
        if self.t_sum[6] > T_MAX {
            return false;
        }
        if let Some(tf) = tf {
            if fabs(self.t_sum[6] - tf) > EPS_TOTAL_TIME {
                return false;
            }
        }

        for i in 0..7 {
            let (p, v, a) = Self::integrate(self.t[i], self.p[i], self.v[i], self.a[i], self.j[i]);
            self.p[i + 1] = p;
            self.v[i + 1] = v;
            self.a[i + 1] = a;
        }

        self.vf = vf;
        self.af = af;
        self.pf = match pf {
            Some(pf) => pf,
            None => self.p[7],
        };

        if let Some(pf) = pf {
            if fabs(self.p[7] - pf) > EPS_POSITION {
                return false;
            }
        }
        if fabs(self.v[7] - vf) > EPS_VELOCITY || fabs(self.a[7] - af) > EPS_ACCELERATION {
            return false;
        }

        let a_tol = 1e-9 * (1.0 + fabs(a_max).max(fabs(a_min)));
        for i in 0..8 {
            if self.a[i] > a_max + a_tol || self.a[i] < a_min - a_tol {
                return false;
            }
        }

        if let Some((v_max, v_min)) = v_bounds {
            let v_tol = 1e-9 * (1.0 + fabs(v_max).max(fabs(v_min)));
            for i in 0..8 {
                if self.v[i] > v_max + v_tol || self.v[i] < v_min - v_tol {
                    return false;
                }
            }
            // Velocity extremum inside a segment where the acceleration
            // crosses zero.
            for i in 0..7 {
                if self.j[i] == 0.0 || self.t[i] <= 0.0 {
                    continue;
                }
                let tau = -self.a[i] / self.j[i];
                if tau > 0.0 && tau < self.t[i] {
                    let v_ext = self.v[i] + tau * (self.a[i] + tau * self.j[i] / 2.0);
                    if v_ext > v_max + v_tol || v_ext < v_min - v_tol {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Minimum and maximum position over the profile including its brake
    /// prefix, with the times at which they occur.
    pub fn position_extrema(&self) -> PositionExtrema {
        let mut ext = PositionExtrema {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            t_min: 0.0,
            t_max: 0.0,
        };

        let mut offset = 0.0;
        for i in 0..2 {
            if self.brake.t[i] > 0.0 {
                scan_segment(
                    self.brake.p[i],
                    self.brake.v[i],
                    self.brake.a[i],
                    self.brake.j[i],
                    self.brake.t[i],
                    offset,
                    &mut ext,
                );
                offset += self.brake.t[i];
            }
        }
        for i in 0..7 {
            scan_segment(
                self.p[i],
                self.v[i],
                self.a[i],
                self.j[i],
                self.t[i],
                offset,
                &mut ext,
            );
            offset += self.t[i];
        }

        // Degenerate zero-duration profile.
        if ext.min > ext.max {
            ext.min = self.p[0];
            ext.max = self.p[0];
        }
        ext
    }

    /// Earliest time (brake included) at which the profile passes through
    /// `position`, with the velocity and acceleration at that instant.
    pub fn first_state_at_position(&self, position: f64) -> Option<(f64, f64, f64)> {
        let mut offset = 0.0;
        for i in 0..2 {
            if self.brake.t[i] > 0.0 {
                if let Some(hit) = segment_time_at_position(
                    self.brake.p[i],
                    self.brake.v[i],
                    self.brake.a[i],
                    self.brake.j[i],
                    self.brake.t[i],
                    position,
                ) {
                    return Some(state_at(
                        self.brake.p[i],
                        self.brake.v[i],
                        self.brake.a[i],
                        self.brake.j[i],
                        hit,
                        offset,
                    ));
                }
                offset += self.brake.t[i];
            }
        }
        for i in 0..7 {
            if let Some(hit) = segment_time_at_position(
                self.p[i],
                self.v[i],
                self.a[i],
                self.j[i],
                self.t[i],
                position,
            ) {
                return Some(state_at(self.p[i], self.v[i], self.a[i], self.j[i], hit, offset));
            }
            offset += self.t[i];
        }

        if fabs(self.p[7] - position) < EPS_POSITION {
            return Some((offset, self.v[7], self.a[7]));
        }
        None
    }
}

/// Final position after running all seven segments from a start state.
pub(crate) fn end_position(t: &[f64; 7], j: &[f64; 7], p0: f64, v0: f64, a0: f64) -> f64 {
    let (mut p, mut v, mut a) = (p0, v0, a0);
    for i in 0..7 {
        let (pn, vn, an) = Profile::integrate(t[i], p, v, a, j[i]);
        p = pn;
        v = vn;
        a = an;
    }
    p
}

fn state_at(p: f64, v: f64, a: f64, j: f64, tau: f64, offset: f64) -> (f64, f64, f64) {
    let (_, vn, an) = Profile::integrate(tau, p, v, a, j);
    (offset + tau, vn, an)
}

fn scan_segment(p: f64, v: f64, a: f64, j: f64, t: f64, offset: f64, ext: &mut PositionExtrema) {
    if t < 0.0 {
        return;
    }
    let mut consider = |tau: f64| {
        let (pos, _, _) = Profile::integrate(tau, p, v, a, j);
        if pos < ext.min {
            ext.min = pos;
            ext.t_min = offset + tau;
        }
        if pos > ext.max {
            ext.max = pos;
            ext.t_max = offset + tau;
        }
    };

    consider(0.0);
    consider(t);
    // Interior extremum where the velocity crosses zero.
    if j != 0.0 {
        for tau in roots::solve_quadratic(2.0 * a / j, 2.0 * v / j) {
            if tau > 0.0 && tau < t {
                consider(tau);
            }
        }
    } else if a != 0.0 {
        let tau = -v / a;
        if tau > 0.0 && tau < t {
            consider(tau);
        }
    }
}

fn segment_time_at_position(p: f64, v: f64, a: f64, j: f64, t: f64, target: f64) -> Option<f64> {
    if t <= 0.0 {
        return None;
    }
    let mut best: Option<f64> = None;
    for tau in roots::solve_cub(j / 6.0, a / 2.0, v, p - target) {
        if tau >= -EPS_TIME && tau <= t + EPS_TIME {
            let tau = tau.clamp(0.0, t);
            best = Some(match best {
                Some(b) if b <= tau => b,
                _ => tau,
            });
        }
    }
    best
}
