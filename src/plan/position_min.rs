//! Time-optimal profile search for position control.
//!
//! Enumerates the extremal profile shapes as data: each entry of the family
//! tables is a solver that derives candidate segment times for one
//! saturation pattern, in one jerk orientation. Shapes that saturate more
//! bounds are tried first since they are faster whenever they are feasible;
//! the orientation matching the displacement sign is tried before its
//! mirror. All surviving candidates are handed to the block assembly.

use libm::{cbrt, fabs, sqrt};

use crate::plan::block::{Block, ValidProfiles};
use crate::profile::{end_position, Direction, LimitKind, Profile};
use crate::roots;

type SolverFn = fn(&mut PositionMinTime, &mut Profile, f64, f64, f64, f64);

/// Time-optimal search state for one position-controlled DoF.
///
/// Start states are the post-brake states.
#[derive(Debug)]
pub struct PositionMinTime {
    p0: f64,
    v0: f64,
    a0: f64,
    pf: f64,
    vf: f64,
    af: f64,
    v_max: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
    j_max: f64,
    valid: ValidProfiles,
}

impl PositionMinTime {
    /// New search over the given boundary states and bounds.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        p0: f64,
        v0: f64,
        a0: f64,
        pf: f64,
        vf: f64,
        af: f64,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
        j_max: f64,
    ) -> Self {
        Self {
            p0,
            v0,
            a0,
            pf,
            vf,
            af,
            v_max,
            v_min,
            a_max,
            a_min,
            j_max,
            valid: ValidProfiles::new(),
        }
    }

    /// Run the enumeration and assemble the block.
    ///
    /// `working` carries the brake prefix and entry state that every
    /// candidate inherits.
    pub fn plan(&mut self, working: &Profile) -> Option<Block> {
        let mut profile = *working;
        profile.p[0] = self.p0;
        profile.v[0] = self.v0;
        profile.a[0] = self.a0;

        // (velocity bound, accel-side bound, decel-side bound, signed jerk)
        let up = (self.v_max, self.a_max, self.a_min, self.j_max);
        let down = (self.v_min, self.a_min, self.a_max, -self.j_max);
        let (first, second) = if self.pf > self.p0 { (up, down) } else { (down, up) };

        let vel_families: [SolverFn; 4] = [
            Self::time_acc0_acc1_vel,
            Self::time_acc1_vel,
            Self::time_acc0_vel,
            Self::time_vel,
        ];
        let other_families: [SolverFn; 4] =
            [Self::time_none, Self::time_acc0, Self::time_acc1, Self::time_acc0_acc1];

        for solver in vel_families {
            solver(self, &mut profile, first.0, first.1, first.2, first.3);
            solver(self, &mut profile, second.0, second.1, second.2, second.3);
        }
        for solver in other_families {
            solver(self, &mut profile, first.0, first.1, first.2, first.3);
        }
        for solver in other_families {
            solver(self, &mut profile, second.0, second.1, second.2, second.3);
        }

        Block::calculate(&mut self.valid)
    }

    fn add_profile(&mut self, mut profile: Profile, limits: LimitKind, j: f64) {
        profile.limits = limits;
        profile.direction = if j > 0.0 { Direction::Up } else { Direction::Down };
        let _ = self.valid.push(profile);
    }

    fn check_and_add(&mut self, profile: &mut Profile, limits: LimitKind, j: f64) {
        if profile.check(
            limits, self.pf, self.vf, self.af, self.v_max, self.v_min, self.a_max, self.a_min,
        ) {
            self.add_profile(*profile, limits, j);
        }
    }

    // Velocity-plateau families. The plateau segment absorbs whatever
    // displacement the ramps do not cover, so its duration comes straight
    // from the position residual.
    fn plateau_time(&self, profile: &mut Profile, v_bound: f64) -> bool {
        profile.t[3] = 0.0;
        let d0 = end_position(&profile.t, &profile.j, self.p0, self.v0, self.a0);
        profile.t[3] = (self.pf - d0) / v_bound;
        profile.t[3].is_finite()
    }

    fn time_acc0_acc1_vel(
        &mut self,
        profile: &mut Profile,
        v_bound: f64,
        a_up: f64,
        a_down: f64,
        j: f64,
    ) {
        if fabs(v_bound) < f64::EPSILON {
            return;
        }
        let (a0, af) = (self.a0, self.af);

        profile.t[0] = (a_up - a0) / j;
        profile.t[1] =
            (v_bound - self.v0) / a_up - (2.0 * a_up * a_up - a0 * a0) / (2.0 * j * a_up);
        profile.t[2] = a_up / j;
        profile.t[4] = -a_down / j;
        profile.t[5] =
            (self.vf - v_bound) / a_down - (af * af - 2.0 * a_down * a_down) / (2.0 * j * a_down);
        profile.t[6] = (af - a_down) / j;

        profile.set_uddu(j);
        if !self.plateau_time(profile, v_bound) {
            return;
        }
        self.check_and_add(profile, LimitKind::Acc0Acc1Vel, j);
    }

    fn time_acc1_vel(
        &mut self,
        profile: &mut Profile,
        v_bound: f64,
        _a_up: f64,
        a_down: f64,
        j: f64,
    ) {
        if fabs(v_bound) < f64::EPSILON {
            return;
        }
        let (a0, af) = (self.a0, self.af);
        let s = if j > 0.0 { 1.0 } else { -1.0 };

        let arg = a0 * a0 / 2.0 + j * (v_bound - self.v0);
        if arg < 0.0 {
            return;
        }
        let a_peak = s * sqrt(arg);

        profile.t[0] = (a_peak - a0) / j;
        profile.t[1] = 0.0;
        profile.t[2] = a_peak / j;
        profile.t[4] = -a_down / j;
        profile.t[5] =
            (self.vf - v_bound) / a_down - (af * af - 2.0 * a_down * a_down) / (2.0 * j * a_down);
        profile.t[6] = (af - a_down) / j;

        profile.set_uddu(j);
        if !self.plateau_time(profile, v_bound) {
            return;
        }
        self.check_and_add(profile, LimitKind::Acc1Vel, j);
    }

    fn time_acc0_vel(
        &mut self,
        profile: &mut Profile,
        v_bound: f64,
        a_up: f64,
        _a_down: f64,
        j: f64,
    ) {
        if fabs(v_bound) < f64::EPSILON {
            return;
        }
        let (a0, af) = (self.a0, self.af);
        let s = if j > 0.0 { 1.0 } else { -1.0 };

        let arg = af * af / 2.0 + j * (v_bound - self.vf);
        if arg < 0.0 {
            return;
        }
        let a_peak = -s * sqrt(arg);

        profile.t[0] = (a_up - a0) / j;
        profile.t[1] =
            (v_bound - self.v0) / a_up - (2.0 * a_up * a_up - a0 * a0) / (2.0 * j * a_up);
        profile.t[2] = a_up / j;
        profile.t[4] = -a_peak / j;
        profile.t[5] = 0.0;
        profile.t[6] = (af - a_peak) / j;

        profile.set_uddu(j);
        if !self.plateau_time(profile, v_bound) {
            return;
        }
        self.check_and_add(profile, LimitKind::Acc0Vel, j);
    }

    fn time_vel(&mut self, profile: &mut Profile, v_bound: f64, _a_up: f64, _a_down: f64, j: f64) {
        if fabs(v_bound) < f64::EPSILON {
            return;
        }
        let (a0, af) = (self.a0, self.af);
        let s = if j > 0.0 { 1.0 } else { -1.0 };

        let arg0 = a0 * a0 / 2.0 + j * (v_bound - self.v0);
        let arg1 = af * af / 2.0 + j * (v_bound - self.vf);
        if arg0 < 0.0 || arg1 < 0.0 {
            return;
        }
        let a_peak0 = s * sqrt(arg0);
        let a_peak1 = -s * sqrt(arg1);

        profile.t[0] = (a_peak0 - a0) / j;
        profile.t[1] = 0.0;
        profile.t[2] = a_peak0 / j;
        profile.t[4] = -a_peak1 / j;
        profile.t[5] = 0.0;
        profile.t[6] = (af - a_peak1) / j;

        profile.set_uddu(j);
        if !self.plateau_time(profile, v_bound) {
            return;
        }
        self.check_and_add(profile, LimitKind::Vel, j);
    }

    // Both acceleration plateaus saturated, no velocity plateau. The two
    // hold times are tied linearly by the velocity equation; the position
    // equation is exactly quadratic in the remaining freedom, recovered by
    // interpolation through three samples.
    fn time_acc0_acc1(
        &mut self,
        profile: &mut Profile,
        _v_bound: f64,
        a_up: f64,
        a_down: f64,
        j: f64,
    ) {
        let (a0, af) = (self.a0, self.af);

        // UDDU
        {
            let t0 = (a_up - a0) / j;
            let t2 = a_up / j;
            let t4 = -a_down / j;
            let t6 = (af - a_down) / j;
            let dv_ramps =
                (2.0 * a_up * a_up - a0 * a0 - 2.0 * a_down * a_down + af * af) / (2.0 * j);
            let r = (self.vf - self.v0) - dv_ramps;

            let times = |t1: f64| -> [f64; 7] {
                let t5 = (r - a_up * t1) / a_down;
                [t0, t1, t2, 0.0, t4, t5, t6]
            };
            profile.set_uddu(j);
            let jerks = profile.j;
            let g = |t1: f64| {
                end_position(&times(t1), &jerks, self.p0, self.v0, self.a0) - self.pf
            };
            for t1 in quadratic_fit_roots(g(0.0), g(1.0), g(2.0)) {
                profile.t = times(t1);
                profile.set_uddu(j);
                self.check_and_add(profile, LimitKind::Acc0Acc1, j);
            }
        }

        // UDUD: the acceleration returns to the same plateau after the
        // intermediate dip, only reachable with a nonzero final acceleration.
        if fabs(af) > f64::EPSILON {
            let t0 = (a_up - a0) / j;
            let t2 = a_up / j;
            let t4 = a_up / j;
            let t6 = (a_up - af) / j;
            let dv_ramps = (4.0 * a_up * a_up - a0 * a0 - af * af) / (2.0 * j);
            let hold_sum = ((self.vf - self.v0) - dv_ramps) / a_up;

            let times = |t1: f64| -> [f64; 7] { [t0, t1, t2, 0.0, t4, hold_sum - t1, t6] };
            profile.set_udud(j);
            let jerks = profile.j;
            let g = |t1: f64| {
                end_position(&times(t1), &jerks, self.p0, self.v0, self.a0) - self.pf
            };
            for t1 in quadratic_fit_roots(g(0.0), g(1.0), g(2.0)) {
                profile.t = times(t1);
                profile.set_udud(j);
                self.check_and_add(profile, LimitKind::Acc0Acc1, j);
            }
        }
    }

    // First acceleration plateau saturated only; the depth of the final
    // deceleration spike solves a monic quartic.
    fn time_acc0(&mut self, profile: &mut Profile, _v_bound: f64, a_up: f64, _a_down: f64, j: f64) {
        let (p0, v0, a0) = (self.p0, self.v0, self.a0);
        let (pf, vf, af) = (self.pf, self.vf, self.af);
        let am = a_up;
        let j2 = j * j;
        let j4 = j2 * j2;

        let c1 = 2.0 * am / j;
        let c2 = (-af * af + am * am + 2.0 * j * vf) / j2;
        let c3 = -2.0 * am * (af * af - 2.0 * j * vf) / (j2 * j);
        let c4 = (-3.0 * p4(a0) + 3.0 * p4(af) + 8.0 * p3(a0) * am - 8.0 * p3(af) * am
            - 24.0 * a0 * am * j * v0
            - 6.0 * a0 * a0 * (am * am - 2.0 * j * v0)
            + 24.0 * af * am * j * vf
            - 6.0 * af * af * (am * am + 2.0 * j * vf)
            + 12.0
                * j
                * (2.0 * am * j * (p0 - pf) + am * am * (v0 + vf) + j * (-v0 * v0 + vf * vf)))
            / (12.0 * j4);

        for t in roots::solve_quart_monic(c1, c2, c3, c4) {
            if t < 0.0 {
                continue;
            }
            profile.t[0] = (-a0 + am) / j;
            profile.t[1] =
                (a0 * a0 / 2.0 - af * af / 2.0 - am * am + j2 * t * t - j * (v0 - vf)) / (am * j);
            profile.t[2] = profile.t[0] + a0 / j;
            profile.t[3] = 0.0;
            profile.t[4] = t;
            profile.t[5] = 0.0;
            profile.t[6] = profile.t[4] + af / j;

            profile.t[2] = (profile.t[2] + profile.t[4]) / 2.0;
            profile.t[4] = profile.t[2];

            profile.set_uddu(j);
            self.check_and_add(profile, LimitKind::Acc0, j);
        }

        // UDUD
        if fabs(af) > f64::EPSILON {
            let c1 = -2.0 * am / j;
            let c2 = -(af * af + am * am + 2.0 * j * vf) / j2;
            let c3 = 2.0 * am * (af * af + 2.0 * j * vf) / (j2 * j);
            let c4 = (-3.0 * p4(a0) + 3.0 * p4(af) + 8.0 * p3(a0) * am - 8.0 * p3(af) * am
                - 24.0 * a0 * am * j * v0
                - 6.0 * a0 * a0 * (am * am - 2.0 * j * v0)
                - 24.0 * af * am * j * vf
                + 6.0 * af * af * (am * am + 2.0 * j * vf)
                + 12.0
                    * j
                    * (2.0 * am * j * (p0 - pf) + am * am * (v0 + vf) + j * (-v0 * v0 + vf * vf)))
                / (12.0 * j4);

            for t in roots::solve_quart_monic(c1, c2, c3, c4) {
                if t < 0.0 {
                    continue;
                }
                profile.t[0] = (-a0 + am) / j;
                profile.t[1] =
                    (a0 * a0 + af * af - 2.0 * (am * am + j * (j * t * t + v0 - vf)))
                        / (2.0 * am * j);
                profile.t[2] = profile.t[0] + a0 / j;
                profile.t[3] = 0.0;
                profile.t[4] = t;
                profile.t[5] = 0.0;
                profile.t[6] = profile.t[4] - af / j;

                profile.set_udud(j);
                self.check_and_add(profile, LimitKind::Acc0, j);
            }
        }
    }

    // Second acceleration plateau saturated only; the height of the leading
    // acceleration spike solves a monic quartic.
    fn time_acc1(&mut self, profile: &mut Profile, _v_bound: f64, a_up: f64, a_down: f64, j: f64) {
        let (p0, v0, a0) = (self.p0, self.v0, self.a0);
        let (pf, vf, af) = (self.pf, self.vf, self.af);
        let am = -a_down;
        let j2 = j * j;
        let j4 = j2 * j2;

        let c1 = 2.0 * (2.0 * a0 + am) / j;
        let c2 = (5.0 * a0 * a0 + 6.0 * a0 * am + am * am + 2.0 * j * v0) / j2;
        let c3 = 2.0 * (a0 + am) * (a0 * a0 + a0 * am + 2.0 * j * v0) / (j2 * j);
        let c4 = (3.0 * p4(a0) - 3.0 * p4(af) + 8.0 * p3(a0) * am - 8.0 * p3(af) * am
            + 24.0 * a0 * am * j * v0
            + 6.0 * a0 * a0 * (am * am + 2.0 * j * v0)
            + 24.0 * af * am * j * vf
            - 6.0 * af * af * (am * am - 2.0 * j * vf)
            + 12.0 * j * (2.0 * am * j * (p0 - pf) + am * am * (v0 + vf) + j * (v0 * v0 - vf * vf)))
            / (12.0 * j4);

        for t in roots::solve_quart_monic(c1, c2, c3, c4) {
            if t < 0.0 {
                continue;
            }
            profile.t[0] = t;
            profile.t[1] = 0.0;
            profile.t[2] = t + a0 / j;
            profile.t[3] = 0.0;
            profile.t[4] = am / j;
            profile.t[5] = (a0 * a0 / 2.0 + af * af / 2.0 - am * am
                + 2.0 * a0 * j * t
                + j2 * t * t
                + j * (v0 - vf))
                / (am * j);
            profile.t[6] = profile.t[4] + af / j;

            profile.t[2] = (profile.t[2] + profile.t[4]) / 2.0;
            profile.t[4] = profile.t[2];

            profile.set_uddu(j);
            self.check_and_add(profile, LimitKind::Acc1, j);
        }

        // UDUD: the plateau lies on the leading side here.
        if fabs(af) > f64::EPSILON {
            let am = a_up;
            let c1 = (4.0 * a0 - 2.0 * am) / j;
            let c2 = (5.0 * a0 * a0 - 6.0 * a0 * am - am * am + 2.0 * j * v0) / j2;
            let c3 = 2.0
                * (p3(a0) - 2.0 * a0 * a0 * am - a0 * am * am + 2.0 * a0 * j * v0
                    - 2.0 * am * j * v0)
                / (j2 * j);
            let c4 = -(-3.0 * p4(a0) + 3.0 * p4(af) + 8.0 * p3(a0) * am - 8.0 * p3(af) * am
                + 24.0 * a0 * am * j * v0
                + 6.0 * a0 * a0 * (am * am - 2.0 * j * v0)
                - 24.0 * af * am * j * vf
                + 6.0 * af * af * (am * am + 2.0 * j * vf)
                + 12.0
                    * j
                    * (2.0 * am * j * (p0 - pf) + am * am * (v0 + vf) + j * (-v0 * v0 + vf * vf)))
                / (12.0 * j4);

            for t in roots::solve_quart_monic(c1, c2, c3, c4) {
                if t < 0.0 {
                    continue;
                }
                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t + a0 / j;
                profile.t[3] = 0.0;
                profile.t[4] = am / j;
                profile.t[5] = -(a0 * a0 - af * af
                    + 4.0 * a0 * j * t
                    + 2.0 * (am * am + j * (j * t * t + v0 - vf)))
                    / (2.0 * am * j);
                profile.t[6] = profile.t[4] - af / j;

                profile.set_udud(j);
                self.check_and_add(profile, LimitKind::Acc1, j);
            }
        }
    }

    // No bound saturates.
    fn time_none(&mut self, profile: &mut Profile, _v_bound: f64, _a_up: f64, _a_down: f64, j: f64) {
        let (p0, v0, a0) = (self.p0, self.v0, self.a0);
        let (pf, vf, af) = (self.pf, self.vf, self.af);

        if fabs(v0) < f64::EPSILON
            && fabs(a0) < f64::EPSILON
            && fabs(vf) < f64::EPSILON
            && fabs(af) < f64::EPSILON
        {
            // Rest to rest: four equal ramps.
            let t0 = cbrt((pf - p0) / (2.0 * j));
            profile.t = [t0, 0.0, t0, 0.0, t0, 0.0, t0];
            profile.set_uddu(j);
            self.check_and_add(profile, LimitKind::None, j);
            return;
        }

        let j2 = j * j;
        let h0 = p3(af) + 3.0 * j2 * (pf - p0) - 3.0 * af * j * vf;

        // Leading coefficient of the unnormalized quartic; when it vanishes
        // the equation degrades to a cubic.
        let q0 = -a0 * a0 + af * af + 2.0 * j * (v0 - vf);
        let q1 = -4.0 * (2.0 * p3(a0) + h0 - 3.0 * a0 * (af * af + j * (v0 - 2.0 * vf))) / (3.0 * j);
        let q2 = (-3.0 * p4(a0) + sq(af * af + 2.0 * j * (v0 - vf)) - 8.0 * a0 * h0
            + 2.0 * a0 * a0 * (5.0 * af * af - 2.0 * j * (v0 + 5.0 * vf)))
            / (2.0 * j2);
        let q3 = -(p5(a0)
            + 8.0 * (a0 * a0 + j * v0) * h0
            + p3(a0) * (-6.0 * af * af + 4.0 * j * (v0 + 3.0 * vf))
            - 3.0 * a0
                * (p4(af) + 4.0 * af * af * j * (v0 - vf)
                    - 4.0 * j2 * (v0 * v0 + 2.0 * v0 * vf - vf * vf)))
            / (3.0 * j2 * j);
        let q4 = -(p6(a0) + p6(af) + 48.0 * p3(af) * j2 * (p0 - pf)
            - 144.0 * af * j2 * j * (p0 - pf) * vf
            - 6.0 * p4(af) * j * (3.0 * v0 + vf)
            + 16.0 * p3(a0) * h0
            + 48.0 * a0 * j * v0 * h0
            - 36.0 * af * af * j2 * (v0 * v0 - 2.0 * v0 * vf - vf * vf)
            - 72.0 * j2 * j * (j * sq(p0 - pf) - (v0 - vf) * sq(v0 + vf))
            + p4(a0) * (-9.0 * af * af + 6.0 * j * (v0 + 3.0 * vf))
            - 9.0 * a0 * a0
                * (p4(af) + 4.0 * af * af * j * (v0 - vf)
                    - 4.0 * j2 * (v0 * v0 + 2.0 * v0 * vf - vf * vf)))
            / (36.0 * j2 * j2);

        let scale = 1.0 + fabs(q1) + fabs(q2) + fabs(q3) + fabs(q4);
        let mut candidates: heapless::Vec<f64, 8> = heapless::Vec::new();
        if fabs(q0) > 1e-12 * scale {
            let poly = [1.0, q1 / q0, q2 / q0, q3 / q0, q4 / q0];
            for t in roots::solve_quart_monic(poly[1], poly[2], poly[3], poly[4]) {
                if t < 0.0 {
                    continue;
                }
                let mut t = t;
                if fabs(roots::poly_eval(&poly, t)) > 1e-9 {
                    t = roots::shrink_interval(&poly, t - 1e-5, t + 1e-5, roots::TOLERANCE);
                }
                let _ = candidates.push(t);
            }
        } else {
            for t in roots::solve_cub(q1, q2, q3, q4) {
                if t >= 0.0 {
                    let _ = candidates.push(t);
                }
            }
        }

        for &t in candidates.iter() {
            profile.t[0] = t;
            profile.t[1] = 0.0;
            profile.t[2] = t + a0 / j;
            profile.t[3] = 0.0;
            let arg = a0 * a0 / 2.0 + af * af / 2.0
                + 2.0 * a0 * j * t
                + j * (j * t * t + v0 - vf);
            if arg < 0.0 {
                continue;
            }
            profile.t[4] = sqrt(arg) / fabs(j);
            profile.t[5] = 0.0;
            profile.t[6] = profile.t[4] + af / j;

            profile.t[2] = (profile.t[2] + profile.t[4]) / 2.0;
            profile.t[4] = profile.t[2];

            profile.set_uddu(j);
            self.check_and_add(profile, LimitKind::None, j);
        }

        if fabs(af) > f64::EPSILON {
            self.time_none_udud(profile, j);
        }
    }

    // UDUD shape without saturated bounds: a monic sextic whose positive
    // roots are isolated through sign changes of the derivative, then
    // polished inside each bracket.
    fn time_none_udud(&mut self, profile: &mut Profile, j: f64) {
        let (p0, v0, a0) = (self.p0, self.v0, self.a0);
        let (pf, vf, af) = (self.pf, self.vf, self.af);
        let j2 = j * j;
        let h1 = p3(af) + 3.0 * j2 * (pf - p0) + 3.0 * af * j * vf;

        let polynom = [
            1.0,
            6.0 * a0 / j,
            (53.0 * a0 * a0 + af * af + 2.0 * j * (7.0 * v0 + vf)) / (4.0 * j2),
            (40.0 * p3(a0) - p3(af) + 3.0 * j2 * (p0 - pf) - 3.0 * af * j * vf
                + 3.0 * a0 * (af * af + 13.0 * j * v0 + 2.0 * j * vf))
                / (3.0 * j2 * j),
            (51.0 * p4(a0) - p4(af)
                + 4.0 * af * af * j * (v0 - vf)
                + 2.0 * a0 * a0 * (5.0 * af * af + 58.0 * j * v0 + 10.0 * j * vf)
                - 8.0 * a0 * h1
                + 4.0 * j2 * (7.0 * v0 * v0 + 2.0 * v0 * vf - vf * vf))
                / (8.0 * j2 * j2),
            (17.0 * p5(a0) + 2.0 * p3(a0) * (3.0 * af * af + 34.0 * j * v0 + 6.0 * j * vf)
                - 8.0 * (a0 * a0 + j * v0) * h1
                - 3.0 * a0
                    * (p4(af)
                        + 4.0 * af * af * j * (-v0 + vf)
                        + 4.0 * j2 * (-5.0 * v0 * v0 - 2.0 * v0 * vf + vf * vf)))
                / (12.0 * p5(j)),
            -(-17.0 * p6(a0) + p6(af)
                + 48.0 * p3(af) * j2 * (p0 - pf)
                + 144.0 * af * j2 * j * (p0 - pf) * vf
                + 6.0 * p4(af) * j * (3.0 * v0 + vf)
                - 3.0 * p4(a0) * (3.0 * af * af + 34.0 * j * v0 + 6.0 * j * vf)
                + 16.0 * p3(a0) * h1
                + 48.0 * a0 * j * v0 * h1
                - 36.0 * af * af * j2 * (v0 * v0 - 2.0 * v0 * vf - vf * vf)
                - 72.0 * j2 * j * (j * sq(p0 - pf) + (v0 - vf) * sq(v0 + vf))
                + 9.0 * a0 * a0
                    * (p4(af)
                        + 4.0 * af * af * j * (-v0 + vf)
                        + 4.0 * j2 * (-5.0 * v0 * v0 - 2.0 * v0 * vf + vf * vf)))
                / (144.0 * p6(j)),
        ];

        let deriv = [
            1.0,
            5.0 / 6.0 * polynom[1],
            4.0 / 6.0 * polynom[2],
            3.0 / 6.0 * polynom[3],
            2.0 / 6.0 * polynom[4],
            1.0 / 6.0 * polynom[5],
        ];

        let mut dd_extrema = roots::solve_quart_monic(
            4.0 / 5.0 * deriv[1],
            3.0 / 5.0 * deriv[2],
            2.0 / 5.0 * deriv[3],
            1.0 / 5.0 * deriv[4],
        );
        dd_extrema
            .as_mut_slice()
            .sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());

        let tz_min = 0.0;
        let tz_max = 1000.0;

        let mut dd_intervals: heapless::Vec<(f64, f64), 8> = heapless::Vec::new();
        let mut dd_current = tz_min;
        for &tz in dd_extrema.iter() {
            if tz <= 0.0 || tz >= tz_max {
                continue;
            }
            if roots::poly_eval(&deriv, dd_current) * roots::poly_eval(&deriv, tz) < 0.0 {
                let _ = dd_intervals.push((dd_current, tz));
            }
            dd_current = tz;
        }
        if roots::poly_eval(&deriv, dd_current) * roots::poly_eval(&deriv, tz_max) < 0.0 {
            let _ = dd_intervals.push((dd_current, tz_max));
        }

        let mut tz_intervals: heapless::Vec<(f64, f64), 8> = heapless::Vec::new();
        let mut tz_current = tz_min;
        for &(lower, upper) in dd_intervals.iter() {
            let tz = roots::shrink_interval(&deriv, lower, upper, roots::TOLERANCE);
            if tz <= 0.0 {
                continue;
            }
            if roots::poly_eval(&polynom, tz_current) * roots::poly_eval(&polynom, tz) < 0.0 {
                let _ = tz_intervals.push((tz_current, tz));
            }
            tz_current = tz;
        }
        if roots::poly_eval(&polynom, tz_current) * roots::poly_eval(&polynom, tz_max) < 0.0 {
            let _ = tz_intervals.push((tz_current, tz_max));
        }

        for &(lower, upper) in tz_intervals.iter() {
            let t = roots::shrink_interval(&polynom, lower, upper, roots::TOLERANCE);
            if t < 0.0 {
                continue;
            }

            profile.t[0] = t;
            profile.t[1] = 0.0;
            profile.t[2] = t + a0 / j;
            profile.t[3] = 0.0;
            let arg =
                -a0 * a0 + af * af - 4.0 * a0 * j * t - 2.0 * j * (j * t * t + v0 - vf);
            if arg < 0.0 {
                continue;
            }
            profile.t[4] = sqrt(arg / 2.0) / fabs(j);
            profile.t[5] = 0.0;
            profile.t[6] = profile.t[4] - af / j;

            profile.set_udud(j);
            self.check_and_add(profile, LimitKind::None, j);
        }
    }
}

/// Roots of the quadratic through the samples `g(0)`, `g(1)`, `g(2)`.
///
/// Exact when the sampled function is a quadratic polynomial, which the
/// position residual of a fixed-ramp profile is.
fn quadratic_fit_roots(g0: f64, g1: f64, g2: f64) -> heapless::Vec<f64, 2> {
    let c2 = (g2 - 2.0 * g1 + g0) / 2.0;
    let c1 = g1 - g0 - c2;
    let c0 = g0;

    let mut out = heapless::Vec::new();
    let scale = 1.0 + fabs(c1) + fabs(c0);
    if fabs(c2) < f64::EPSILON * scale {
        if fabs(c1) > 0.0 {
            let _ = out.push(-c0 / c1);
        }
        return out;
    }
    for x in roots::solve_quadratic(c1 / c2, c0 / c2) {
        let _ = out.push(x);
    }
    out
}

#[inline]
fn sq(x: f64) -> f64 {
    x * x
}
#[inline]
fn p3(x: f64) -> f64 {
    x * x * x
}
#[inline]
fn p4(x: f64) -> f64 {
    let x2 = x * x;
    x2 * x2
}
#[inline]
fn p5(x: f64) -> f64 {
    p4(x) * x
}
#[inline]
fn p6(x: f64) -> f64 {
    p3(x) * p3(x)
}
