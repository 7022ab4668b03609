//! Duration-constrained profile search for position control.
//!
//! Same shape families as the time-optimal search, but the total duration is
//! a fixed constraint instead of the objective. For the velocity-plateau
//! families the plateau velocity is the single unknown: every segment time
//! follows from it and the plateau absorbs the duration slack, so the
//! position residual is a scalar function of the plateau velocity solved by
//! bracketed refinement. The plateau-free families trade jerk instead: the
//! jerk magnitude becomes the unknown and the inner segment times follow in
//! closed form.

use libm::{fabs, pow, sqrt};

use crate::profile::{end_position, LimitKind, Profile};
use crate::roots;

const VP_SCAN_STEPS: usize = 32;
const JERK_SCAN_STEPS: usize = 48;
const JERK_SCAN_DECADES: f64 = 6.0;

/// Duration-constrained search state for one position-controlled DoF.
#[derive(Debug, Clone, Copy)]
pub struct PositionSyncTime {
    tf: f64,
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
}

impl PositionSyncTime {
    /// New search for a profile of duration exactly `tf` (brake excluded).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tf: f64,
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
        Self { tf, p0, v0, a0, pf, vf, af, v_max, v_min, a_max, a_min, j_max }
    }

    /// Find a valid profile meeting the duration; first hit wins.
    pub fn plan(&self, profile: &mut Profile) -> bool {
        profile.p[0] = self.p0;
        profile.v[0] = self.v0;
        profile.a[0] = self.a0;

        let up = (self.v_max, self.a_max, self.a_min, self.j_max);
        let down = (self.v_min, self.a_min, self.a_max, -self.j_max);
        let (first, second) = if self.pf > self.p0 { (up, down) } else { (down, up) };

        for o in [first, second] {
            if self.time_vel_plateau(profile, true, true, o.0, o.1, o.2, o.3)
                || self.time_vel_plateau(profile, false, true, o.0, o.1, o.2, o.3)
                || self.time_vel_plateau(profile, true, false, o.0, o.1, o.2, o.3)
                || self.time_vel_plateau(profile, false, false, o.0, o.1, o.2, o.3)
            {
                return true;
            }
        }
        for o in [first, second] {
            if self.time_none_jerk(profile, o.3)
                || self.time_acc0_jerk(profile, o.1, o.3)
                || self.time_acc1_jerk(profile, o.2, o.3)
                || self.time_acc0_acc1_jerk(profile, o.1, o.2, o.3)
            {
                return true;
            }
        }
        false
    }

    fn accept(&self, profile: &mut Profile, limits: LimitKind, jf: f64, t: [f64; 7]) -> bool {
        profile.t = t;
        profile.check_with_timing(
            limits, self.tf, jf, self.pf, self.vf, self.af, self.v_max, self.v_min, self.a_max,
            self.a_min, self.j_max,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn time_vel_plateau(
        &self,
        profile: &mut Profile,
        sat_first: bool,
        sat_second: bool,
        v_bound: f64,
        a_up: f64,
        a_down: f64,
        j: f64,
    ) -> bool {
        if fabs(v_bound) < f64::EPSILON {
            return false;
        }
        let s = if j > 0.0 { 1.0 } else { -1.0 };
        let (p0, v0, a0) = (self.p0, self.v0, self.a0);
        let (pf, vf, af) = (self.pf, self.vf, self.af);
        let tf = self.tf;

        // The square-root arguments bound the reachable plateau velocities.
        let b0 = v0 - a0 * a0 / (2.0 * j);
        let b1 = vf - af * af / (2.0 * j);
        let (lo, hi) = if s > 0.0 { (b0.max(b1), v_bound) } else { (v_bound, b0.min(b1)) };
        if !(lo < hi) {
            return false;
        }

        let build = move |vp: f64| -> [f64; 7] {
            let a1 = if sat_first {
                a_up
            } else {
                s * sqrt((a0 * a0 / 2.0 + j * (vp - v0)).max(0.0))
            };
            let a2 = if sat_second {
                a_down
            } else {
                -s * sqrt((af * af / 2.0 + j * (vp - vf)).max(0.0))
            };
            let t0 = (a1 - a0) / j;
            let t1 = if sat_first {
                (vp - v0) / a1 - (2.0 * a1 * a1 - a0 * a0) / (2.0 * j * a1)
            } else {
                0.0
            };
            let t2 = a1 / j;
            let t4 = -a2 / j;
            let t5 = if sat_second {
                (vf - vp) / a2 - (af * af - 2.0 * a2 * a2) / (2.0 * j * a2)
            } else {
                0.0
            };
            let t6 = (af - a2) / j;
            let t3 = tf - (t0 + t1 + t2 + t4 + t5 + t6);
            [t0, t1, t2, t3, t4, t5, t6]
        };
        let jerks = [j, 0.0, -j, 0.0, -j, 0.0, j];
        let g = move |vp: f64| end_position(&build(vp), &jerks, p0, v0, a0) - pf;

        let limits = match (sat_first, sat_second) {
            (true, true) => LimitKind::Acc0Acc1Vel,
            (false, true) => LimitKind::Acc1Vel,
            (true, false) => LimitKind::Acc0Vel,
            (false, false) => LimitKind::Vel,
        };

        let mut prev_x = lo;
        let mut prev_g = g(lo);
        for k in 1..=VP_SCAN_STEPS {
            let x = lo + (hi - lo) * (k as f64) / (VP_SCAN_STEPS as f64);
            let gx = g(x);
            if prev_g == 0.0 {
                profile.set_uddu(j);
                if self.accept(profile, limits, j, build(prev_x)) {
                    return true;
                }
            } else if prev_g * gx < 0.0 {
                let vp = roots::solve_bracketed(g, prev_x, x, roots::TOLERANCE);
                profile.set_uddu(j);
                if self.accept(profile, limits, j, build(vp)) {
                    return true;
                }
            }
            prev_x = x;
            prev_g = gx;
        }
        if prev_g == 0.0 {
            profile.set_uddu(j);
            if self.accept(profile, limits, j, build(prev_x)) {
                return true;
            }
        }
        false
    }

    /// Scan the jerk magnitude over several decades below the limit,
    /// handing each sign-change bracket to the refinement.
    fn solve_on_jerk<B>(&self, profile: &mut Profile, limits: LimitKind, j_sign: f64, build: B) -> bool
    where
        B: Fn(f64) -> Option<[f64; 7]>,
    {
        let j_mag = fabs(self.j_max);
        let (p0, v0, a0) = (self.p0, self.v0, self.a0);
        let pf = self.pf;

        let position = |jf_mag: f64| -> Option<f64> {
            let t = build(jf_mag)?;
            let jf = j_sign * jf_mag;
            let jerks = [jf, 0.0, -jf, 0.0, -jf, 0.0, jf];
            Some(end_position(&t, &jerks, p0, v0, a0) - pf)
        };

        let mag_at = |k: usize| -> f64 {
            let frac = (k as f64) / (JERK_SCAN_STEPS as f64);
            j_mag * pow(10.0, -JERK_SCAN_DECADES * (1.0 - frac))
        };

        let mut prev: Option<(f64, f64)> = None;
        for k in 0..=JERK_SCAN_STEPS {
            let x = mag_at(k);
            let gx = match position(x) {
                Some(v) if v.is_finite() => v,
                _ => {
                    prev = None;
                    continue;
                }
            };
            if gx == 0.0 {
                if let Some(t) = build(x) {
                    profile.set_uddu(j_sign * x);
                    if self.accept(profile, limits, j_sign * x, t) {
                        return true;
                    }
                }
            }
            if let Some((px, pg)) = prev {
                if pg * gx < 0.0 {
                    let root = roots::solve_bracketed(
                        |m| position(m).unwrap_or(f64::MAX),
                        px,
                        x,
                        roots::TOLERANCE,
                    );
                    if let Some(t) = build(root) {
                        profile.set_uddu(j_sign * root);
                        if self.accept(profile, limits, j_sign * root, t) {
                            return true;
                        }
                    }
                }
            }
            prev = Some((x, gx));
        }
        false
    }

    // No saturated bound: reduced jerk, peak accelerations in closed form.
    fn time_none_jerk(&self, profile: &mut Profile, j: f64) -> bool {
        let s = if j > 0.0 { 1.0 } else { -1.0 };
        let (a0, af) = (self.a0, self.af);
        let (v0, vf) = (self.v0, self.vf);
        let tf = self.tf;

        let build = move |jf_mag: f64| -> Option<[f64; 7]> {
            let jf = s * jf_mag;
            let half = (jf * tf + a0 - af) / 2.0;
            if fabs(half) < f64::EPSILON {
                return None;
            }
            let c = (af * af - a0 * a0) / 2.0 + jf * (v0 - vf);
            let a_hat = (half * half - c) / (2.0 * half);
            let a_valley = a_hat - half;
            let t0 = (a_hat - a0) / jf;
            let t2 = a_hat / jf;
            let t4 = -a_valley / jf;
            let t6 = (af - a_valley) / jf;
            Some([t0, 0.0, t2, 0.0, t4, 0.0, t6])
        };
        self.solve_on_jerk(profile, LimitKind::None, s, build)
    }

    // Leading plateau saturated: the trailing spike depth follows from the
    // velocity equation, quadratic in the spike peak.
    fn time_acc0_jerk(&self, profile: &mut Profile, a_up: f64, j: f64) -> bool {
        let s = if j > 0.0 { 1.0 } else { -1.0 };
        let (a0, af) = (self.a0, self.af);
        let dv = self.vf - self.v0;
        let tf = self.tf;

        let build = move |jf_mag: f64| -> Option<[f64; 7]> {
            let jf = s * jf_mag;
            let c = a_up * (2.0 * a_up - a0 + af) - (2.0 * a_up * a_up - a0 * a0 + af * af) / 2.0
                - jf * (a_up * tf - dv);
            let disc = a_up * a_up - c;
            if disc < 0.0 {
                return None;
            }
            let a2 = a_up - s * sqrt(disc);
            let t0 = (a_up - a0) / jf;
            let t1 = tf - (2.0 * a_up - a0 + af - 2.0 * a2) / jf;
            let t2 = a_up / jf;
            let t4 = -a2 / jf;
            let t6 = (af - a2) / jf;
            Some([t0, t1, t2, 0.0, t4, 0.0, t6])
        };
        self.solve_on_jerk(profile, LimitKind::Acc0, s, build)
    }

    // Trailing plateau saturated: mirror of the above, quadratic in the
    // leading spike peak.
    fn time_acc1_jerk(&self, profile: &mut Profile, a_down: f64, j: f64) -> bool {
        let s = if j > 0.0 { 1.0 } else { -1.0 };
        let (a0, af) = (self.a0, self.af);
        let dv = self.vf - self.v0;
        let tf = self.tf;

        let build = move |jf_mag: f64| -> Option<[f64; 7]> {
            let jf = s * jf_mag;
            let c = a_down * a_down + a_down * (a0 - af) + (af * af - a0 * a0) / 2.0
                + jf * (a_down * tf - dv);
            let disc = a_down * a_down - c;
            if disc < 0.0 {
                return None;
            }
            let a1 = a_down + s * sqrt(disc);
            let t0 = (a1 - a0) / jf;
            let t2 = a1 / jf;
            let t4 = -a_down / jf;
            let t5 = tf - (2.0 * a1 - a0 - 2.0 * a_down + af) / jf;
            let t6 = (af - a_down) / jf;
            Some([t0, 0.0, t2, 0.0, t4, t5, t6])
        };
        self.solve_on_jerk(profile, LimitKind::Acc1, s, build)
    }

    // Both plateaus saturated: the two hold times solve a linear system per
    // jerk magnitude.
    fn time_acc0_acc1_jerk(&self, profile: &mut Profile, a_up: f64, a_down: f64, j: f64) -> bool {
        let s = if j > 0.0 { 1.0 } else { -1.0 };
        let (a0, af) = (self.a0, self.af);
        let dv = self.vf - self.v0;
        let tf = self.tf;

        let build = move |jf_mag: f64| -> Option<[f64; 7]> {
            let jf = s * jf_mag;
            let t0 = (a_up - a0) / jf;
            let t2 = a_up / jf;
            let t4 = -a_down / jf;
            let t6 = (af - a_down) / jf;
            let trem = tf - (t0 + t2 + t4 + t6);
            let dv_ramps =
                (2.0 * a_up * a_up - a0 * a0 - 2.0 * a_down * a_down + af * af) / (2.0 * jf);
            let r = dv - dv_ramps;
            let t1 = (r - a_down * trem) / (a_up - a_down);
            Some([t0, t1, t2, 0.0, t4, trem - t1, t6])
        };
        self.solve_on_jerk(profile, LimitKind::Acc0Acc1, s, build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stretch(tf: f64, pf: f64, v_max: f64, a_max: f64, j_max: f64) -> Profile {
        let step2 = PositionSyncTime::new(
            tf, 0.0, 0.0, 0.0, pf, 0.0, 0.0, v_max, -v_max, a_max, -a_max, j_max,
        );
        let mut profile = Profile::default();
        profile.set_boundary(0.0, 0.0, 0.0, pf, 0.0, 0.0);
        assert!(step2.plan(&mut profile), "no profile at tf = {}", tf);
        profile
    }

    #[test]
    fn test_stretched_rest_to_rest() {
        // Time-optimal is 4 * cbrt(1/2) ~ 3.1748; ask for 3.4.
        let profile = stretch(3.4, 1.0, 1.0, 1.0, 1.0);
        assert!((profile.t_sum[6] - 3.4).abs() < 1e-9);
        assert!((profile.p[7] - 1.0).abs() < 1e-8);
        assert!(profile.v[7].abs() < 1e-8);
    }

    #[test]
    fn test_stretched_quantized_duration() {
        let profile = stretch(3.2, 1.0, 1.0, 1.0, 1.0);
        assert!((profile.t_sum[6] - 3.2).abs() < 1e-9);
        assert!((profile.p[7] - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_long_stretch_lowers_plateau() {
        let profile = stretch(8.0, 1.0, 1.0, 1.0, 1.0);
        assert!((profile.t_sum[6] - 8.0).abs() < 1e-9);
        // Peak velocity must sit well below the bound.
        let v_peak = profile.v.iter().cloned().fold(f64::MIN, f64::max);
        assert!(v_peak < 0.5);
    }

    #[test]
    fn test_stretch_with_boundary_velocities() {
        let step2 = PositionSyncTime::new(
            4.0, 0.0, 0.3, 0.0, 2.0, 0.3, 0.0, 1.0, -1.0, 1.0, -1.0, 1.0,
        );
        let mut profile = Profile::default();
        profile.set_boundary(0.0, 0.3, 0.0, 2.0, 0.3, 0.0);
        assert!(step2.plan(&mut profile));
        assert!((profile.p[7] - 2.0).abs() < 1e-8);
        assert!((profile.v[7] - 0.3).abs() < 1e-8);
    }

    #[test]
    fn test_infeasibly_short_duration_fails() {
        let step2 = PositionSyncTime::new(
            1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, -1.0, 1.0, -1.0, 1.0,
        );
        let mut profile = Profile::default();
        profile.set_boundary(0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        assert!(!step2.plan(&mut profile));
    }
}
