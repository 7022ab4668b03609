//! Pre-trajectory braking for inputs that violate the kinematic limits.
//!
//! When the current state exceeds (or is trending to exceed) the velocity or
//! acceleration bounds, planning starts from a short prefix of at most two
//! constant-jerk segments that brings the state back inside the limits. The
//! segment times are shaved by a small epsilon so the post-brake state lands
//! strictly inside the bounds.

use libm::sqrt;

/// Shave applied to brake segment times.
const EPS: f64 = 2.2e-14;

/// Braking prefix of at most two constant-jerk segments.
///
/// The entry samples `p`, `v`, `a` are filled in when the prefix is
/// integrated against the actual starting state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrakeProfile {
    /// Total brake duration in seconds.
    pub duration: f64,
    /// Segment durations.
    pub t: [f64; 2],
    /// Segment jerks.
    pub j: [f64; 2],
    /// Position at segment entry.
    pub p: [f64; 2],
    /// Velocity at segment entry.
    pub v: [f64; 2],
    /// Acceleration at segment entry.
    pub a: [f64; 2],
}

impl BrakeProfile {
    /// Brake prefix for position control.
    ///
    /// Targets the nearest velocity bound while keeping the acceleration
    /// inside `[a_min, a_max]`.
    pub fn position_brake(
        v0: f64,
        a0: f64,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
        j_max: f64,
    ) -> Self {
        let mut brake = Self::default();

        if a0 > a_max {
            brake.accel_brake(v0, a0, v_max, v_min, a_max, a_min, j_max, false);
        } else if a0 < a_min {
            brake.accel_brake(-v0, -a0, -v_min, -v_max, -a_min, -a_max, j_max, true);
        } else if (v0 > v_max) || (a0 > 0.0 && v0 + a0 * a0 / (2.0 * j_max) > v_max) {
            brake.velocity_brake(v0, a0, v_max, v_min, a_min, j_max, false);
        } else if (v0 < v_min) || (a0 < 0.0 && v0 - a0 * a0 / (2.0 * j_max) < v_min) {
            brake.velocity_brake(-v0, -a0, -v_min, -v_max, -a_max, j_max, true);
        }

        brake.duration = brake.t[0] + brake.t[1];
        brake
    }

    /// Brake prefix for velocity control.
    ///
    /// Only the acceleration bounds matter: one segment ramps the
    /// acceleration back to the nearest bound.
    pub fn velocity_control_brake(a0: f64, a_max: f64, a_min: f64, j_max: f64) -> Self {
        let mut brake = Self::default();
        if a0 > a_max {
            brake.j[0] = -j_max;
            brake.t[0] = ((a0 - a_max) / j_max - EPS).max(0.0);
        } else if a0 < a_min {
            brake.j[0] = j_max;
            brake.t[0] = ((a_min - a0) / j_max - EPS).max(0.0);
        }
        brake.duration = brake.t[0] + brake.t[1];
        brake
    }

    // a0 above a_max: ramp the acceleration down to the bound. If even an
    // immediate ramp to zero acceleration overshoots v_max, full velocity
    // braking is required instead.
    #[allow(clippy::too_many_arguments)]
    fn accel_brake(
        &mut self,
        v0: f64,
        a0: f64,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
        j_max: f64,
        mirrored: bool,
    ) {
        let t_to_a_zero = a0 / j_max;
        let v_at_a_zero = v0 + t_to_a_zero * a0 / 2.0;

        if v_at_a_zero > v_max {
            self.velocity_brake(v0, a0, v_max, v_min, a_min, j_max, mirrored);
            return;
        }

        self.j[0] = -j_max;
        self.t[0] = ((a0 - a_max) / j_max - EPS).max(0.0);
        if mirrored {
            self.j[0] = -self.j[0];
        }
    }

    // Velocity above v_max (or heading there): jerk against the violation
    // until either the velocity bound or the acceleration floor is reached,
    // then hold the floor until just before the velocity bound.
    #[allow(clippy::too_many_arguments)]
    fn velocity_brake(
        &mut self,
        v0: f64,
        a0: f64,
        v_max: f64,
        v_min: f64,
        a_min: f64,
        j_max: f64,
        mirrored: bool,
    ) {
        self.j[0] = -j_max;

        let t_to_a_min = (a0 - a_min) / j_max;
        let t_to_v_max = a0 / j_max + sqrt((a0 * a0 + 2.0 * j_max * (v0 - v_max)).max(0.0)) / j_max;
        let t_to_v_min =
            a0 / j_max + sqrt((a0 * a0 / 2.0 + j_max * (v0 - v_min)).max(0.0)) / j_max;
        let t_min_to_v = t_to_v_max.min(t_to_v_min);

        if t_to_a_min < t_min_to_v {
            // Ride the acceleration floor with the second segment.
            let v_at_a_min = v0 + a0 * t_to_a_min - j_max * t_to_a_min * t_to_a_min / 2.0;
            let t_to_v_max_const = -(v_at_a_min - v_max) / a_min;
            let t_to_v_min_const = -(v_at_a_min - v_min) / a_min + a_min / (2.0 * j_max);

            self.t[0] = (t_to_a_min - EPS).max(0.0);
            self.t[1] = (t_to_v_max_const.min(t_to_v_min_const) - EPS).max(0.0);
        } else {
            self.t[0] = (t_min_to_v - EPS).max(0.0);
        }

        if mirrored {
            self.j[0] = -self.j[0];
            self.j[1] = -self.j[1];
        }
    }

    /// Integrate the prefix from the given state, recording segment entry
    /// samples. Returns the state that planning proper starts from.
    pub fn integrate_from(&mut self, p0: f64, v0: f64, a0: f64) -> (f64, f64, f64) {
        let (mut p, mut v, mut a) = (p0, v0, a0);
        for i in 0..2 {
            if self.t[i] <= 0.0 {
                break;
            }
            self.p[i] = p;
            self.v[i] = v;
            self.a[i] = a;
            let t = self.t[i];
            let j = self.j[i];
            let pn = p + t * (v + t * (a / 2.0 + t * j / 6.0));
            let vn = v + t * (a + t * j / 2.0);
            let an = a + t * j;
            p = pn;
            v = vn;
            a = an;
        }
        (p, v, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_brake_inside_limits() {
        let brake = BrakeProfile::position_brake(0.5, 0.2, 1.0, -1.0, 1.0, -1.0, 1.0);
        assert_eq!(brake.duration, 0.0);
    }

    #[test]
    fn test_velocity_brake_above_max() {
        // v0 = 2 with v_max = 1: ramp to the acceleration floor, then hold.
        let mut brake = BrakeProfile::position_brake(2.0, 0.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        assert!(brake.duration > 0.0);
        assert!((brake.t[0] - 1.0).abs() < 1e-9);
        assert!((brake.t[1] - 0.5).abs() < 1e-9);

        let (_, v, a) = brake.integrate_from(0.0, 2.0, 0.0);
        assert!(v <= 1.0 + 1e-9);
        assert!(a >= -1.0 - 1e-9 && a <= 1.0 + 1e-9);
    }

    #[test]
    fn test_velocity_brake_below_min() {
        let mut brake = BrakeProfile::position_brake(-2.0, 0.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        assert!(brake.duration > 0.0);
        assert!(brake.j[0] > 0.0);

        let (_, v, _) = brake.integrate_from(0.0, -2.0, 0.0);
        assert!(v >= -1.0 - 1e-9);
    }

    #[test]
    fn test_acceleration_brake() {
        let mut brake = BrakeProfile::position_brake(0.0, 2.0, 10.0, -10.0, 1.0, -1.0, 1.0);
        assert!(brake.t[0] > 0.0);

        let (_, _, a) = brake.integrate_from(0.0, 0.0, 2.0);
        assert!(a <= 1.0 + 1e-9);
    }

    #[test]
    fn test_trending_velocity_violation() {
        // v0 under the bound, but a0 is large enough that the velocity will
        // overshoot even if the acceleration ramps straight to zero.
        let brake = BrakeProfile::position_brake(0.9, 1.0, 1.0, -1.0, 2.0, -2.0, 1.0);
        assert!(brake.duration > 0.0);
    }

    #[test]
    fn test_velocity_control_brake() {
        let brake = BrakeProfile::velocity_control_brake(2.0, 1.0, -1.0, 1.0);
        assert!((brake.t[0] - 1.0).abs() < 1e-9);
        assert!(brake.j[0] < 0.0);

        let none = BrakeProfile::velocity_control_brake(0.5, 1.0, -1.0, 1.0);
        assert_eq!(none.duration, 0.0);
    }
}
