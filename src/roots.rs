//! Polynomial root finding for profile timing equations.
//!
//! The closed-form solvers handle the monic cubics and quartics that the
//! profile families reduce to. Roots that come out of the closed forms with
//! too much floating-point drift are polished with a safeguarded
//! Newton/bisection refinement over a bracketing interval.

use heapless::Vec;
use libm::{acos, cbrt, cos, fabs, sqrt};

/// Termination tolerance for bracketed refinement.
pub const TOLERANCE: f64 = 1e-14;

const PI: f64 = core::f64::consts::PI;

/// Real roots of the quadratic `x^2 + p*x + q = 0`.
pub fn solve_quadratic(p: f64, q: f64) -> Vec<f64, 2> {
    let mut roots = Vec::new();
    let disc = p * p - 4.0 * q;
    if disc < 0.0 {
        return roots;
    }
    let sq = sqrt(disc);
    // Avoid cancellation by computing the large-magnitude root first.
    let x0 = if p >= 0.0 { (-p - sq) / 2.0 } else { (-p + sq) / 2.0 };
    let _ = roots.push(x0);
    if sq > 0.0 {
        let x1 = if x0 != 0.0 { q / x0 } else { -p };
        let _ = roots.push(x1);
    }
    roots
}

/// Real roots of the general cubic `a*x^3 + b*x^2 + c*x + d = 0`.
///
/// Degrades gracefully to the quadratic and linear cases when the leading
/// coefficients vanish.
pub fn solve_cub(a: f64, b: f64, c: f64, d: f64) -> Vec<f64, 3> {
    let mut roots = Vec::new();
    let scale = 1.0 + fabs(b) + fabs(c) + fabs(d);
    if fabs(a) < f64::EPSILON * scale {
        if fabs(b) < f64::EPSILON * (1.0 + fabs(c) + fabs(d)) {
            if fabs(c) > 0.0 {
                let _ = roots.push(-d / c);
            }
            return roots;
        }
        for x in solve_quadratic(c / b, d / b) {
            let _ = roots.push(x);
        }
        return roots;
    }
    let (r3, n) = solve_resolvent(b / a, c / a, d / a);
    for &x in r3.iter().take(n) {
        let _ = roots.push(x);
    }
    roots
}

/// Real roots of the monic cubic `x^3 + a*x^2 + b*x + c = 0`.
///
/// Returns the root array and the number of real roots (1 or 3), using the
/// trigonometric form when all three roots are real.
fn solve_resolvent(a: f64, b: f64, c: f64) -> ([f64; 3], usize) {
    let a2 = a * a;
    let q = (a2 - 3.0 * b) / 9.0;
    let r = (a * (2.0 * a2 - 9.0 * b) + 27.0 * c) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;

    if r2 < q3 {
        let mut t = r / sqrt(q3);
        if t < -1.0 {
            t = -1.0;
        }
        if t > 1.0 {
            t = 1.0;
        }
        let theta = acos(t);
        let qs = -2.0 * sqrt(q);
        let off = a / 3.0;
        (
            [
                qs * cos(theta / 3.0) - off,
                qs * cos((theta + 2.0 * PI) / 3.0) - off,
                qs * cos((theta - 2.0 * PI) / 3.0) - off,
            ],
            3,
        )
    } else {
        let mut big_a = -cbrt(fabs(r) + sqrt(r2 - q3));
        if r < 0.0 {
            big_a = -big_a;
        }
        let big_b = if big_a == 0.0 { 0.0 } else { q / big_a };
        ([(big_a + big_b) - a / 3.0, 0.0, 0.0], 1)
    }
}

/// Real roots of the monic quartic `x^4 + a*x^3 + b*x^2 + c*x + d = 0`.
///
/// Splits the quartic into two quadratics via a root of the resolvent cubic.
pub fn solve_quart_monic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64, 4> {
    let mut roots = Vec::new();

    if fabs(d) < f64::EPSILON {
        // x * (x^3 + a x^2 + b x + c)
        let _ = roots.push(0.0);
        let (r3, n) = solve_resolvent(a, b, c);
        for &x in r3.iter().take(n) {
            let _ = roots.push(x);
        }
        return roots;
    }

    let a3 = -b;
    let b3 = a * c - 4.0 * d;
    let c3 = -a * a * d - c * c + 4.0 * b * d;

    let (r3, n3) = solve_resolvent(a3, b3, c3);
    let mut y = r3[0];
    if n3 != 1 {
        if fabs(r3[1]) > fabs(y) {
            y = r3[1];
        }
        if fabs(r3[2]) > fabs(y) {
            y = r3[2];
        }
    }

    let (q1, q2, p1, p2);
    let disc = y * y - 4.0 * d;
    if fabs(disc) < f64::EPSILON {
        q1 = y / 2.0;
        q2 = q1;
        let disc_p = a * a - 4.0 * (b - y);
        if fabs(disc_p) < f64::EPSILON {
            p1 = a / 2.0;
            p2 = p1;
        } else {
            let sq = sqrt(disc_p);
            p1 = (a + sq) / 2.0;
            p2 = (a - sq) / 2.0;
        }
    } else {
        let sq = sqrt(disc);
        q1 = (y + sq) / 2.0;
        q2 = (y - sq) / 2.0;
        p1 = (a * q1 - c) / (q1 - q2);
        p2 = (c - a * q2) / (q1 - q2);
    }

    for x in solve_quadratic(p1, q1) {
        let _ = roots.push(x);
    }
    for x in solve_quadratic(p2, q2) {
        let _ = roots.push(x);
    }
    roots
}

/// Evaluate a polynomial given by its coefficients (highest order first).
pub fn poly_eval(coeffs: &[f64], x: f64) -> f64 {
    let mut acc = 0.0;
    for &c in coeffs {
        acc = acc * x + c;
    }
    acc
}

/// Evaluate a polynomial and its derivative in a single Horner pass.
pub fn poly_eval_with_derivative(coeffs: &[f64], x: f64) -> (f64, f64) {
    let mut acc = 0.0;
    let mut deriv = 0.0;
    for &c in coeffs {
        deriv = deriv * x + acc;
        acc = acc * x + c;
    }
    (acc, deriv)
}

/// Safeguarded Newton refinement of a polynomial root inside `[lower, upper]`.
///
/// Falls back to bisection whenever a Newton step would leave the bracket or
/// fails to shrink it fast enough. Assumes a sign change over the interval;
/// without one, the result converges to a bracket endpoint.
pub fn shrink_interval(coeffs: &[f64], lower: f64, upper: f64, tol: f64) -> f64 {
    let fl = poly_eval(coeffs, lower);
    let (mut xl, mut xh) = if fl < 0.0 { (lower, upper) } else { (upper, lower) };

    let mut rts = (lower + upper) / 2.0;
    let mut dx_old = fabs(upper - lower);
    let mut dx = dx_old;
    let (mut f, mut df) = poly_eval_with_derivative(coeffs, rts);

    for _ in 0..128 {
        let newton_out = ((rts - xh) * df - f) * ((rts - xl) * df - f) > 0.0;
        if newton_out || fabs(2.0 * f) > fabs(dx_old * df) {
            dx_old = dx;
            dx = (xh - xl) / 2.0;
            rts = xl + dx;
        } else {
            dx_old = dx;
            dx = f / df;
            rts -= dx;
        }
        if fabs(dx) < tol {
            break;
        }
        let e = poly_eval_with_derivative(coeffs, rts);
        f = e.0;
        df = e.1;
        if f < 0.0 {
            xl = rts;
        } else {
            xh = rts;
        }
    }
    rts
}

/// Bracketed root of an arbitrary scalar function over `[lower, upper]`.
///
/// Secant steps accelerated with bisection safeguards; requires a sign change
/// over the bracket.
pub fn solve_bracketed<F: Fn(f64) -> f64>(f: F, lower: f64, upper: f64, tol: f64) -> f64 {
    let (mut xa, mut xb) = (lower, upper);
    let (mut fa, mut fb) = (f(xa), f(xb));
    if fa == 0.0 {
        return xa;
    }
    if fb == 0.0 {
        return xb;
    }

    let mut x = (xa + xb) / 2.0;
    for _ in 0..128 {
        let secant = if fb != fa { xb - fb * (xb - xa) / (fb - fa) } else { x };
        let (lo, hi) = if xa < xb { (xa, xb) } else { (xb, xa) };
        x = if secant > lo && secant < hi { secant } else { (xa + xb) / 2.0 };

        let fx = f(x);
        if fx == 0.0 || fabs(xb - xa) < tol {
            return x;
        }
        if (fx < 0.0) == (fa < 0.0) {
            xa = x;
            fa = fx;
        } else {
            xb = x;
            fb = fx;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_two_roots() {
        // (x - 2)(x + 3) = x^2 + x - 6
        let roots = solve_quadratic(1.0, -6.0);
        assert_eq!(roots.len(), 2);
        let mut r: [f64; 2] = [roots[0], roots[1]];
        r.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((r[0] + 3.0).abs() < 1e-12);
        assert!((r[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_no_real_roots() {
        let roots = solve_quadratic(0.0, 1.0);
        assert!(roots.is_empty());
    }

    #[test]
    fn test_cubic_three_roots() {
        // (x - 1)(x - 2)(x - 3) = x^3 - 6x^2 + 11x - 6
        let roots = solve_cub(1.0, -6.0, 11.0, -6.0);
        assert_eq!(roots.len(), 3);
        for expected in [1.0, 2.0, 3.0] {
            assert!(roots.iter().any(|r| (r - expected).abs() < 1e-9));
        }
    }

    #[test]
    fn test_cubic_degenerate_linear() {
        let roots = solve_cub(0.0, 0.0, 2.0, -4.0);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_quartic_known_roots() {
        // (x - 1)(x + 1)(x - 2)(x + 2) = x^4 - 5x^2 + 4
        let roots = solve_quart_monic(0.0, -5.0, 0.0, 4.0);
        assert_eq!(roots.len(), 4);
        for expected in [-2.0, -1.0, 1.0, 2.0] {
            assert!(roots.iter().any(|r| (r - expected).abs() < 1e-9));
        }
    }

    #[test]
    fn test_quartic_zero_constant() {
        // x(x^3 - x) has roots 0, 0, 1, -1
        let roots = solve_quart_monic(0.0, -1.0, 0.0, 0.0);
        assert!(roots.iter().any(|r| r.abs() < 1e-12));
        assert!(roots.iter().any(|r| (r - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_poly_eval() {
        // x^2 - 4 at x = 3
        assert!((poly_eval(&[1.0, 0.0, -4.0], 3.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_shrink_interval() {
        // x^3 - 2 has a root at cbrt(2)
        let coeffs = [1.0, 0.0, 0.0, -2.0];
        let root = shrink_interval(&coeffs, 1.0, 2.0, 1e-14);
        assert!((root - 2.0_f64.powf(1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_solve_bracketed() {
        let root = solve_bracketed(|x| x * x - 2.0, 0.0, 2.0, 1e-14);
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-10);
    }
}
