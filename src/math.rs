//! Numeric primitives shared by the method implementations.

use crate::error::{Error, Result};

#[inline]
pub(crate) fn logaddexp(a: f64, b: f64) -> f64 {
    if a == b {
        return a + 2f64.ln();
    }
    let diff = a - b;
    if diff > 0. {
        a + (-diff).exp().ln_1p()
    } else if diff < 0. {
        b + diff.exp().ln_1p()
    } else {
        // diff is NAN
        diff
    }
}

/// Normalize a vector in place and return its original euclidean norm.
pub(crate) fn normalize(vec: &mut [f64]) -> f64 {
    let norm = vec.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0. {
        vec.iter_mut().for_each(|x| *x /= norm);
    }
    norm
}

const GOLDEN: f64 = 0.618_033_988_749_894_9;

/// Locate the maximum of a unimodal function over an inclusive domain.
///
/// Starts from `center`, expands a finite bracket towards infinite bounds,
/// then contracts by golden-section search. Fails when no bracket with an
/// interior high point can be found.
pub(crate) fn find_maximum(
    f: impl Fn(f64) -> f64,
    center: f64,
    (left, right): (f64, f64),
) -> Result<f64> {
    let c = center.clamp(left, right);
    let (mut a, mut b) = bracket(&f, c, left, right)?;
    for _ in 0..200 {
        if b - a < 1e-10 * (1. + a.abs() + b.abs()) {
            break;
        }
        let x1 = b - GOLDEN * (b - a);
        let x2 = a + GOLDEN * (b - a);
        if f(x1) < f(x2) {
            a = x1;
        } else {
            b = x2;
        }
    }
    let x = 0.5 * (a + b);
    if f(x).is_finite() {
        Ok(x)
    } else {
        Err(Error::numeric("maximum search produced non-finite value"))
    }
}

fn bracket(f: impl Fn(f64) -> f64, center: f64, left: f64, right: f64) -> Result<(f64, f64)> {
    let mut step = 1.0 + 0.1 * center.abs();
    let mut a = if left.is_finite() { left } else { center - step };
    let mut b = if right.is_finite() { right } else { center + step };
    // Expand towards open bounds until the function decays below its
    // value somewhere inside the bracket.
    for _ in 0..64 {
        let inner = f(center.clamp(a, b)).max(f(0.5 * (a + b)));
        let grow_left = !left.is_finite() && f(a) >= inner;
        let grow_right = !right.is_finite() && f(b) >= inner;
        if !grow_left && !grow_right {
            if inner.is_finite() {
                return Ok((a, b));
            }
            return Err(Error::distr(
                "cannot derive mode: density not finite near center",
            ));
        }
        step *= 2.;
        if grow_left {
            a -= step;
        }
        if grow_right {
            b += step;
        }
    }
    Err(Error::exhausted("mode search bracket did not converge"))
}

/// Integrate `f` over an inclusive, possibly unbounded interval.
///
/// Unbounded tails are folded onto a finite interval by rational
/// substitution, then evaluated by adaptive Simpson quadrature.
pub(crate) fn integrate(f: impl Fn(f64) -> f64, left: f64, right: f64) -> Result<f64> {
    let value = match (left.is_finite(), right.is_finite()) {
        (true, true) => adaptive_simpson(&f, left, right),
        (true, false) => {
            // x = left + t/(1-t), t in [0,1)
            let g = |t: f64| {
                let s = 1. - t;
                f(left + t / s) / (s * s)
            };
            adaptive_simpson(&g, 0., 1. - 1e-12)
        }
        (false, true) => {
            let g = |t: f64| {
                let s = 1. - t;
                f(right - t / s) / (s * s)
            };
            adaptive_simpson(&g, 0., 1. - 1e-12)
        }
        (false, false) => {
            // x = t/(1-t^2), t in (-1,1)
            let g = |t: f64| {
                let s = 1. - t * t;
                f(t / s) * (1. + t * t) / (s * s)
            };
            adaptive_simpson(&g, -1. + 1e-12, 1. - 1e-12)
        }
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::numeric("integral is not finite"))
    }
}

fn adaptive_simpson(f: &impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let fa = finite_or_zero(f(a));
    let fb = finite_or_zero(f(b));
    let m = 0.5 * (a + b);
    let fm = finite_or_zero(f(m));
    let whole = (b - a) / 6. * (fa + 4. * fm + fb);
    simpson_step(f, a, b, fa, fb, fm, whole, 1e-10, 20)
}

#[allow(clippy::too_many_arguments)]
fn simpson_step(
    f: &impl Fn(f64) -> f64,
    a: f64,
    b: f64,
    fa: f64,
    fb: f64,
    fm: f64,
    whole: f64,
    tol: f64,
    depth: u32,
) -> f64 {
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = finite_or_zero(f(lm));
    let frm = finite_or_zero(f(rm));
    let left = (m - a) / 6. * (fa + 4. * flm + fm);
    let right = (b - m) / 6. * (fm + 4. * frm + fb);
    let delta = left + right - whole;
    if depth == 0 || delta.abs() <= 15. * tol {
        left + right + delta / 15.
    } else {
        simpson_step(f, a, m, fa, fm, flm, left, 0.5 * tol, depth - 1)
            + simpson_step(f, m, b, fm, fb, frm, right, 0.5 * tol, depth - 1)
    }
}

#[inline]
fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.
    }
}

/// Solve `f(x) == target` for a monotone non-decreasing `f`.
///
/// Expands a bracket from `center` over open bounds, then bisects. The
/// optional derivative accelerates the final contraction with Newton steps
/// that fall back to bisection whenever they leave the bracket.
pub(crate) fn invert_monotone(
    f: impl Fn(f64) -> f64,
    deriv: Option<&dyn Fn(f64) -> f64>,
    target: f64,
    (left, right): (f64, f64),
    center: f64,
) -> Result<f64> {
    let mut step = 1.0 + 0.1 * center.abs();
    let mut lo = if left.is_finite() { left } else { center - step };
    let mut hi = if right.is_finite() { right } else { center + step };
    for _ in 0..128 {
        let mut moved = false;
        if !left.is_finite() && f(lo) > target {
            lo -= step;
            moved = true;
        }
        if !right.is_finite() && f(hi) < target {
            hi += step;
            moved = true;
        }
        if !moved {
            break;
        }
        step *= 2.;
    }
    if f(lo) > target + 1e-12 || f(hi) < target - 1e-12 {
        return Err(Error::numeric("inversion target outside function range"));
    }
    let mut x = 0.5 * (lo + hi);
    for _ in 0..200 {
        let fx = f(x);
        if !fx.is_finite() {
            return Err(Error::numeric("non-finite CDF value during inversion"));
        }
        if (fx - target).abs() <= 1e-14 || hi - lo <= 1e-14 * (1. + x.abs()) {
            return Ok(x);
        }
        if fx < target {
            lo = x;
        } else {
            hi = x;
        }
        let newton = deriv.and_then(|d| {
            let dx = d(x);
            if dx > 0. {
                let cand = x - (fx - target) / dx;
                (cand > lo && cand < hi).then_some(cand)
            } else {
                None
            }
        });
        x = newton.unwrap_or(0.5 * (lo + hi));
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn check_logaddexp(x in -10f64..10f64, y in -10f64..10f64) {
            let a = (x.exp() + y.exp()).ln();
            let b = logaddexp(x, y);
            let neginf = f64::NEG_INFINITY;
            prop_assert!((a - b).abs() < 1e-10);
            prop_assert_eq!(b, logaddexp(y, x));
            prop_assert_eq!(x, logaddexp(x, neginf));
            prop_assert_eq!(logaddexp(neginf, neginf), neginf);
        }
    }

    #[test]
    fn check_neginf() {
        assert_eq!(logaddexp(f64::NEG_INFINITY, 2.), 2.);
        assert_eq!(logaddexp(2., f64::NEG_INFINITY), 2.);
    }

    #[test]
    fn maximum_of_shifted_parabola() {
        let x = find_maximum(|x| -(x - 3.).powi(2), 0., (f64::NEG_INFINITY, f64::INFINITY));
        assert_abs_diff_eq!(x.unwrap(), 3., epsilon = 1e-6);
    }

    #[test]
    fn maximum_respects_domain_edge() {
        // Monotone increasing on [0, 2]: maximum at the right edge.
        let x = find_maximum(|x| x, 1., (0., 2.)).unwrap();
        assert_abs_diff_eq!(x, 2., epsilon = 1e-6);
    }

    #[test]
    fn gaussian_integral_over_the_real_line() {
        let sqrt_2pi = (2. * std::f64::consts::PI).sqrt();
        let area = integrate(
            |x| (-0.5 * x * x).exp() / sqrt_2pi,
            f64::NEG_INFINITY,
            f64::INFINITY,
        )
        .unwrap();
        assert_abs_diff_eq!(area, 1., epsilon = 1e-6);
    }

    #[test]
    fn exponential_integral_over_half_line() {
        let area = integrate(|x| (-x).exp(), 0., f64::INFINITY).unwrap();
        assert_abs_diff_eq!(area, 1., epsilon = 1e-6);
    }

    #[test]
    fn invert_exponential_cdf() {
        let cdf = |x: f64| 1. - (-x).exp();
        for u in [0.05, 0.3, 0.5, 0.9, 0.999] {
            let x = invert_monotone(cdf, None, u, (0., f64::INFINITY), 1.).unwrap();
            assert_abs_diff_eq!(cdf(x), u, epsilon = 1e-10);
        }
    }

    #[test]
    fn newton_acceleration_matches_bisection() {
        let cdf = |x: f64| 1. - (-x).exp();
        let pdf = |x: f64| (-x).exp();
        let a = invert_monotone(cdf, Some(&pdf), 0.7, (0., f64::INFINITY), 1.).unwrap();
        let b = invert_monotone(cdf, None, 0.7, (0., f64::INFINITY), 1.).unwrap();
        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
    }
}
