//! Adaptive rejection sampling from log-concave densities.
//!
//! The density is bounded above by a piecewise-exponential hat built from
//! tangents of the log-density at a set of construction points, and below
//! by the piecewise-exponential squeeze through the points themselves.
//! Rejected candidates are promoted to construction points, so the hat
//! tightens where the density is actually sampled; growth stops at a
//! configurable interval cap. All envelope bookkeeping is kept in log
//! scale, shifted by the largest segment area, so densities may be passed
//! unnormalized with log-densities far outside the exponentiable range.

use itertools::Itertools;

use crate::{
    distr::{ContDistr, ContDistrRef, ContEval, Domain},
    error::{report, Error, Result},
    generate::{Generator, Profile, SamplingKind},
    math::logaddexp,
    urng::{uniform, uniform_pos, UrngRef},
};

/// Draw attempts per variate before giving up.
const MAX_TRIALS: usize = 10_000;

/// Steps taken when pushing a starting point out into an unbounded tail.
const MAX_TAIL_STEPS: usize = 64;

/// A construction point: abscissa, log-density and its derivative there.
#[derive(Debug, Clone, Copy)]
struct CPoint {
    x: f64,
    logfx: f64,
    dlogfx: f64,
}

/// Where the initial construction points come from.
#[derive(Debug, Clone)]
enum CPointsSpec {
    /// Spread `n` points over the domain around the center.
    Count(usize),
    /// Use these abscissae.
    Given(Vec<f64>),
}

/// Piecewise-exponential hat and squeeze.
///
/// Segment `i` covers `bounds[i]..bounds[i+1]` and carries the tangent at
/// `pts[i]`. Segment areas are stored relative to the largest one
/// (`log_amax`), cumulated for inversion.
#[derive(Debug, Clone)]
struct Envelope {
    pts: Vec<CPoint>,
    bounds: Vec<f64>,
    log_amax: f64,
    cum: Vec<f64>,
    total: f64,
    log_squeeze: f64,
}

impl Envelope {
    fn build(pts: Vec<CPoint>, domain: Domain) -> Result<Envelope> {
        let n = pts.len();
        if n < 2 {
            return Err(Error::condition(
                "fewer than two usable construction points",
            ));
        }
        let mut bounds = Vec::with_capacity(n + 1);
        bounds.push(domain.left());
        for (&a, &b) in pts.iter().tuple_windows() {
            let slack = 1e-8 * (1. + a.dlogfx.abs());
            if b.dlogfx > a.dlogfx + slack {
                return Err(Error::condition("density is not log-concave"));
            }
            bounds.push(tangent_intersection(a, b)?);
        }
        bounds.push(domain.right());

        let mut log_areas = Vec::with_capacity(n);
        let mut log_amax = f64::NEG_INFINITY;
        for (i, pt) in pts.iter().enumerate() {
            let la = log_exp_linear_area(pt.logfx, pt.dlogfx, pt.x, bounds[i], bounds[i + 1]);
            if la == f64::INFINITY {
                return Err(Error::condition("hat has unbounded area over a tail"));
            }
            if la.is_nan() {
                return Err(Error::numeric("hat segment area is NaN"));
            }
            log_amax = log_amax.max(la);
            log_areas.push(la);
        }
        if !log_amax.is_finite() {
            return Err(Error::numeric("hat area vanishes everywhere"));
        }

        let mut cum = Vec::with_capacity(n);
        let mut acc = 0.;
        for la in &log_areas {
            acc += (la - log_amax).exp();
            cum.push(acc);
        }
        let total = acc;

        let mut log_squeeze = f64::NEG_INFINITY;
        for (&a, &b) in pts.iter().tuple_windows() {
            let slope = (b.logfx - a.logfx) / (b.x - a.x);
            let la = log_exp_linear_area(a.logfx, slope, a.x, a.x, b.x);
            log_squeeze = logaddexp(log_squeeze, la);
        }

        Ok(Envelope {
            pts,
            bounds,
            log_amax,
            cum,
            total,
            log_squeeze,
        })
    }

    fn len(&self) -> usize {
        self.pts.len()
    }

    fn log_hat_area(&self) -> f64 {
        self.log_amax + self.total.ln()
    }

    fn hat_area(&self) -> f64 {
        self.log_hat_area().exp()
    }

    fn squeeze_area(&self) -> f64 {
        self.log_squeeze.exp()
    }

    /// Log of the hat at `x`.
    fn hat_log(&self, x: f64) -> f64 {
        let n = self.pts.len();
        let i = self.bounds[1..n].partition_point(|b| *b < x);
        let pt = self.pts[i];
        pt.logfx + pt.dlogfx * (x - pt.x)
    }

    /// Log of the squeeze at `x`; negative infinity outside the hull of the
    /// construction points.
    fn squeeze_log(&self, x: f64) -> f64 {
        let n = self.pts.len();
        if x < self.pts[0].x || x > self.pts[n - 1].x {
            return f64::NEG_INFINITY;
        }
        let i = self.pts[1..n - 1].partition_point(|p| p.x < x);
        let (a, b) = (self.pts[i], self.pts[i + 1]);
        let slope = (b.logfx - a.logfx) / (b.x - a.x);
        a.logfx + slope * (x - a.x)
    }

    /// Draw from the hat by segment selection and in-segment inversion.
    fn sample_hat(&self, urng: &UrngRef) -> f64 {
        let n = self.pts.len();
        let target = uniform(urng) * self.total;
        let i = self.cum.partition_point(|c| *c < target).min(n - 1);
        let pt = self.pts[i];
        let (lo, hi) = (self.bounds[i], self.bounds[i + 1]);
        let d = pt.dlogfx;
        let w = uniform_pos(urng);
        let x = if d.abs() * (hi - lo) < 1e-13 {
            lo + w * (hi - lo)
        } else if d > 0. {
            // q = 0 when the segment reaches to negative infinity.
            let q = (d * (lo - hi)).exp();
            hi + (q + w * (1. - q)).ln() / d
        } else {
            let q = (d * (hi - lo)).exp();
            lo + (1. - w * (1. - q)).ln() / d
        };
        x.clamp(self.bounds[0], self.bounds[n])
    }
}

/// Abscissa where the tangents at `a` and `b` cross.
fn tangent_intersection(a: CPoint, b: CPoint) -> Result<f64> {
    let denom = a.dlogfx - b.dlogfx;
    if denom <= 1e-14 * (1. + a.dlogfx.abs()) {
        return Ok(0.5 * (a.x + b.x));
    }
    let z = (b.logfx - a.logfx + a.dlogfx * a.x - b.dlogfx * b.x) / denom;
    let slack = 1e-8 * (b.x - a.x).abs();
    if z < a.x - slack || z > b.x + slack {
        return Err(Error::condition("density is not log-concave"));
    }
    Ok(z.clamp(a.x, b.x))
}

/// `ln` of the integral of `exp(logf + d * (x - xi))` over `[lo, hi]`.
///
/// Returns positive infinity for a tail the linear piece cannot bound.
fn log_exp_linear_area(logf: f64, d: f64, xi: f64, lo: f64, hi: f64) -> f64 {
    let width = hi - lo;
    if !(width > 0.) {
        return f64::NEG_INFINITY;
    }
    if width.is_finite() && d.abs() * width < 1e-13 {
        return logf + d * (0.5 * (lo + hi) - xi) + width.ln();
    }
    if d > 0. {
        if hi == f64::INFINITY {
            return f64::INFINITY;
        }
        // exp(-d * width) underflows to zero for an infinite width, which
        // is exactly the tail integral.
        logf + d * (hi - xi) + (-(-d * width).exp()).ln_1p() - d.ln()
    } else if d < 0. {
        if lo == f64::NEG_INFINITY {
            return f64::INFINITY;
        }
        logf + d * (lo - xi) + (-(d * width).exp()).ln_1p() - (-d).ln()
    } else {
        // Flat piece; infinite only over an infinite width.
        logf + width.ln()
    }
}

/// Parameter record for the adaptive rejection method.
#[derive(Debug)]
pub struct ArsParams {
    distr: ContDistrRef,
    cpoints: CPointsSpec,
    max_intervals: usize,
    verify: bool,
}

impl ArsParams {
    /// Bind a distribution record. It must carry a log-density and its
    /// derivative (directly or derivable).
    pub fn new(distr: &ContDistrRef) -> Result<Self> {
        {
            let d = distr.borrow();
            if !d.has(ContEval::LogPdf) {
                return Err(Error::distr("logPDF required for adaptive rejection"));
            }
            if !d.has(ContEval::DLogPdf) {
                return Err(Error::distr("dlogPDF required for adaptive rejection"));
            }
        }
        Ok(ArsParams {
            distr: distr.clone(),
            cpoints: CPointsSpec::Count(4),
            max_intervals: 100,
            verify: false,
        })
    }

    /// Number of starting construction points (default 4).
    pub fn set_cpoints(&mut self, n: usize) -> Result<()> {
        if n < 2 {
            return Err(Error::param("need at least two construction points"));
        }
        self.cpoints = CPointsSpec::Count(n);
        Ok(())
    }

    /// Explicit starting abscissae; points outside the domain are dropped.
    pub fn set_cpoints_at(&mut self, points: &[f64]) -> Result<()> {
        if points.len() < 2 {
            return Err(Error::param("need at least two construction points"));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(Error::param("construction points must be finite"));
        }
        let mut points = points.to_vec();
        points.sort_by(f64::total_cmp);
        self.cpoints = CPointsSpec::Given(points);
        Ok(())
    }

    /// Cap on envelope growth (default 100). Once reached, rejected
    /// candidates are no longer promoted to construction points.
    pub fn set_max_intervals(&mut self, n: usize) -> Result<()> {
        if n < 2 {
            return Err(Error::param("interval cap must be at least two"));
        }
        self.max_intervals = n;
        Ok(())
    }

    /// Re-check the envelope ordering on every rejected candidate and
    /// report violations on the diagnostic channel.
    pub fn set_verify(&mut self, verify: bool) {
        self.verify = verify;
    }

    /// Consume the record and build a generator.
    pub fn init(self, urng: &UrngRef) -> Result<ArsGen> {
        if let CPointsSpec::Count(n) = self.cpoints {
            if n > self.max_intervals {
                return Err(report(Error::param(
                    "more construction points than the interval cap",
                )));
            }
        }
        let (env, domain) = {
            let d = self.distr.borrow();
            setup(&d, &self.cpoints, self.max_intervals).map_err(report)?
        };
        let built_version = self.distr.borrow().version();
        Ok(ArsGen {
            distr: self.distr,
            urng: urng.clone(),
            domain,
            env,
            cpoints: self.cpoints,
            max_intervals: self.max_intervals,
            verify: self.verify,
            frozen: false,
            valid: true,
            built_version,
        })
    }
}

/// Build the starting envelope for the current state of the record.
fn setup(d: &ContDistr, spec: &CPointsSpec, max_intervals: usize) -> Result<(Envelope, Domain)> {
    let domain = d.domain();
    let xs = match spec {
        CPointsSpec::Count(n) => starting_points(*n, domain, d.center()),
        CPointsSpec::Given(points) => points
            .iter()
            .copied()
            .filter(|x| domain.contains(*x))
            .collect(),
    };
    let mut pts: Vec<CPoint> = Vec::with_capacity(xs.len());
    for x in xs {
        if let Some(pt) = eval_point(d, x)? {
            if pts
                .last()
                .map_or(true, |p| pt.x > p.x + 1e-12 * (1. + p.x.abs()))
            {
                pts.push(pt);
            }
        }
    }
    if pts.is_empty() {
        return Err(Error::condition(
            "no starting point with positive density found",
        ));
    }
    if domain.left() == f64::NEG_INFINITY {
        fix_tail(&mut pts, true, d)?;
    }
    if domain.right() == f64::INFINITY {
        fix_tail(&mut pts, false, d)?;
    }
    // The cap bounds setup work as well as adaptation; tail fixup points
    // count against the same budget.
    if pts.len() > max_intervals {
        return Err(Error::exhausted("interval cap exceeded during setup"));
    }
    let env = Envelope::build(pts, domain)?;
    Ok((env, domain))
}

/// Spread `n` abscissae over the domain, denser near the center.
fn starting_points(n: usize, domain: Domain, center: f64) -> Vec<f64> {
    use std::f64::consts::PI;

    let (left, right) = (domain.left(), domain.right());
    (0..n)
        .map(|i| {
            let t = (i as f64 + 1.) / (n as f64 + 1.);
            match (left.is_finite(), right.is_finite()) {
                (true, true) => left + t * (right - left),
                (true, false) => left + (center - left).max(1.) * (PI * t / 2.).tan(),
                (false, true) => right - (right - center).max(1.) * (PI * (1. - t) / 2.).tan(),
                (false, false) => center + (PI * (t - 0.5)).tan(),
            }
        })
        .collect()
}

fn eval_point(d: &ContDistr, x: f64) -> Result<Option<CPoint>> {
    let logfx = d.logpdf(x)?;
    if !logfx.is_finite() {
        return Ok(None);
    }
    let dlogfx = d.dlogpdf(x)?;
    if !dlogfx.is_finite() {
        return Ok(None);
    }
    Ok(Some(CPoint { x, logfx, dlogfx }))
}

/// Push points outward until the edge tangent slopes toward the unbounded
/// tail, so the hat stays integrable there.
fn fix_tail(pts: &mut Vec<CPoint>, left: bool, d: &ContDistr) -> Result<()> {
    let mut step = 1.;
    for _ in 0..MAX_TAIL_STEPS {
        let edge = if left { pts[0] } else { pts[pts.len() - 1] };
        let ok = if left {
            edge.dlogfx > 0.
        } else {
            edge.dlogfx < 0.
        };
        if ok {
            return Ok(());
        }
        let x = if left { edge.x - step } else { edge.x + step };
        step *= 2.;
        if let Some(pt) = eval_point(d, x)? {
            if left {
                pts.insert(0, pt);
            } else {
                pts.push(pt);
            }
        }
    }
    Err(Error::condition("cannot bound an unbounded tail"))
}

/// Adaptive rejection generator.
///
/// Cloning shares the distribution record and the uniform source but gives
/// the clone its own envelope, so the original's adaptation does not leak
/// into the clone.
#[derive(Clone)]
pub struct ArsGen {
    distr: ContDistrRef,
    urng: UrngRef,
    domain: Domain,
    env: Envelope,
    cpoints: CPointsSpec,
    max_intervals: usize,
    verify: bool,
    frozen: bool,
    valid: bool,
    built_version: u64,
}

impl ArsGen {
    fn check_usable(&self) -> Result<()> {
        if !self.valid {
            return Err(report(Error::generator(
                "setup failed; reinit before sampling",
            )));
        }
        if self.distr.borrow().version() != self.built_version {
            return Err(report(Error::generator(
                "distribution changed since setup; reinit before sampling",
            )));
        }
        Ok(())
    }

    pub fn intervals(&self) -> usize {
        self.env.len()
    }

    /// Linear hat area. Overflows to infinity when the density is scaled
    /// beyond the exponentiable range; [`ArsGen::log_hat_area`] is
    /// scale-safe.
    pub fn hat_area(&self) -> f64 {
        self.env.hat_area()
    }

    pub fn log_hat_area(&self) -> f64 {
        self.env.log_hat_area()
    }

    /// Linear squeeze area; same overflow caveat as [`ArsGen::hat_area`].
    pub fn squeeze_area(&self) -> f64 {
        self.env.squeeze_area()
    }

    pub fn log_squeeze_area(&self) -> f64 {
        self.env.log_squeeze
    }

    fn try_insert(&mut self, pt: CPoint) {
        if self.frozen || self.env.len() >= self.max_intervals {
            return;
        }
        if self
            .env
            .pts
            .iter()
            .any(|p| (p.x - pt.x).abs() <= 1e-12 * (1. + pt.x.abs()))
        {
            return;
        }
        let mut pts = self.env.pts.clone();
        let idx = pts.partition_point(|p| p.x < pt.x);
        pts.insert(idx, pt);
        match Envelope::build(pts, self.domain) {
            Ok(env) => self.env = env,
            Err(err) => {
                // Numerical fringe of an otherwise log-concave density, or
                // a genuine violation first seen away from the starting
                // points. Stop adapting; the current hat keeps working.
                self.frozen = true;
                let _ = report(err);
            }
        }
    }
}

impl Generator for ArsGen {
    fn sample(&mut self) -> Result<f64> {
        self.check_usable()?;
        for _ in 0..MAX_TRIALS {
            let x = self.env.sample_hat(&self.urng);
            if !x.is_finite() {
                continue;
            }
            let hat = self.env.hat_log(x);
            let squeeze = self.env.squeeze_log(x);
            let logv = uniform_pos(&self.urng).ln();
            if logv + hat <= squeeze {
                return Ok(x);
            }
            let logf = self.distr.borrow().logpdf(x)?;
            if self.verify {
                let slack = 1e-7 * (1. + hat.abs());
                if logf > hat + slack || squeeze > logf + slack {
                    let _ = report(Error::condition(
                        "PDF not between squeeze and hat at sampled point",
                    ));
                }
            }
            if logv + hat <= logf {
                return Ok(x);
            }
            // Rejected: promote the evaluated point so the hat tightens
            // where rejections actually happen.
            if logf.is_finite() {
                let dlogf = self.distr.borrow().dlogpdf(x)?;
                if dlogf.is_finite() {
                    self.try_insert(CPoint {
                        x,
                        logfx: logf,
                        dlogfx: dlogf,
                    });
                }
            }
        }
        Err(report(Error::exhausted(
            "rejection loop made no progress",
        )))
    }

    fn reinit(&mut self) -> Result<()> {
        self.valid = false;
        let (env, domain) = {
            let d = self.distr.borrow();
            setup(&d, &self.cpoints, self.max_intervals).map_err(report)?
        };
        self.env = env;
        self.domain = domain;
        self.frozen = false;
        self.built_version = self.distr.borrow().version();
        self.valid = true;
        Ok(())
    }

    fn profile(&self) -> Profile {
        let mut p = Profile::new("ars", SamplingKind::InversionRejection);
        p.hat_area = Some(self.env.hat_area());
        p.squeeze_area = Some(self.env.squeeze_area());
        p.intervals = Some(self.env.len());
        // The shifted difference stays finite where the linear areas
        // do not.
        p.rejection_constant = self
            .distr
            .borrow()
            .area()
            .map(|a| (self.env.log_hat_area() - a.ln()).exp());
        p
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{test_distr, urng::default_urng};

    fn normal_gen(seed: u64) -> ArsGen {
        let distr = test_distr::normal(0., 1.);
        let params = ArsParams::new(&distr).unwrap();
        params.init(&default_urng(seed)).unwrap()
    }

    #[test]
    fn envelope_brackets_the_log_density() {
        let gen = normal_gen(1);
        let d = gen.distr.borrow();
        let mut x = -4.0;
        while x <= 4.0 {
            let logf = d.logpdf(x).unwrap();
            assert!(gen.env.squeeze_log(x) <= logf + 1e-9, "squeeze above at {x}");
            assert!(logf <= gen.env.hat_log(x) + 1e-9, "hat below at {x}");
            x += 0.01;
        }
        assert!(gen.hat_area() >= gen.squeeze_area());
    }

    #[test]
    fn normal_sample_moments() {
        let mut gen = normal_gen(42);
        let n = 20_000;
        let xs = gen.sample_many(n).unwrap();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(var, 1.0, epsilon = 0.06);
    }

    #[test]
    fn normal_sample_passes_chi_square() {
        let mut gen = normal_gen(17);
        let n = 20_000;
        let xs = gen.sample_many(n).unwrap();
        let edges = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
        // Standard normal bin masses for the edges above.
        let probs = [
            0.066_807_2, 0.091_848_1, 0.149_882_2, 0.191_462_5, 0.191_462_5, 0.149_882_2,
            0.091_848_1, 0.066_807_2,
        ];
        let mut counts = [0usize; 8];
        for x in &xs {
            counts[edges.partition_point(|e| e < x)] += 1;
        }
        let chi2: f64 = counts
            .iter()
            .zip(&probs)
            .map(|(c, p)| {
                let expect = n as f64 * p;
                (*c as f64 - expect).powi(2) / expect
            })
            .sum();
        // 99.9% point of the chi-square law with 7 degrees of freedom.
        assert!(chi2 < 24.32, "chi-square statistic {chi2}");
    }

    #[test]
    fn half_bounded_domain_samples_exponential() {
        let distr = test_distr::expo(2.0);
        let params = ArsParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(7)).unwrap();
        let n = 20_000;
        let xs = gen.sample_many(n).unwrap();
        assert!(xs.iter().all(|x| *x >= 0.));
        let mean = xs.iter().sum::<f64>() / n as f64;
        assert_abs_diff_eq!(mean, 0.5, epsilon = 0.02);
    }

    #[test]
    fn envelope_adapts_up_to_the_cap() {
        let distr = test_distr::normal(0., 1.);
        let mut params = ArsParams::new(&distr).unwrap();
        params.set_max_intervals(6).unwrap();
        let mut gen = params.init(&default_urng(3)).unwrap();
        let start = gen.intervals();
        gen.sample_many(500).unwrap();
        assert!(gen.intervals() >= start);
        assert!(gen.intervals() <= 6);
    }

    #[test]
    fn explicit_points_beyond_the_cap_fail_init() {
        let distr = test_distr::normal(0., 1.);
        let mut params = ArsParams::new(&distr).unwrap();
        params.set_max_intervals(5).unwrap();
        let points: Vec<f64> = (0..40).map(|i| -2. + 0.1 * i as f64).collect();
        params.set_cpoints_at(&points).unwrap();
        assert!(matches!(
            params.init(&default_urng(1)),
            Err(Error::ResourceExhausted(_))
        ));
    }

    #[test]
    fn unnormalized_density_keeps_log_areas_finite() {
        // Scaled by exp(800), far outside the exponentiable range.
        let mut d = crate::distr::ContDistr::new(Domain::UNBOUNDED);
        d.set_logpdf(Box::new(|x, _| 800. - 0.5 * x * x));
        d.set_dlogpdf(Box::new(|x, _| -x));
        let distr = d.into_ref();
        let params = ArsParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(13)).unwrap();
        assert!(gen.sample().unwrap().is_finite());
        assert!(gen.log_hat_area().is_finite());
        assert!(gen.log_squeeze_area().is_finite());
        let ratio = (gen.log_hat_area() - gen.log_squeeze_area()).exp();
        assert!(ratio.is_finite() && ratio >= 1.);
    }

    #[test]
    fn non_log_concave_density_rejected() {
        let distr = crate::distr::ContDistr::new(Domain::UNBOUNDED);
        let distr = {
            let mut d = distr;
            d.set_logpdf(Box::new(|x, _| -(1. + x * x).ln()));
            d.set_dlogpdf(Box::new(|x, _| -2. * x / (1. + x * x)));
            d.into_ref()
        };
        let mut params = ArsParams::new(&distr).unwrap();
        // The log-density of the Cauchy law is convex beyond |x| = 1.
        params.set_cpoints_at(&[-3., -0.5, 0.5, 3.]).unwrap();
        assert!(matches!(
            params.init(&default_urng(1)),
            Err(Error::ConditionViolated(_))
        ));
    }

    #[test]
    fn stale_generator_refuses_until_reinit() {
        let distr = test_distr::normal(0., 1.);
        let params = ArsParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(5)).unwrap();
        gen.sample().unwrap();
        distr.borrow_mut().set_params(&[2.0, 1.0]).unwrap();
        assert!(matches!(gen.sample(), Err(Error::InvalidGenerator(_))));
        gen.reinit().unwrap();
        let n = 5_000;
        let xs = gen.sample_many(n).unwrap();
        let mean = xs.iter().sum::<f64>() / n as f64;
        assert_abs_diff_eq!(mean, 2.0, epsilon = 0.1);
    }

    #[test]
    fn clone_keeps_its_own_envelope() {
        let mut gen = normal_gen(11);
        let clone = gen.clone();
        gen.sample_many(1_000).unwrap();
        assert!(gen.intervals() >= clone.intervals());
        assert_eq!(clone.intervals(), normal_gen(11).intervals());
    }

    #[test]
    fn profile_reports_envelope_quantities() {
        let gen = normal_gen(2);
        let p = gen.profile();
        assert_eq!(p.method, "ars");
        assert_eq!(p.kind, SamplingKind::InversionRejection);
        let hat = p.hat_area.unwrap();
        let squeeze = p.squeeze_area.unwrap();
        // The fixture is normalized, so the true area sits between the two.
        assert!(squeeze <= 1.0 && 1.0 <= hat);
        assert_eq!(p.intervals, Some(gen.intervals()));
        // Unnormalized area unknown, so no rejection constant.
        assert_eq!(p.rejection_constant, None);
    }

    #[test]
    fn verify_mode_passes_on_a_clean_density() {
        let distr = test_distr::normal(0., 1.);
        let mut params = ArsParams::new(&distr).unwrap();
        params.set_verify(true);
        let mut gen = params.init(&default_urng(9)).unwrap();
        for _ in 0..200 {
            assert!(gen.sample().unwrap().is_finite());
        }
    }
}
