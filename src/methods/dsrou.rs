//! Discrete simple ratio-of-uniforms.
//!
//! Two half-rectangles anchored at the mode bound the region
//! `{(u, v) : 0 < u, u^2 <= PMF(floor(v/u) + mode)}`: the right one has
//! height `sqrt(PMF(mode))`, the left one `sqrt(PMF(mode - 1))`. Knowing
//! the CDF at the mode splits the total width asymmetrically for a tighter
//! fit; a left mass of zero (mode on the left domain edge) degenerates to
//! the right rectangle alone.

use crate::{
    distr::DiscrDistrRef,
    error::{report, Error, Result},
    generate::{DiscreteGenerator, Profile, SamplingKind},
    urng::{uniform, uniform_pos, UrngRef},
};

const MAX_TRIALS: usize = 10_000;

/// Threshold under which the left rectangle is treated as degenerate.
///
/// Deliberately a tolerance rather than an exact comparison with zero: a
/// subnormal left height would otherwise blow up the `v / ul` rescaling.
const MIN_UL: f64 = 1e-154;

/// Parameter record for the discrete ratio-of-uniforms method.
#[derive(Debug)]
pub struct DsrouParams {
    distr: DiscrDistrRef,
    cdf_at_mode: Option<f64>,
    verify: bool,
}

impl DsrouParams {
    /// Bind a distribution record. It must carry a probability mass
    /// function; mode and total mass are derived at init when not known.
    pub fn new(distr: &DiscrDistrRef) -> Result<Self> {
        if !distr.borrow().has_pmf() {
            return Err(Error::distr("PMF required for discrete ratio-of-uniforms"));
        }
        Ok(DsrouParams {
            distr: distr.clone(),
            cdf_at_mode: None,
            verify: false,
        })
    }

    /// Supply the CDF value at the mode; enables the asymmetric split.
    pub fn set_cdf_at_mode(&mut self, fmode: f64) -> Result<()> {
        if !(0. ..=1.).contains(&fmode) {
            return Err(Error::param("CDF at mode must lie in [0, 1]"));
        }
        self.cdf_at_mode = Some(fmode);
        Ok(())
    }

    /// Re-check the rectangle bound on every candidate and report
    /// violations on the diagnostic channel.
    pub fn set_verify(&mut self, verify: bool) {
        self.verify = verify;
    }

    /// Consume the record and build a generator.
    pub fn init(self, urng: &UrngRef) -> Result<DsrouGen> {
        let rect = rectangles(&self.distr, self.cdf_at_mode).map_err(report)?;
        let built_version = self.distr.borrow().version();
        Ok(DsrouGen {
            distr: self.distr,
            urng: urng.clone(),
            rect,
            cdf_at_mode: self.cdf_at_mode,
            verify: self.verify,
            valid: true,
            built_version,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Rectangles {
    mode: i64,
    left: i64,
    right: i64,
    /// Height of the left half-rectangle, `sqrt(PMF(mode - 1))`.
    ul: f64,
    /// Height of the right half-rectangle, `sqrt(PMF(mode))`.
    ur: f64,
    /// Signed widths: the pre-scaled abscissa runs over `[al, ar]`.
    al: f64,
    ar: f64,
}

fn rectangles(distr: &DiscrDistrRef, cdf_at_mode: Option<f64>) -> Result<Rectangles> {
    let (mode, sum) = {
        let mut d = distr.borrow_mut();
        let mode = match d.mode() {
            Some(m) => m,
            None => d.update_mode()?,
        };
        let sum = match d.sum() {
            Some(s) => s,
            None => d.update_sum()?,
        };
        (mode, sum)
    };
    let d = distr.borrow();
    let (left, right) = d.domain();
    let mode = mode.clamp(left, right);
    let pm = d.pmf(mode)?;
    let pbm = if mode - 1 < left { 0. } else { d.pmf(mode - 1)? };
    if !(pm > 0.) || pbm < 0. || !pm.is_finite() || !pbm.is_finite() {
        return Err(Error::distr("PMF at mode must be finite and positive"));
    }
    let ul = pbm.sqrt();
    let ur = pm.sqrt();
    let (al, ar) = if ul < MIN_UL {
        (0., sum)
    } else if let Some(fmode) = cdf_at_mode {
        let al = -(fmode * sum) + pm;
        (al, sum + al)
    } else {
        (-(sum - pm), sum)
    };
    Ok(Rectangles {
        mode,
        left,
        right,
        ul,
        ur,
        al,
        ar,
    })
}

/// Discrete ratio-of-uniforms generator.
#[derive(Clone)]
pub struct DsrouGen {
    distr: DiscrDistrRef,
    urng: UrngRef,
    rect: Rectangles,
    cdf_at_mode: Option<f64>,
    verify: bool,
    valid: bool,
    built_version: u64,
}

impl DsrouGen {
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
}

impl DiscreteGenerator for DsrouGen {
    fn sample(&mut self) -> Result<i64> {
        self.check_usable()?;
        let r = self.rect;
        for _ in 0..MAX_TRIALS {
            let mut v = r.al + uniform(&self.urng) * (r.ar - r.al);
            let height = if v < 0. { r.ul } else { r.ur };
            v /= height;
            let u = uniform_pos(&self.urng) * height;
            let k = (v / u).floor() as i64 + r.mode;
            if k < r.left || k > r.right {
                continue;
            }
            let pk = self.distr.borrow().pmf(k)?;
            if self.verify {
                let um2 = (2. + 4. * f64::EPSILON) * height * height;
                let vk = v / u * pk.max(0.).sqrt();
                let vl = if r.ul > 0. { (1. + 1e-10) * r.al / r.ul } else { 0. };
                let vr = (1. + 1e-10) * r.ar / r.ur;
                if pk > um2 || vk < vl || vk > vr {
                    let _ = report(Error::condition(
                        "PMF exceeds the bounding rectangle at sampled point",
                    ));
                }
            }
            if u * u <= pk {
                return Ok(k);
            }
        }
        Err(report(Error::exhausted("rejection loop made no progress")))
    }

    fn reinit(&mut self) -> Result<()> {
        self.valid = false;
        self.rect = rectangles(&self.distr, self.cdf_at_mode).map_err(report)?;
        self.built_version = self.distr.borrow().version();
        self.valid = true;
        Ok(())
    }

    fn profile(&self) -> Profile {
        Profile::new("dsrou", SamplingKind::Rejection)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{test_distr, urng::default_urng};

    #[test]
    fn geometric_frequencies() {
        // Mode on the left edge, so the left rectangle degenerates.
        let distr = test_distr::geometric(0.5);
        let params = DsrouParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(21)).unwrap();
        assert_eq!(gen.rect.al, 0.);
        let n = 20_000;
        let xs = gen.sample_many(n).unwrap();
        assert!(xs.iter().all(|k| *k >= 0));
        let freq0 = xs.iter().filter(|k| **k == 0).count() as f64 / n as f64;
        let freq1 = xs.iter().filter(|k| **k == 1).count() as f64 / n as f64;
        assert_abs_diff_eq!(freq0, 0.5, epsilon = 0.02);
        assert_abs_diff_eq!(freq1, 0.25, epsilon = 0.02);
    }

    #[test]
    fn poisson_sample_moments() {
        let distr = test_distr::poisson(10.0);
        let params = DsrouParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(5)).unwrap();
        let n = 20_000;
        let xs = gen.sample_many(n).unwrap();
        let mean = xs.iter().map(|k| *k as f64).sum::<f64>() / n as f64;
        assert_abs_diff_eq!(mean, 10.0, epsilon = 0.15);
    }

    #[test]
    fn probability_vector_variant() {
        let distr = crate::distr::DiscrDistr::from_pv(&[0.2, 0.5, 0.3], 7)
            .unwrap()
            .into_ref();
        let params = DsrouParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(17)).unwrap();
        let n = 20_000;
        let xs = gen.sample_many(n).unwrap();
        assert!(xs.iter().all(|k| (7..=9).contains(k)));
        let freq8 = xs.iter().filter(|k| **k == 8).count() as f64 / n as f64;
        assert_abs_diff_eq!(freq8, 0.5, epsilon = 0.02);
    }

    #[test]
    fn cdf_at_mode_shrinks_the_left_width() {
        let distr = test_distr::poisson(4.0);
        let mut params = DsrouParams::new(&distr).unwrap();
        // CDF just below the mode of Poisson(4) at k = 4.
        params.set_cdf_at_mode(0.6288).unwrap();
        let gen = params.init(&default_urng(1)).unwrap();
        assert!(gen.rect.al < 0. && gen.rect.al > -1.);
        assert!(gen.rect.ar < 1.);
    }

    #[test]
    fn stale_generator_refuses_until_reinit() {
        let distr = test_distr::geometric(0.5);
        let params = DsrouParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(3)).unwrap();
        gen.sample().unwrap();
        distr.borrow_mut().set_params(&[0.3]).unwrap();
        assert!(matches!(gen.sample(), Err(Error::InvalidGenerator(_))));
        gen.reinit().unwrap();
        let n = 10_000;
        let xs = gen.sample_many(n).unwrap();
        let freq0 = xs.iter().filter(|k| **k == 0).count() as f64 / n as f64;
        assert_abs_diff_eq!(freq0, 0.3, epsilon = 0.02);
    }

    #[test]
    fn profile_reports_no_envelope_quantities() {
        let distr = test_distr::geometric(0.4);
        let params = DsrouParams::new(&distr).unwrap();
        let gen = params.init(&default_urng(2)).unwrap();
        let p = gen.profile();
        assert_eq!(p.method, "dsrou");
        assert_eq!(p.kind, SamplingKind::Rejection);
        assert_eq!(p.hat_area, None);
        assert_eq!(p.intervals, None);
    }
}
