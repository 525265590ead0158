//! Sampling by CDF inversion.
//!
//! Every draw is accepted: a uniform is mapped through the inverse CDF,
//! supplied directly or obtained by numeric root finding on the CDF.
//! Truncating to a sub-domain costs two CDF evaluations at setup, never a
//! rebuilt envelope: the uniform is rescaled into the CDF range of the
//! sub-domain before inversion.

use crate::{
    distr::{ContDistrRef, ContEval, Domain},
    error::{report, Error, Result},
    generate::{Generator, Profile, SamplingKind},
    math::invert_monotone,
    urng::{uniform_pos, UrngRef},
};

/// Parameter record for the inversion method.
#[derive(Debug)]
pub struct CdfInvParams {
    distr: ContDistrRef,
}

impl CdfInvParams {
    /// Bind a distribution record. It must carry an inverse CDF, or a CDF
    /// for numeric inversion.
    pub fn new(distr: &ContDistrRef) -> Result<Self> {
        {
            let d = distr.borrow();
            if !d.has(ContEval::InvCdf) && !d.has(ContEval::Cdf) {
                return Err(Error::distr("CDF or inverse CDF required for inversion"));
            }
        }
        Ok(CdfInvParams {
            distr: distr.clone(),
        })
    }

    /// Consume the record and build a generator.
    pub fn init(self, urng: &UrngRef) -> Result<CdfInvGen> {
        let bounds = cdf_bounds(&self.distr).map_err(report)?;
        let built_version = self.distr.borrow().version();
        Ok(CdfInvGen {
            distr: self.distr,
            urng: urng.clone(),
            bounds,
            valid: true,
            built_version,
        })
    }
}

/// CDF values at the domain ends; the truncation state of the generator.
#[derive(Debug, Clone, Copy)]
struct CdfBounds {
    domain: Domain,
    fl: f64,
    fr: f64,
}

fn cdf_bounds(distr: &ContDistrRef) -> Result<CdfBounds> {
    let d = distr.borrow();
    let domain = d.domain();
    let exact = d.has(ContEval::InvCdf) && !d.has(ContEval::Cdf);
    let (fl, fr) = if exact {
        // Inverse CDF only: the domain cannot be truncated numerically.
        if domain.is_bounded() {
            return Err(Error::distr(
                "CDF required to truncate an inverse-CDF distribution",
            ));
        }
        (0., 1.)
    } else {
        let fl = if domain.left() == f64::NEG_INFINITY {
            0.
        } else {
            d.cdf(domain.left())?
        };
        let fr = if domain.right() == f64::INFINITY {
            1.
        } else {
            d.cdf(domain.right())?
        };
        (fl, fr)
    };
    if !(fl.is_finite() && fr.is_finite() && fr > fl) {
        return Err(Error::distr(
            "CDF range over the domain is empty or not finite",
        ));
    }
    Ok(CdfBounds { domain, fl, fr })
}

/// Inversion generator.
#[derive(Clone)]
pub struct CdfInvGen {
    distr: ContDistrRef,
    urng: UrngRef,
    bounds: CdfBounds,
    valid: bool,
    built_version: u64,
}

impl CdfInvGen {
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

    fn invert(&self, u: f64) -> Result<f64> {
        let b = self.bounds;
        let target = b.fl + u * (b.fr - b.fl);
        let d = self.distr.borrow();
        let x = if d.has(ContEval::InvCdf) {
            d.evaluate(ContEval::InvCdf, target)?
        } else {
            let pdf = |x: f64| d.pdf(x).unwrap_or(f64::NAN);
            let deriv: Option<&dyn Fn(f64) -> f64> = if d.has(ContEval::Pdf) {
                Some(&pdf)
            } else {
                None
            };
            invert_monotone(
                |x| d.cdf(x).unwrap_or(f64::NAN),
                deriv,
                target,
                (b.domain.left(), b.domain.right()),
                d.center(),
            )?
        };
        if x.is_finite() || u == 0. || u == 1. {
            Ok(x.clamp(b.domain.left(), b.domain.right()))
        } else {
            Err(Error::numeric("inverse CDF produced a non-finite value"))
        }
    }
}

impl Generator for CdfInvGen {
    fn sample(&mut self) -> Result<f64> {
        self.check_usable()?;
        // Open interval: u = 0 would map a left-unbounded law to -inf.
        // The closed ends stay reachable through `quantile`.
        let u = uniform_pos(&self.urng);
        self.invert(u).map_err(report)
    }

    /// Recompute the two CDF values at the domain ends; this is all a
    /// domain change (truncation) needs.
    fn reinit(&mut self) -> Result<()> {
        self.valid = false;
        self.bounds = cdf_bounds(&self.distr).map_err(report)?;
        self.built_version = self.distr.borrow().version();
        self.valid = true;
        Ok(())
    }

    fn profile(&self) -> Profile {
        Profile::new("cdfinv", SamplingKind::Inversion)
    }

    fn supports_quantile(&self) -> bool {
        true
    }

    /// Quantile of the (possibly truncated) law.
    fn quantile(&mut self, u: f64) -> Result<f64> {
        self.check_usable()?;
        if !(0. ..=1.).contains(&u) {
            return Err(report(Error::param("quantile argument outside [0, 1]")));
        }
        self.invert(u).map_err(report)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use approx::assert_abs_diff_eq;
    use rand::RngCore;

    use super::*;
    use crate::{
        test_distr,
        urng::{default_urng, DefaultSource, UniformSource},
    };

    #[test]
    fn exponential_by_exact_inversion() {
        let distr = test_distr::expo(2.0);
        let params = CdfInvParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(6)).unwrap();
        let n = 20_000;
        let xs = gen.sample_many(n).unwrap();
        assert!(xs.iter().all(|x| *x >= 0.));
        let mean = xs.iter().sum::<f64>() / n as f64;
        assert_abs_diff_eq!(mean, 0.5, epsilon = 0.02);
    }

    #[test]
    fn quantile_matches_closed_form() {
        let distr = test_distr::expo(1.0);
        let params = CdfInvParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(1)).unwrap();
        assert!(gen.supports_quantile());
        for u in [0.1, 0.5, 0.9] {
            let expected = -(1f64 - u).ln();
            assert_abs_diff_eq!(gen.quantile(u).unwrap(), expected, epsilon = 1e-9);
        }
        assert!(gen.quantile(1.5).is_err());
    }

    #[test]
    fn numeric_inversion_without_inverse_cdf() {
        let mut d = crate::distr::ContDistr::new(Domain::new(0., f64::INFINITY).unwrap());
        d.set_pdf(Box::new(|x, _| (-x).exp()));
        d.set_cdf(Box::new(|x, _| 1. - (-x).exp()));
        let distr = d.into_ref();
        let params = CdfInvParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(9)).unwrap();
        for u in [0.05, 0.4, 0.95] {
            let expected = -(1f64 - u).ln();
            assert_abs_diff_eq!(gen.quantile(u).unwrap(), expected, epsilon = 1e-7);
        }
    }

    #[test]
    fn truncation_costs_two_cdf_evaluations() {
        let distr = test_distr::expo(1.0);
        let params = CdfInvParams::new(&distr).unwrap();
        let mut gen = params.init(&default_urng(4)).unwrap();
        // Truncate to [1, 3] and reinit; draws must stay inside.
        distr
            .borrow_mut()
            .set_domain(Domain::new(1., 3.).unwrap())
            .unwrap();
        assert!(matches!(gen.sample(), Err(Error::InvalidGenerator(_))));
        gen.reinit().unwrap();
        let e = std::f64::consts::E;
        assert_abs_diff_eq!(gen.bounds.fl, 1. - 1. / e, epsilon = 1e-12);
        let xs = gen.sample_many(5_000).unwrap();
        assert!(xs.iter().all(|x| (1.0..=3.0).contains(x)));
        // Median of the truncated law.
        let med = gen.quantile(0.5).unwrap();
        let expected = -(1. - (gen.bounds.fl + 0.5 * (gen.bounds.fr - gen.bounds.fl))).ln();
        assert_abs_diff_eq!(med, expected, epsilon = 1e-9);
    }

    /// Source whose first draw is exactly zero, then a ChaCha stream.
    struct ZeroFirst {
        fired: bool,
        rest: DefaultSource,
    }

    impl RngCore for ZeroFirst {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            if self.fired {
                self.rest.next_u64()
            } else {
                self.fired = true;
                0
            }
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.rest.fill_bytes(dest)
        }
    }

    impl UniformSource for ZeroFirst {
        fn reset(&mut self) {
            self.fired = false;
            self.rest.reset();
        }
    }

    #[test]
    fn zero_uniform_never_escapes_sample() {
        // Logistic law: the inverse CDF sends 0 to negative infinity.
        let mut d = crate::distr::ContDistr::new(Domain::UNBOUNDED);
        d.set_cdf(Box::new(|x, _| 1. / (1. + (-x).exp())));
        d.set_invcdf(Box::new(|u, _| (u / (1. - u)).ln()));
        let distr = d.into_ref();
        let params = CdfInvParams::new(&distr).unwrap();
        let urng: UrngRef = Rc::new(RefCell::new(ZeroFirst {
            fired: false,
            rest: DefaultSource::new(11),
        }));
        let mut gen = params.init(&urng).unwrap();
        assert!(gen.sample().unwrap().is_finite());
        // The closed end stays reachable by explicit quantile.
        assert_eq!(gen.quantile(0.).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn missing_cdf_rejected() {
        let distr = test_distr::normal(0., 1.);
        assert!(matches!(
            CdfInvParams::new(&distr),
            Err(Error::InvalidDistribution(_))
        ));
    }

    #[test]
    fn profile_reports_inversion() {
        let distr = test_distr::expo(1.0);
        let gen = CdfInvParams::new(&distr)
            .unwrap()
            .init(&default_urng(2))
            .unwrap();
        let p = gen.profile();
        assert_eq!(p.method, "cdfinv");
        assert_eq!(p.kind, SamplingKind::Inversion);
        assert_eq!(p.rejection_constant, None);
    }
}
