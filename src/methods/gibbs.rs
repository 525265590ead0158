//! Gibbs sampler for continuous multivariate laws.
//!
//! A Markov chain over the domain of a log-concave multivariate density.
//! Each step restricts the density to a line through the current state,
//! along a coordinate axis (cycled) or a random isotropic direction, and
//! draws the next position on that line with an embedded adaptive
//! rejection sampler. The conditional law changes on every step, so the
//! embedded sampler is re-set-up each time via its reinit path.
//!
//! State survives across calls: consecutive draws are dependent by
//! construction. The generator owns its conditional view and embedded
//! sampler outright; there is no sharing with the caller.

use crate::{
    distr::{CondiDistr, CvecDistrRef},
    error::{report, Error, Result},
    generate::{Generator, Profile, SamplingKind, VectorGenerator},
    math::normalize,
    methods::ars::{ArsGen, ArsParams},
    urng::{standard_normal, UrngRef},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GibbsVariant {
    /// Cycle through the coordinate axes (the original Gibbs sampler).
    Coordinate,
    /// Draw a fresh isotropic direction each step.
    RandomDirection,
}

/// Parameter record for the Gibbs method.
#[derive(Debug)]
pub struct GibbsParams {
    cvec: CvecDistrRef,
    variant: GibbsVariant,
    thinning: usize,
    burnin: usize,
    start: Option<Vec<f64>>,
}

impl GibbsParams {
    /// Bind a multivariate record. It must carry a log-density and its
    /// gradient.
    pub fn new(cvec: &CvecDistrRef) -> Result<Self> {
        {
            let cv = cvec.borrow();
            if !cv.has_logpdf() || !cv.has_dlogpdf() {
                return Err(Error::distr(
                    "logPDF and dlogPDF required for Gibbs sampling",
                ));
            }
        }
        Ok(GibbsParams {
            cvec: cvec.clone(),
            variant: GibbsVariant::Coordinate,
            thinning: 1,
            burnin: 0,
            start: None,
        })
    }

    pub fn set_variant(&mut self, variant: GibbsVariant) {
        self.variant = variant;
    }

    /// Chain steps per returned vector (default 1).
    pub fn set_thinning(&mut self, thinning: usize) -> Result<()> {
        if thinning < 1 {
            return Err(Error::param("thinning must be at least 1"));
        }
        self.thinning = thinning;
        Ok(())
    }

    /// Steps run and discarded at init (default 0).
    pub fn set_burnin(&mut self, burnin: usize) {
        self.burnin = burnin;
    }

    /// Starting state (default: the record's center).
    pub fn set_start(&mut self, start: &[f64]) -> Result<()> {
        if start.iter().any(|x| !x.is_finite()) {
            return Err(Error::param("starting state must be finite"));
        }
        if start.len() != self.cvec.borrow().dim() {
            return Err(Error::param("starting state has wrong dimension"));
        }
        self.start = Some(start.to_vec());
        Ok(())
    }

    /// Consume the record and build a generator. Burn-in runs here; a
    /// chain that leaves the support during burn-in aborts construction.
    pub fn init(self, urng: &UrngRef) -> Result<GibbsGen> {
        let dim = self.cvec.borrow().dim();
        let start = match self.start {
            Some(s) => s,
            None => self.cvec.borrow().center().to_vec(),
        };
        {
            let cv = self.cvec.borrow();
            if !cv.contains(&start) {
                return Err(report(Error::condition("starting state outside domain")));
            }
            if !cv.logpdf(&start)?.is_finite() {
                return Err(report(Error::condition(
                    "density vanishes at the starting state",
                )));
            }
        }

        let mut gen = GibbsGen::build(
            self.cvec,
            urng,
            self.variant,
            self.thinning,
            start,
            dim,
        )?;

        for _ in 0..self.burnin {
            gen.step()?;
            if gen.state.iter().any(|x| !x.is_finite()) {
                return Err(report(Error::numeric(
                    "chain left the support during burn-in",
                )));
            }
        }
        Ok(gen)
    }
}

/// Gibbs chain generator.
pub struct GibbsGen {
    cvec: CvecDistrRef,
    urng: UrngRef,
    condi: CondiDistr,
    inner: ArsGen,
    variant: GibbsVariant,
    thinning: usize,
    state: Vec<f64>,
    start: Vec<f64>,
    /// Coordinate updated by the previous step.
    coord: usize,
    dim: usize,
    built_version: u64,
}

impl GibbsGen {
    fn build(
        cvec: CvecDistrRef,
        urng: &UrngRef,
        variant: GibbsVariant,
        thinning: usize,
        start: Vec<f64>,
        dim: usize,
    ) -> Result<GibbsGen> {
        let condi = CondiDistr::new(cvec.clone())?;
        match variant {
            GibbsVariant::Coordinate => condi.set_coordinate(&start, 0)?,
            GibbsVariant::RandomDirection => {
                let dir = random_unit_vector(urng, dim);
                condi.set_direction(&start, &dir)?;
            }
        }
        let inner = ArsParams::new(&condi.distr())?.init(urng).map_err(|_| {
            report(Error::condition(
                "cannot build sampler for the conditional distribution",
            ))
        })?;
        let built_version = cvec.borrow().version();
        Ok(GibbsGen {
            cvec,
            urng: urng.clone(),
            condi,
            inner,
            variant,
            thinning,
            state: start.clone(),
            start,
            coord: dim - 1,
            dim,
            built_version,
        })
    }

    /// Advance the chain by one step.
    fn step(&mut self) -> Result<()> {
        match self.variant {
            GibbsVariant::Coordinate => {
                self.coord = (self.coord + 1) % self.dim;
                if !self.state[self.coord].is_finite() {
                    return Ok(());
                }
                self.condi.set_coordinate(&self.state, self.coord)?;
                self.inner.reinit()?;
                let x = self.inner.sample()?;
                self.state[self.coord] = x;
            }
            GibbsVariant::RandomDirection => {
                if !self.state[0].is_finite() {
                    return Ok(());
                }
                let dir = random_unit_vector(&self.urng, self.dim);
                self.condi.set_direction(&self.state, &dir)?;
                self.inner.reinit()?;
                let t = self.inner.sample()?;
                for (s, d) in self.state.iter_mut().zip(&dir) {
                    *s += t * d;
                }
            }
        }
        Ok(())
    }

    /// Current chain state.
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Overwrite the chain state.
    pub fn set_state(&mut self, state: &[f64]) -> Result<()> {
        if state.len() != self.dim {
            return Err(Error::param("state has wrong dimension"));
        }
        if state.iter().any(|x| !x.is_finite()) {
            return Err(Error::param("state must be finite"));
        }
        self.state.copy_from_slice(state);
        Ok(())
    }

    /// Restore the starting state of the chain.
    pub fn reset_state(&mut self) {
        self.state.copy_from_slice(&self.start);
    }

    /// Deep copy with an independent conditional view and embedded
    /// sampler; the clone continues from the same state but evolves on
    /// its own.
    pub fn try_clone(&self) -> Result<GibbsGen> {
        let mut clone = GibbsGen::build(
            self.cvec.clone(),
            &self.urng,
            self.variant,
            self.thinning,
            self.state.clone(),
            self.dim,
        )?;
        clone.start.copy_from_slice(&self.start);
        clone.coord = self.coord;
        Ok(clone)
    }
}

impl VectorGenerator for GibbsGen {
    fn dim(&self) -> usize {
        self.dim
    }

    fn sample_into(&mut self, out: &mut [f64]) -> Result<()> {
        if out.len() != self.dim {
            return Err(report(Error::param("output buffer has wrong dimension")));
        }
        if self.cvec.borrow().version() != self.built_version {
            return Err(report(Error::generator(
                "distribution changed since setup; the chain is invalid",
            )));
        }
        for _ in 0..self.thinning {
            self.step()?;
        }
        out.copy_from_slice(&self.state);
        Ok(())
    }

    /// The chain cannot be re-set-up in place; build a fresh generator
    /// instead.
    fn reinit(&mut self) -> Result<()> {
        Err(report(Error::generator(
            "reinit not supported for Markov chain samplers",
        )))
    }
}

impl GibbsGen {
    pub fn profile(&self) -> Profile {
        Profile::new("gibbs", SamplingKind::InversionRejection)
    }
}

/// Isotropic unit vector from independent standard normal draws.
fn random_unit_vector(urng: &UrngRef, dim: usize) -> Vec<f64> {
    loop {
        let mut dir: Vec<f64> = (0..dim).map(|_| standard_normal(urng)).collect();
        let norm = normalize(&mut dir);
        if norm > 0. && dir[0].is_finite() {
            return dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{test_distr, urng::default_urng};

    fn moments(xs: &[Vec<f64>], k: usize) -> (f64, f64) {
        let n = xs.len() as f64;
        let mean = xs.iter().map(|v| v[k]).sum::<f64>() / n;
        let var = xs.iter().map(|v| (v[k] - mean).powi(2)).sum::<f64>() / n;
        (mean, var)
    }

    #[test]
    fn coordinate_chain_recovers_correlated_normal() {
        let cvec = test_distr::bivariate_normal(0.5);
        let mut params = GibbsParams::new(&cvec).unwrap();
        params.set_burnin(200);
        params.set_thinning(2).unwrap();
        let mut gen = params.init(&default_urng(31)).unwrap();
        let n = 4_000;
        let xs: Vec<Vec<f64>> = (0..n).map(|_| gen.sample_vec().unwrap()).collect();
        let (m0, v0) = moments(&xs, 0);
        let (m1, v1) = moments(&xs, 1);
        let cov = xs
            .iter()
            .map(|v| (v[0] - m0) * (v[1] - m1))
            .sum::<f64>()
            / n as f64;
        assert_abs_diff_eq!(m0, 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(m1, 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(v0, 1.0, epsilon = 0.15);
        assert_abs_diff_eq!(v1, 1.0, epsilon = 0.15);
        assert_abs_diff_eq!(cov / (v0 * v1).sqrt(), 0.5, epsilon = 0.1);
    }

    #[test]
    fn random_direction_chain_recovers_the_mean() {
        let cvec = test_distr::bivariate_normal(0.0);
        let mut params = GibbsParams::new(&cvec).unwrap();
        params.set_variant(GibbsVariant::RandomDirection);
        params.set_burnin(100);
        let mut gen = params.init(&default_urng(12)).unwrap();
        let n = 4_000;
        let xs: Vec<Vec<f64>> = (0..n).map(|_| gen.sample_vec().unwrap()).collect();
        let (m0, v0) = moments(&xs, 0);
        assert_abs_diff_eq!(m0, 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(v0, 1.0, epsilon = 0.15);
    }

    #[test]
    fn consecutive_draws_are_dependent_state() {
        let cvec = test_distr::bivariate_normal(0.0);
        let params = GibbsParams::new(&cvec).unwrap();
        let mut gen = params.init(&default_urng(3)).unwrap();
        let a = gen.sample_vec().unwrap();
        assert_eq!(gen.state(), a.as_slice());
        let b = gen.sample_vec().unwrap();
        assert_ne!(a, b);
        // The second step updates coordinate 1 only, so 0 carries over.
        assert_eq!(a[0], b[0]);
    }

    #[test]
    fn clone_evolves_independently() {
        let cvec = test_distr::bivariate_normal(0.0);
        let params = GibbsParams::new(&cvec).unwrap();
        let mut gen = params.init(&default_urng(8)).unwrap();
        gen.sample_vec().unwrap();
        let clone = gen.try_clone().unwrap();
        let before = clone.state().to_vec();
        gen.sample_vec().unwrap();
        assert_eq!(clone.state(), before.as_slice());
    }

    #[test]
    fn option_validation() {
        let cvec = test_distr::bivariate_normal(0.0);
        let mut params = GibbsParams::new(&cvec).unwrap();
        assert!(params.set_thinning(0).is_err());
        assert!(params.set_start(&[0.]).is_err());
        assert!(params.set_start(&[f64::NAN, 0.]).is_err());
        assert!(params.set_start(&[0.5, -0.5]).is_ok());
    }

    #[test]
    fn reinit_is_refused() {
        let cvec = test_distr::bivariate_normal(0.0);
        let params = GibbsParams::new(&cvec).unwrap();
        let mut gen = params.init(&default_urng(5)).unwrap();
        assert!(matches!(gen.reinit(), Err(Error::InvalidGenerator(_))));
    }

    #[test]
    fn mutated_record_invalidates_the_chain() {
        let cvec = test_distr::bivariate_normal(0.0);
        let params = GibbsParams::new(&cvec).unwrap();
        let mut gen = params.init(&default_urng(6)).unwrap();
        gen.sample_vec().unwrap();
        cvec.borrow_mut().set_params(&[0.2]).unwrap();
        let mut out = [0.; 2];
        assert!(matches!(
            gen.sample_into(&mut out),
            Err(Error::InvalidGenerator(_))
        ));
    }
}
