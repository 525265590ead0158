//! Simple ratio-of-uniforms for unimodal densities.
//!
//! Uniform points are drawn from the minimal bounding rectangle of the
//! region `{(u, v) : 0 < u <= sqrt(PDF(v/u + mode))}` and accepted when
//! they fall inside it. Knowing only mode and area gives a rejection
//! constant of 4; supplying the CDF value at the mode splits the rectangle
//! asymmetrically and halves the constant to 2.

use crate::{
    distr::{ContDistrRef, ContEval, Domain},
    error::{report, Error, Result},
    generate::{Generator, Profile, SamplingKind},
    urng::{uniform, uniform_pos, UrngRef},
};

const MAX_TRIALS: usize = 10_000;

/// Parameter record for the simple ratio-of-uniforms method.
#[derive(Debug)]
pub struct SrouParams {
    distr: ContDistrRef,
    cdf_at_mode: Option<f64>,
    verify: bool,
}

impl SrouParams {
    /// Bind a distribution record. It must carry a density; mode and area
    /// are derived at init when not already known.
    pub fn new(distr: &ContDistrRef) -> Result<Self> {
        if !distr.borrow().has(ContEval::Pdf) {
            return Err(Error::distr("PDF required for ratio-of-uniforms"));
        }
        Ok(SrouParams {
            distr: distr.clone(),
            cdf_at_mode: None,
            verify: false,
        })
    }

    /// Supply the CDF value at the mode; enables the asymmetric rectangle.
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
    pub fn init(self, urng: &UrngRef) -> Result<SrouGen> {
        let rect = rectangle(&self.distr, self.cdf_at_mode).map_err(report)?;
        let built_version = self.distr.borrow().version();
        Ok(SrouGen {
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
struct Rectangle {
    mode: f64,
    um: f64,
    vl: f64,
    vr: f64,
    domain: Domain,
}

/// Compute the bounding rectangle, deriving mode and area on demand.
fn rectangle(distr: &ContDistrRef, cdf_at_mode: Option<f64>) -> Result<Rectangle> {
    let (mode, area) = {
        let mut d = distr.borrow_mut();
        let mode = match d.mode() {
            Some(m) => m,
            None => d.update_mode()?,
        };
        let area = match d.area() {
            Some(a) => a,
            None => d.update_area()?,
        };
        (mode, area)
    };
    let d = distr.borrow();
    let fm = d.pdf(mode)?;
    if !(fm.is_finite() && fm > 0.) {
        return Err(Error::distr("PDF at mode must be finite and positive"));
    }
    let um = fm.sqrt();
    let (vl, vr) = match cdf_at_mode {
        Some(fmode) => {
            let vl = -fmode * area / um;
            (vl, area / um + vl)
        }
        None => (-area / um, area / um),
    };
    Ok(Rectangle {
        mode,
        um,
        vl,
        vr,
        domain: d.domain(),
    })
}

/// Simple ratio-of-uniforms generator.
#[derive(Clone)]
pub struct SrouGen {
    distr: ContDistrRef,
    urng: UrngRef,
    rect: Rectangle,
    cdf_at_mode: Option<f64>,
    verify: bool,
    valid: bool,
    built_version: u64,
}

impl SrouGen {
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

impl Generator for SrouGen {
    fn sample(&mut self) -> Result<f64> {
        self.check_usable()?;
        let r = self.rect;
        for _ in 0..MAX_TRIALS {
            let u = r.um * uniform_pos(&self.urng);
            let v = r.vl + uniform(&self.urng) * (r.vr - r.vl);
            let x = v / u + r.mode;
            if !r.domain.contains(x) {
                continue;
            }
            let fx = self.distr.borrow().pdf(x)?;
            if self.verify {
                let slack = 1e-10 * r.um * r.um;
                let sfx = fx.max(0.).sqrt();
                let vx = sfx * (x - r.mode);
                if fx > r.um * r.um + slack || vx < r.vl - slack || vx > r.vr + slack {
                    let _ = report(Error::condition(
                        "PDF exceeds the bounding rectangle at sampled point",
                    ));
                }
            }
            if u * u <= fx {
                return Ok(x);
            }
        }
        Err(report(Error::exhausted("rejection loop made no progress")))
    }

    fn reinit(&mut self) -> Result<()> {
        self.valid = false;
        self.rect = rectangle(&self.distr, self.cdf_at_mode).map_err(report)?;
        self.built_version = self.distr.borrow().version();
        self.valid = true;
        Ok(())
    }

    fn profile(&self) -> Profile {
        let mut p = Profile::new("srou", SamplingKind::Rejection);
        let r = self.rect;
        p.hat_area = Some(2. * (r.vr - r.vl) * r.um);
        p.rejection_constant = Some(if self.cdf_at_mode.is_some() { 2. } else { 4. });
        p
    }
}
