//! Continuous univariate distribution record.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    distr::Domain,
    error::{Error, Result},
    math,
};

/// Evaluator callback: `(point, parameter vector) -> value`.
pub type EvalFn = Box<dyn Fn(f64, &[f64]) -> f64>;

/// The evaluators a continuous record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContEval {
    Pdf,
    LogPdf,
    DPdf,
    DLogPdf,
    Cdf,
    LogCdf,
    InvCdf,
    Hazard,
}

/// A continuous univariate probability law.
///
/// Carries a domain, an evaluator set and derived properties, each of which
/// is either known (`Some`) or unknown (`None`). Callers marking a property
/// known are trusted to supply the value an `update_*` recomputation would
/// produce.
#[derive(Default)]
pub struct ContDistr {
    domain: Domain,
    params: Vec<f64>,
    pdf: Option<EvalFn>,
    logpdf: Option<EvalFn>,
    dpdf: Option<EvalFn>,
    dlogpdf: Option<EvalFn>,
    cdf: Option<EvalFn>,
    logcdf: Option<EvalFn>,
    invcdf: Option<EvalFn>,
    hazard: Option<EvalFn>,
    mode: Option<f64>,
    area: Option<f64>,
    center: Option<f64>,
    lognorm: Option<f64>,
    version: u64,
}

/// Shared handle to a continuous record.
pub type ContDistrRef = Rc<RefCell<ContDistr>>;

impl fmt::Debug for ContDistr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContDistr")
            .field("domain", &self.domain)
            .field("params", &self.params)
            .field("mode", &self.mode)
            .field("area", &self.area)
            .field("center", &self.center)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl ContDistr {
    pub fn new(domain: Domain) -> Self {
        ContDistr {
            domain,
            ..Default::default()
        }
    }

    pub fn into_ref(self) -> ContDistrRef {
        Rc::new(RefCell::new(self))
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Version counter; bumped on every mutation of the law itself.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Replace the parameter vector. Invalidates derived properties.
    pub fn set_params(&mut self, params: &[f64]) -> Result<()> {
        if params.iter().any(|p| !p.is_finite()) {
            return Err(Error::distr("non-finite distribution parameter"));
        }
        self.params = params.to_vec();
        self.mode = None;
        self.area = None;
        self.lognorm = None;
        self.touch();
        Ok(())
    }

    /// Replace the domain. Invalidates the area; mode and center are clamped.
    pub fn set_domain(&mut self, domain: Domain) -> Result<()> {
        self.domain = domain;
        self.area = None;
        self.mode = self
            .mode
            .map(|m| m.clamp(domain.left(), domain.right()));
        self.center = self
            .center
            .map(|c| c.clamp(domain.left(), domain.right()));
        self.touch();
        Ok(())
    }

    pub fn set_pdf(&mut self, f: EvalFn) {
        self.pdf = Some(f);
        self.touch();
    }

    pub fn set_logpdf(&mut self, f: EvalFn) {
        self.logpdf = Some(f);
        self.touch();
    }

    pub fn set_dpdf(&mut self, f: EvalFn) {
        self.dpdf = Some(f);
        self.touch();
    }

    pub fn set_dlogpdf(&mut self, f: EvalFn) {
        self.dlogpdf = Some(f);
        self.touch();
    }

    pub fn set_cdf(&mut self, f: EvalFn) {
        self.cdf = Some(f);
        self.touch();
    }

    pub fn set_logcdf(&mut self, f: EvalFn) {
        self.logcdf = Some(f);
        self.touch();
    }

    pub fn set_invcdf(&mut self, f: EvalFn) {
        self.invcdf = Some(f);
        self.touch();
    }

    pub fn set_hazard(&mut self, f: EvalFn) {
        self.hazard = Some(f);
        self.touch();
    }

    pub fn has(&self, which: ContEval) -> bool {
        match which {
            ContEval::Pdf => self.pdf.is_some() || self.logpdf.is_some(),
            ContEval::LogPdf => self.logpdf.is_some() || self.pdf.is_some(),
            ContEval::DPdf => self.dpdf.is_some(),
            ContEval::DLogPdf => {
                self.dlogpdf.is_some() || (self.dpdf.is_some() && self.has(ContEval::Pdf))
            }
            ContEval::Cdf => self.cdf.is_some() || self.logcdf.is_some(),
            ContEval::LogCdf => self.logcdf.is_some() || self.cdf.is_some(),
            ContEval::InvCdf => self.invcdf.is_some(),
            ContEval::Hazard => self.hazard.is_some(),
        }
    }

    /// Dispatch to an installed evaluator, deriving from a related one where
    /// a derivation path exists (`pdf` from `exp(logpdf)` and so on).
    pub fn evaluate(&self, which: ContEval, x: f64) -> Result<f64> {
        match which {
            ContEval::Pdf => self.pdf(x),
            ContEval::LogPdf => self.logpdf(x),
            ContEval::DPdf => match &self.dpdf {
                Some(f) => Ok(f(x, &self.params)),
                None => Err(Error::distr("dPDF required but not set")),
            },
            ContEval::DLogPdf => self.dlogpdf(x),
            ContEval::Cdf => self.cdf(x),
            ContEval::LogCdf => self.logcdf(x),
            ContEval::InvCdf => match &self.invcdf {
                Some(f) => Ok(f(x, &self.params)),
                None => Err(Error::distr("inverse CDF required but not set")),
            },
            ContEval::Hazard => match &self.hazard {
                Some(f) => Ok(f(x, &self.params)),
                None => Err(Error::distr("hazard rate required but not set")),
            },
        }
    }

    pub fn pdf(&self, x: f64) -> Result<f64> {
        if let Some(f) = &self.pdf {
            Ok(f(x, &self.params))
        } else if let Some(f) = &self.logpdf {
            Ok(f(x, &self.params).exp())
        } else {
            Err(Error::distr("PDF required but not set"))
        }
    }

    pub fn logpdf(&self, x: f64) -> Result<f64> {
        if let Some(f) = &self.logpdf {
            Ok(f(x, &self.params))
        } else if let Some(f) = &self.pdf {
            Ok(f(x, &self.params).ln())
        } else {
            Err(Error::distr("logPDF required but not set"))
        }
    }

    pub fn dlogpdf(&self, x: f64) -> Result<f64> {
        if let Some(f) = &self.dlogpdf {
            Ok(f(x, &self.params))
        } else if let (Some(df), Some(_)) = (&self.dpdf, &self.pdf) {
            let fx = self.pdf(x)?;
            if fx > 0. {
                Ok(df(x, &self.params) / fx)
            } else {
                Ok(f64::NEG_INFINITY)
            }
        } else {
            Err(Error::distr("dlogPDF required but not set"))
        }
    }

    pub fn cdf(&self, x: f64) -> Result<f64> {
        if let Some(f) = &self.cdf {
            Ok(f(x, &self.params))
        } else if let Some(f) = &self.logcdf {
            Ok(f(x, &self.params).exp())
        } else {
            Err(Error::distr("CDF required but not set"))
        }
    }

    pub fn logcdf(&self, x: f64) -> Result<f64> {
        if let Some(f) = &self.logcdf {
            Ok(f(x, &self.params))
        } else if let Some(f) = &self.cdf {
            Ok(f(x, &self.params).ln())
        } else {
            Err(Error::distr("logCDF required but not set"))
        }
    }

    pub fn mode(&self) -> Option<f64> {
        self.mode
    }

    pub fn area(&self) -> Option<f64> {
        self.area
    }

    pub fn lognorm(&self) -> Option<f64> {
        self.lognorm
    }

    /// Resolved center: explicit center, else mode, else a domain fallback.
    pub fn center(&self) -> f64 {
        self.center
            .or(self.mode)
            .unwrap_or_else(|| self.domain.fallback_center())
    }

    /// Mark the mode known. Trusted to be correct; not a mutation of the law.
    pub fn set_mode(&mut self, mode: f64) -> Result<()> {
        if !self.domain.contains(mode) {
            return Err(Error::distr("mode outside domain"));
        }
        self.mode = Some(mode);
        Ok(())
    }

    pub fn set_area(&mut self, area: f64) -> Result<()> {
        if !(area.is_finite() && area > 0.) {
            return Err(Error::distr("PDF area must be finite and positive"));
        }
        self.area = Some(area);
        Ok(())
    }

    pub fn set_center(&mut self, center: f64) -> Result<()> {
        if !center.is_finite() {
            return Err(Error::distr("center must be finite"));
        }
        self.center = Some(center.clamp(self.domain.left(), self.domain.right()));
        Ok(())
    }

    pub fn set_lognorm(&mut self, lognorm: f64) -> Result<()> {
        if lognorm.is_nan() {
            return Err(Error::distr("log-normalization constant is NaN"));
        }
        self.lognorm = Some(lognorm);
        Ok(())
    }

    /// Derive the mode by numerically maximizing the density.
    pub fn update_mode(&mut self) -> Result<f64> {
        if !self.has(ContEval::Pdf) {
            return Err(Error::distr("cannot derive mode: no PDF"));
        }
        let mode = {
            let center = self.center();
            let domain = (self.domain.left(), self.domain.right());
            math::find_maximum(|x| self.pdf(x).unwrap_or(f64::NAN), center, domain)?
        };
        self.mode = Some(mode);
        Ok(mode)
    }

    /// Derive the normalizing area by numerical integration of the density.
    pub fn update_area(&mut self) -> Result<f64> {
        if !self.has(ContEval::Pdf) {
            return Err(Error::distr("cannot derive area: no PDF"));
        }
        let area = math::integrate(
            |x| self.pdf(x).unwrap_or(0.),
            self.domain.left(),
            self.domain.right(),
        )?;
        if !(area > 0.) {
            return Err(Error::distr("derived PDF area is not positive"));
        }
        self.area = Some(area);
        Ok(area)
    }

    /// Derive a usable center point and mark it known.
    pub fn update_center(&mut self) -> Result<f64> {
        let center = self.center();
        self.center = Some(center);
        Ok(center)
    }
}
