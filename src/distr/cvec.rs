//! Continuous multivariate distribution record.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    distr::Domain,
    error::{Error, Result},
};

/// Log-density callback: `(point, parameter vector) -> value`.
pub type VecFn = Box<dyn Fn(&[f64], &[f64]) -> f64>;

/// Gradient callback: `(point, parameter vector, gradient out)`.
pub type VecGradFn = Box<dyn Fn(&[f64], &[f64], &mut [f64])>;

/// A continuous multivariate probability law given by its (unnormalized)
/// log-density and gradient.
pub struct CvecDistr {
    dim: usize,
    domains: Vec<Domain>,
    params: Vec<f64>,
    logpdf: Option<VecFn>,
    dlogpdf: Option<VecGradFn>,
    center: Vec<f64>,
    version: u64,
}

/// Shared handle to a multivariate record.
pub type CvecDistrRef = Rc<RefCell<CvecDistr>>;

impl fmt::Debug for CvecDistr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CvecDistr")
            .field("dim", &self.dim)
            .field("center", &self.center)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl CvecDistr {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::distr("dimension must be positive"));
        }
        Ok(CvecDistr {
            dim,
            domains: vec![Domain::UNBOUNDED; dim],
            params: Vec::new(),
            logpdf: None,
            dlogpdf: None,
            center: vec![0.; dim],
            version: 0,
        })
    }

    pub fn into_ref(self) -> CvecDistrRef {
        Rc::new(RefCell::new(self))
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    pub fn set_logpdf(&mut self, f: VecFn) {
        self.logpdf = Some(f);
        self.touch();
    }

    pub fn set_dlogpdf(&mut self, f: VecGradFn) {
        self.dlogpdf = Some(f);
        self.touch();
    }

    pub fn has_logpdf(&self) -> bool {
        self.logpdf.is_some()
    }

    pub fn has_dlogpdf(&self) -> bool {
        self.dlogpdf.is_some()
    }

    pub fn set_params(&mut self, params: &[f64]) -> Result<()> {
        if params.iter().any(|p| !p.is_finite()) {
            return Err(Error::distr("non-finite distribution parameter"));
        }
        self.params = params.to_vec();
        self.touch();
        Ok(())
    }

    /// Per-coordinate inclusive bounds.
    pub fn set_domains(&mut self, domains: &[Domain]) -> Result<()> {
        if domains.len() != self.dim {
            return Err(Error::distr("domain count does not match dimension"));
        }
        self.domains = domains.to_vec();
        self.touch();
        Ok(())
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn set_center(&mut self, center: &[f64]) -> Result<()> {
        if center.len() != self.dim {
            return Err(Error::distr("center length does not match dimension"));
        }
        if center.iter().any(|c| !c.is_finite()) {
            return Err(Error::distr("center must be finite"));
        }
        self.center = center.to_vec();
        Ok(())
    }

    pub fn center(&self) -> &[f64] {
        &self.center
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim
            && x.iter()
                .zip(&self.domains)
                .all(|(xi, dom)| dom.contains(*xi))
    }

    pub fn logpdf(&self, x: &[f64]) -> Result<f64> {
        match &self.logpdf {
            Some(f) => Ok(f(x, &self.params)),
            None => Err(Error::distr("logPDF required but not set")),
        }
    }

    pub fn dlogpdf(&self, x: &[f64], grad: &mut [f64]) -> Result<()> {
        match &self.dlogpdf {
            Some(f) => {
                f(x, &self.params, grad);
                Ok(())
            }
            None => Err(Error::distr("dlogPDF required but not set")),
        }
    }
}
