//! Generator behavior and read-only diagnostics.
//!
//! Method parameter records are builder values consumed by `init`, so a
//! record cannot be reused after it produced a generator. A generator that
//! failed `reinit`, or whose distribution record was mutated underneath it,
//! refuses every subsequent draw with [`Error::InvalidGenerator`] instead of
//! returning garbage; releasing a generator is plain drop.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::error::{report, Error, Result};

/// How a method turns uniforms into variates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingKind {
    Rejection,
    Inversion,
    InversionRejection,
}

impl fmt::Display for SamplingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SamplingKind::Rejection => "rejection",
            SamplingKind::Inversion => "inversion",
            SamplingKind::InversionRejection => "inversion+rejection",
        };
        f.write_str(name)
    }
}

/// Read-only diagnostic snapshot of a generator.
///
/// Quantities a method does not define are reported as `None`, never as
/// zero.
#[derive(Debug, Clone)]
pub struct Profile {
    pub method: &'static str,
    pub kind: SamplingKind,
    pub rejection_constant: Option<f64>,
    pub hat_area: Option<f64>,
    pub squeeze_area: Option<f64>,
    pub intervals: Option<usize>,
}

impl Profile {
    pub(crate) fn new(method: &'static str, kind: SamplingKind) -> Self {
        Profile {
            method,
            kind,
            rejection_constant: None,
            hat_area: None,
            squeeze_area: None,
            intervals: None,
        }
    }
}

/// A live univariate sampler.
pub trait Generator {
    /// Draw one variate.
    fn sample(&mut self) -> Result<f64>;

    /// Re-run the one-time setup against the current contents of the bound
    /// distribution record. On failure the generator stays unusable and
    /// every subsequent [`Generator::sample`] fails fast.
    fn reinit(&mut self) -> Result<()>;

    /// Diagnostic snapshot.
    fn profile(&self) -> Profile;

    /// Whether [`Generator::quantile`] is implemented.
    fn supports_quantile(&self) -> bool {
        false
    }

    /// Map a uniform `u` in `[0, 1]` to a variate by inversion.
    fn quantile(&mut self, _u: f64) -> Result<f64> {
        Err(report(Error::generator(
            "quantile not implemented for this method",
        )))
    }

    /// Draw `n` variates; a thin loop over [`Generator::sample`].
    fn sample_many(&mut self, n: usize) -> Result<Vec<f64>> {
        (0..n).map(|_| self.sample()).collect()
    }
}

/// Shared, non-owning handle to a univariate generator. Used where a
/// caller keeps ownership of a generator while lending it out, as with
/// mixture components.
pub type GeneratorRef = Rc<RefCell<dyn Generator>>;

/// A live discrete univariate sampler.
pub trait DiscreteGenerator {
    /// Draw one integer variate.
    fn sample(&mut self) -> Result<i64>;

    /// Re-run the one-time setup; same contract as [`Generator::reinit`].
    fn reinit(&mut self) -> Result<()>;

    fn profile(&self) -> Profile;

    fn sample_many(&mut self, n: usize) -> Result<Vec<i64>> {
        (0..n).map(|_| self.sample()).collect()
    }
}

/// A live multivariate sampler.
pub trait VectorGenerator {
    fn dim(&self) -> usize;

    /// Draw one vector variate into `out`.
    fn sample_into(&mut self, out: &mut [f64]) -> Result<()>;

    fn sample_vec(&mut self) -> Result<Vec<f64>> {
        let mut out = vec![0.; self.dim()];
        self.sample_into(&mut out)?;
        Ok(out)
    }

    fn reinit(&mut self) -> Result<()>;
}
