//! Discrete univariate distribution record.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::error::{Error, Result};

/// Probability mass callback: `(point, parameter vector) -> mass`.
pub type PmfFn = Box<dyn Fn(i64, &[f64]) -> f64>;

/// Span limit for property derivation by exhaustive scan.
const MAX_SCAN: i64 = 1 << 24;

/// A discrete univariate probability law on an integer domain.
///
/// The law is given either by callbacks (pmf, cdf) or by an explicit finite
/// probability vector; the table variant needs no callbacks at all.
#[derive(Default)]
pub struct DiscrDistr {
    left: i64,
    right: i64,
    params: Vec<f64>,
    pmf: Option<PmfFn>,
    cdf: Option<PmfFn>,
    pv: Option<Vec<f64>>,
    mode: Option<i64>,
    sum: Option<f64>,
    version: u64,
}

/// Shared handle to a discrete record.
pub type DiscrDistrRef = Rc<RefCell<DiscrDistr>>;

impl fmt::Debug for DiscrDistr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscrDistr")
            .field("domain", &(self.left, self.right))
            .field("mode", &self.mode)
            .field("sum", &self.sum)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl DiscrDistr {
    pub fn new(left: i64, right: i64) -> Result<Self> {
        if left > right {
            return Err(Error::distr(format!(
                "domain bounds invalid: [{left}, {right}]"
            )));
        }
        Ok(DiscrDistr {
            left,
            right,
            ..Default::default()
        })
    }

    /// Table variant: an explicit probability vector starting at `offset`.
    pub fn from_pv(pv: &[f64], offset: i64) -> Result<Self> {
        if pv.is_empty() {
            return Err(Error::distr("probability vector is empty"));
        }
        if pv.iter().any(|p| !p.is_finite() || *p < 0.) {
            return Err(Error::distr(
                "probability vector entries must be finite and non-negative",
            ));
        }
        Ok(DiscrDistr {
            left: offset,
            right: offset + pv.len() as i64 - 1,
            pv: Some(pv.to_vec()),
            ..Default::default()
        })
    }

    pub fn into_ref(self) -> DiscrDistrRef {
        Rc::new(RefCell::new(self))
    }

    pub fn domain(&self) -> (i64, i64) {
        (self.left, self.right)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    pub fn set_params(&mut self, params: &[f64]) -> Result<()> {
        if params.iter().any(|p| !p.is_finite()) {
            return Err(Error::distr("non-finite distribution parameter"));
        }
        self.params = params.to_vec();
        self.mode = None;
        self.sum = None;
        self.touch();
        Ok(())
    }

    pub fn set_domain(&mut self, left: i64, right: i64) -> Result<()> {
        if left > right {
            return Err(Error::distr("domain bounds invalid"));
        }
        self.left = left;
        self.right = right;
        self.sum = None;
        self.mode = self.mode.map(|m| m.clamp(left, right));
        self.touch();
        Ok(())
    }

    pub fn set_pmf(&mut self, f: PmfFn) {
        self.pmf = Some(f);
        self.touch();
    }

    pub fn set_cdf(&mut self, f: PmfFn) {
        self.cdf = Some(f);
        self.touch();
    }

    pub fn has_pmf(&self) -> bool {
        self.pmf.is_some() || self.pv.is_some()
    }

    /// Probability mass at `k`; zero outside the domain.
    pub fn pmf(&self, k: i64) -> Result<f64> {
        if k < self.left || k > self.right {
            return Ok(0.);
        }
        if let Some(pv) = &self.pv {
            return Ok(pv[(k - self.left) as usize]);
        }
        match &self.pmf {
            Some(f) => Ok(f(k, &self.params)),
            None => Err(Error::distr("PMF required but not set")),
        }
    }

    pub fn cdf(&self, k: i64) -> Result<f64> {
        match &self.cdf {
            Some(f) => Ok(f(k, &self.params)),
            None => Err(Error::distr("discrete CDF required but not set")),
        }
    }

    pub fn mode(&self) -> Option<i64> {
        self.mode
    }

    pub fn sum(&self) -> Option<f64> {
        self.sum
    }

    pub fn set_mode(&mut self, mode: i64) -> Result<()> {
        if mode < self.left || mode > self.right {
            return Err(Error::distr("mode outside domain"));
        }
        self.mode = Some(mode);
        Ok(())
    }

    pub fn set_sum(&mut self, sum: f64) -> Result<()> {
        if !(sum.is_finite() && sum > 0.) {
            return Err(Error::distr("PMF sum must be finite and positive"));
        }
        self.sum = Some(sum);
        Ok(())
    }

    /// Derive the mode by scanning the probability vector or a finite domain.
    pub fn update_mode(&mut self) -> Result<i64> {
        let mode = match &self.pv {
            Some(pv) => {
                let (idx, _) = pv
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .ok_or_else(|| Error::distr("empty probability vector"))?;
                self.left + idx as i64
            }
            None => {
                self.check_scannable("mode")?;
                let mut best = self.left;
                let mut best_p = self.pmf(best)?;
                for k in self.left + 1..=self.right {
                    let p = self.pmf(k)?;
                    if p > best_p {
                        best = k;
                        best_p = p;
                    }
                }
                if !(best_p > 0.) {
                    return Err(Error::distr("cannot derive mode: PMF vanishes"));
                }
                best
            }
        };
        self.mode = Some(mode);
        Ok(mode)
    }

    /// Derive the total mass by summation.
    pub fn update_sum(&mut self) -> Result<f64> {
        let sum = match &self.pv {
            Some(pv) => pv.iter().sum(),
            None => {
                self.check_scannable("sum")?;
                let mut acc = 0.;
                for k in self.left..=self.right {
                    acc += self.pmf(k)?;
                }
                acc
            }
        };
        if !(sum.is_finite() && sum > 0.) {
            return Err(Error::distr("derived PMF sum is not positive"));
        }
        self.sum = Some(sum);
        Ok(sum)
    }

    fn check_scannable(&self, what: &str) -> Result<()> {
        if self.pmf.is_none() {
            return Err(Error::distr(format!("cannot derive {what}: no PMF")));
        }
        let span = self.right.checked_sub(self.left);
        match span {
            Some(s) if s < MAX_SCAN => Ok(()),
            _ => Err(Error::distr(format!(
                "cannot derive {what}: domain too large to scan"
            ))),
        }
    }
}
