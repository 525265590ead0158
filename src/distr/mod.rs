//! Distribution records: the descriptions of probability laws that
//! generators are built against.
//!
//! Each variant is its own type, so a method that needs (say) a continuous
//! univariate law states that in its signature instead of checking a tag at
//! run time. Records are shared through `Rc<RefCell<_>>` handles; every
//! mutation of the law bumps a version counter so a generator built against
//! older contents can detect staleness lazily on its next draw.

pub(crate) mod condi;
pub(crate) mod cont;
pub(crate) mod cvec;
pub(crate) mod discr;

pub use condi::CondiDistr;
pub use cont::{ContDistr, ContDistrRef, ContEval};
pub use cvec::{CvecDistr, CvecDistrRef};
pub use discr::{DiscrDistr, DiscrDistrRef};

use crate::error::{Error, Result};

/// Inclusive domain of a continuous univariate law. Bounds may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    left: f64,
    right: f64,
}

impl Domain {
    /// The whole real line.
    pub const UNBOUNDED: Domain = Domain {
        left: f64::NEG_INFINITY,
        right: f64::INFINITY,
    };

    pub fn new(left: f64, right: f64) -> Result<Domain> {
        if left.is_nan() || right.is_nan() || left > right {
            return Err(Error::distr(format!(
                "domain bounds invalid: [{left}, {right}]"
            )));
        }
        Ok(Domain { left, right })
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.left && x <= self.right
    }

    pub fn is_bounded(&self) -> bool {
        self.left.is_finite() && self.right.is_finite()
    }

    /// A representative interior point, used to seed searches when the
    /// record carries no better hint.
    pub(crate) fn fallback_center(&self) -> f64 {
        if self.is_bounded() {
            0.5 * (self.left + self.right)
        } else {
            0f64.clamp(self.left, self.right)
        }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Domain::UNBOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(Domain::new(1., -1.).is_err());
        assert!(Domain::new(f64::NAN, 0.).is_err());
        assert!(Domain::new(-1., 1.).is_ok());
    }

    #[test]
    fn center_fallback() {
        assert_eq!(Domain::new(2., 4.).unwrap().fallback_center(), 3.);
        assert_eq!(Domain::UNBOUNDED.fallback_center(), 0.);
        assert_eq!(Domain::new(5., f64::INFINITY).unwrap().fallback_center(), 5.);
    }
}
