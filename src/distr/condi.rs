//! Conditional view of a multivariate law along a line.
//!
//! The view restricts the multivariate log-density to a line through a
//! fixed point, either along a coordinate axis or along an arbitrary
//! direction, and exposes the result as a continuous univariate record so
//! that univariate samplers can be embedded without knowing where their
//! density comes from. Re-aiming the view mutates the exposed record (and
//! bumps its version), so an embedded generator must be reinitialized
//! afterwards.

use std::{cell::RefCell, rc::Rc};

use crate::{
    distr::{cont::ContDistr, cvec::CvecDistrRef, ContDistrRef, Domain},
    error::{Error, Result},
};

enum CondiDir {
    /// Vary coordinate `k`, all other coordinates fixed.
    Coord(usize),
    /// Vary along `pos + t * direction`.
    Direction(Vec<f64>),
}

struct CondiState {
    pos: Vec<f64>,
    dir: CondiDir,
}

/// Conditional distribution of one coordinate (or one direction) of a
/// multivariate law.
pub struct CondiDistr {
    cvec: CvecDistrRef,
    state: Rc<RefCell<CondiState>>,
    inner: ContDistrRef,
}

impl CondiDistr {
    /// Build a conditional view, initially aimed along coordinate 0 through
    /// the multivariate record's center.
    pub fn new(cvec: CvecDistrRef) -> Result<CondiDistr> {
        let center = {
            let cv = cvec.borrow();
            if !cv.has_logpdf() {
                return Err(Error::distr("logPDF required for conditional view"));
            }
            if !cv.has_dlogpdf() {
                return Err(Error::distr("dlogPDF required for conditional view"));
            }
            cv.center().to_vec()
        };
        let state = Rc::new(RefCell::new(CondiState {
            pos: center,
            dir: CondiDir::Coord(0),
        }));

        let mut inner = ContDistr::new(Domain::UNBOUNDED);
        let logpdf_state = state.clone();
        let logpdf_cvec = cvec.clone();
        inner.set_logpdf(Box::new(move |t, _params| {
            let st = logpdf_state.borrow();
            let cv = logpdf_cvec.borrow();
            let point = st.point_at(t);
            cv.logpdf(&point).unwrap_or(f64::NAN)
        }));
        let dlogpdf_state = state.clone();
        let dlogpdf_cvec = cvec.clone();
        inner.set_dlogpdf(Box::new(move |t, _params| {
            let st = dlogpdf_state.borrow();
            let cv = dlogpdf_cvec.borrow();
            let point = st.point_at(t);
            let mut grad = vec![0.; cv.dim()];
            if cv.dlogpdf(&point, &mut grad).is_err() {
                return f64::NAN;
            }
            match &st.dir {
                CondiDir::Coord(k) => grad[*k],
                CondiDir::Direction(dir) => {
                    grad.iter().zip(dir).map(|(g, d)| g * d).sum()
                }
            }
        }));

        let condi = CondiDistr {
            cvec,
            state,
            inner: inner.into_ref(),
        };
        let pos = condi.state.borrow().pos.clone();
        condi.set_coordinate(&pos, 0)?;
        Ok(condi)
    }

    /// The univariate record embedded samplers are built against.
    pub fn distr(&self) -> ContDistrRef {
        self.inner.clone()
    }

    pub fn dim(&self) -> usize {
        self.cvec.borrow().dim()
    }

    /// Aim the view along coordinate `k` through `pos`.
    pub fn set_coordinate(&self, pos: &[f64], k: usize) -> Result<()> {
        let (dim, domain) = {
            let cv = self.cvec.borrow();
            if k >= cv.dim() {
                return Err(Error::param("coordinate index out of range"));
            }
            (cv.dim(), cv.domains()[k])
        };
        if pos.len() != dim {
            return Err(Error::param("condition point has wrong dimension"));
        }
        {
            let mut st = self.state.borrow_mut();
            st.pos = pos.to_vec();
            st.dir = CondiDir::Coord(k);
        }
        let mut inner = self.inner.borrow_mut();
        inner.set_domain(domain)?;
        inner.set_center(pos[k].clamp(domain.left(), domain.right()))?;
        Ok(())
    }

    /// Aim the view along `direction` through `pos`. The direction need not
    /// be normalized but must not be the zero vector.
    pub fn set_direction(&self, pos: &[f64], direction: &[f64]) -> Result<()> {
        let domain = {
            let cv = self.cvec.borrow();
            if pos.len() != cv.dim() || direction.len() != cv.dim() {
                return Err(Error::param("condition point has wrong dimension"));
            }
            if direction.iter().all(|d| *d == 0.) {
                return Err(Error::param("direction is the zero vector"));
            }
            line_domain(pos, direction, cv.domains())?
        };
        {
            let mut st = self.state.borrow_mut();
            st.pos = pos.to_vec();
            st.dir = CondiDir::Direction(direction.to_vec());
        }
        let mut inner = self.inner.borrow_mut();
        inner.set_domain(domain)?;
        inner.set_center(0f64.clamp(domain.left(), domain.right()))?;
        Ok(())
    }
}

impl CondiState {
    fn point_at(&self, t: f64) -> Vec<f64> {
        match &self.dir {
            CondiDir::Coord(k) => {
                let mut point = self.pos.clone();
                point[*k] = t;
                point
            }
            CondiDir::Direction(dir) => self
                .pos
                .iter()
                .zip(dir)
                .map(|(p, d)| p + t * d)
                .collect(),
        }
    }
}

/// Intersection of the line `pos + t * dir` with a box domain, expressed
/// as bounds on `t`.
fn line_domain(pos: &[f64], dir: &[f64], domains: &[Domain]) -> Result<Domain> {
    let mut lo = f64::NEG_INFINITY;
    let mut hi = f64::INFINITY;
    for ((p, d), dom) in pos.iter().zip(dir).zip(domains) {
        if *d == 0. {
            if !dom.contains(*p) {
                return Err(Error::condition(
                    "condition point outside domain along fixed coordinate",
                ));
            }
            continue;
        }
        let a = (dom.left() - p) / d;
        let b = (dom.right() - p) / d;
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        lo = lo.max(a);
        hi = hi.min(b);
    }
    if lo > hi {
        return Err(Error::condition("line does not intersect the domain"));
    }
    Domain::new(lo, hi)
}
