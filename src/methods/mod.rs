//! Sampling methods.
//!
//! Each method pairs a parameter record (consumed by `init`) with a
//! generator type implementing [`crate::Generator`] or
//! [`crate::VectorGenerator`].

pub mod ars;
pub mod cdfinv;
pub mod dsrou;
pub mod gibbs;
pub mod mixt;
pub mod srou;
