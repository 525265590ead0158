//! Non-uniform random variate generation from user-supplied distributions.
//!
//! Describe a probability law as a distribution record (callbacks plus
//! known properties), pick a sampling method, configure it through the
//! method's parameter record and turn it into a generator bound to a
//! uniform random source. Generators detect mutation of their record and
//! refuse stale draws until `reinit`.

pub(crate) mod distr;
pub(crate) mod error;
pub(crate) mod generate;
pub(crate) mod math;
pub(crate) mod methods;
pub(crate) mod urng;

#[cfg(test)]
pub(crate) mod test_distr;

pub use distr::{
    CondiDistr, ContDistr, ContDistrRef, ContEval, CvecDistr, CvecDistrRef, DiscrDistr,
    DiscrDistrRef, Domain,
};
pub use error::{clear_reporter, set_reporter, Error, Result};
pub use generate::{
    DiscreteGenerator, Generator, GeneratorRef, Profile, SamplingKind, VectorGenerator,
};
pub use methods::ars::{ArsGen, ArsParams};
pub use methods::cdfinv::{CdfInvGen, CdfInvParams};
pub use methods::dsrou::{DsrouGen, DsrouParams};
pub use methods::gibbs::{GibbsGen, GibbsParams, GibbsVariant};
pub use methods::mixt::{MixtGen, MixtParams};
pub use methods::srou::{SrouGen, SrouParams};
pub use urng::{default_urng, DefaultSource, UniformSource, UrngRef};
