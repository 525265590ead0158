//! Finite mixtures of pre-built generators.
//!
//! A component is chosen by discrete inversion over the cumulative
//! weights, then the draw is delegated to it. Components are shared, not
//! owned: the caller keeps its handles alive and a cloned mixture samples
//! from the same component objects.
//!
//! In inversion-consistent mode a single uniform drives both the
//! component choice and the within-component inversion, so the composed
//! map from uniforms to variates stays monotone (useful for quasi-Monte
//! Carlo). This mode requires every component to support quantiles.

use crate::{
    error::{report, Error, Result},
    generate::{Generator, GeneratorRef, Profile, SamplingKind},
    urng::{uniform, UrngRef},
};

/// Parameter record for the mixture composer.
pub struct MixtParams {
    weights: Vec<f64>,
    components: Vec<GeneratorRef>,
    useinversion: bool,
}

impl MixtParams {
    /// Bind weights and component generators. Weights must be finite and
    /// non-negative with a positive sum; an invalid weight vector fails
    /// here, it is never silently repaired.
    pub fn new(weights: &[f64], components: Vec<GeneratorRef>) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::param("mixture needs at least one component"));
        }
        if weights.len() != components.len() {
            return Err(Error::param(
                "weight count does not match component count",
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.) {
            return Err(Error::param(
                "mixture weights must be finite and non-negative",
            ));
        }
        if !(weights.iter().sum::<f64>() > 0.) {
            return Err(Error::param("mixture weights sum to zero"));
        }
        Ok(MixtParams {
            weights: weights.to_vec(),
            components,
            useinversion: false,
        })
    }

    /// Thread one uniform through component choice and within-component
    /// inversion. Fails at init when a component lacks quantile support.
    pub fn set_useinversion(&mut self, useinversion: bool) {
        self.useinversion = useinversion;
    }

    /// Consume the record and build a generator.
    pub fn init(self, urng: &UrngRef) -> Result<MixtGen> {
        if self.useinversion {
            for comp in &self.components {
                if !comp.borrow().supports_quantile() {
                    return Err(report(Error::condition(
                        "inversion-consistent mixture needs quantile support in every component",
                    )));
                }
            }
        }
        let total: f64 = self.weights.iter().sum();
        let mut acc = 0.;
        let cum: Vec<f64> = self
            .weights
            .iter()
            .map(|w| {
                acc += w / total;
                acc
            })
            .collect();
        Ok(MixtGen {
            cum,
            components: self.components,
            urng: urng.clone(),
            useinversion: self.useinversion,
        })
    }
}

/// Mixture generator.
///
/// Cloning shares the component generators; only the selection state is
/// copied.
#[derive(Clone)]
pub struct MixtGen {
    cum: Vec<f64>,
    components: Vec<GeneratorRef>,
    urng: UrngRef,
    useinversion: bool,
}

impl MixtGen {
    /// Component index for a uniform, with its weight band.
    fn select(&self, u: f64) -> (usize, f64, f64) {
        let idx = self
            .cum
            .partition_point(|c| *c < u)
            .min(self.cum.len() - 1);
        let lo = if idx == 0 { 0. } else { self.cum[idx - 1] };
        (idx, lo, self.cum[idx])
    }
}

impl Generator for MixtGen {
    fn sample(&mut self) -> Result<f64> {
        let u = uniform(&self.urng);
        let (idx, lo, hi) = self.select(u);
        if self.useinversion {
            let rescaled = ((u - lo) / (hi - lo)).clamp(0., 1.);
            self.components[idx].borrow_mut().quantile(rescaled)
        } else {
            self.components[idx].borrow_mut().sample()
        }
    }

    /// Components are caller-owned, so the composed setup cannot be
    /// recomputed from here; rebuild the mixture instead.
    fn reinit(&mut self) -> Result<()> {
        Err(report(Error::generator(
            "reinit not supported for mixtures; rebuild from its components",
        )))
    }

    fn profile(&self) -> Profile {
        // Selection is always by inversion over the cumulative weights;
        // delegated component draws may still reject.
        let kind = if self.useinversion {
            SamplingKind::Inversion
        } else {
            SamplingKind::InversionRejection
        };
        Profile::new("mixt", kind)
    }

    fn supports_quantile(&self) -> bool {
        self.useinversion
    }

    fn quantile(&mut self, u: f64) -> Result<f64> {
        if !self.useinversion {
            return Err(report(Error::generator(
                "quantile needs the inversion-consistent mode",
            )));
        }
        if !(0. ..=1.).contains(&u) {
            return Err(report(Error::param("quantile argument outside [0, 1]")));
        }
        let (idx, lo, hi) = self.select(u);
        let rescaled = ((u - lo) / (hi - lo)).clamp(0., 1.);
        self.components[idx].borrow_mut().quantile(rescaled)
    }
}
