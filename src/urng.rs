//! Replaceable uniform random number source.
//!
//! Generators hold a shared handle to a [`UniformSource`]; the source's
//! sequence state advances on every draw, so a handle must not be shared
//! across threads (the execution model is single threaded throughout).

use std::{cell::RefCell, rc::Rc};

use rand::{
    distr::{Distribution, StandardUniform},
    RngCore, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// A uniform random number generator with a rewind hook.
pub trait UniformSource: RngCore {
    /// Rewind the stream to the state it had at construction.
    fn reset(&mut self);
}

/// Shared handle to a uniform source.
pub type UrngRef = Rc<RefCell<dyn UniformSource>>;

/// Default source: a seeded ChaCha stream.
pub struct DefaultSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl DefaultSource {
    pub fn new(seed: u64) -> Self {
        DefaultSource {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RngCore for DefaultSource {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }
}

impl UniformSource for DefaultSource {
    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}

/// Create a shareable default source from a seed.
pub fn default_urng(seed: u64) -> UrngRef {
    Rc::new(RefCell::new(DefaultSource::new(seed)))
}

/// Uniform draw in `[0, 1)`.
pub(crate) fn uniform(urng: &UrngRef) -> f64 {
    let mut rng = urng.borrow_mut();
    StandardUniform.sample(&mut *rng)
}

/// Uniform draw in `(0, 1)`.
pub(crate) fn uniform_pos(urng: &UrngRef) -> f64 {
    loop {
        let u = uniform(urng);
        if u > 0. {
            return u;
        }
    }
}

/// Standard normal draw, used for random directions.
pub(crate) fn standard_normal(urng: &UrngRef) -> f64 {
    let mut rng = urng.borrow_mut();
    StandardNormal.sample(&mut *rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_replays_the_stream() {
        let urng = default_urng(42);
        let first: Vec<f64> = (0..5).map(|_| uniform(&urng)).collect();
        urng.borrow_mut().reset();
        let second: Vec<f64> = (0..5).map(|_| uniform(&urng)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn uniforms_stay_in_unit_interval() {
        let urng = default_urng(7);
        for _ in 0..1000 {
            let u = uniform_pos(&urng);
            assert!(u > 0. && u < 1.);
        }
    }

    #[test]
    fn shared_handle_advances_one_stream() {
        let urng = default_urng(1);
        let other = urng.clone();
        let a = uniform(&urng);
        let b = uniform(&other);
        assert_ne!(a, b);
    }
}
