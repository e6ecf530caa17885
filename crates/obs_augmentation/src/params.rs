//! Per-sample randomized parameter vectors.

use crate::error::AugmentError;
use crate::rng::with_rng;
use anyhow::{bail, Result};
use rand::distr::{Bernoulli, Distribution, Uniform};
use rand::Rng;

/// A vector of independently drawn per-sample parameters, paired with the
/// distribution they were drawn from.
///
/// Every augmenter is built on one or more stores. The vector is filled at
/// construction, read (never written) by `apply`, and rewritten only by the
/// two resample operations. Resampling reuses the construction
/// distribution, so the marginal distribution of every entry stays fixed
/// for the lifetime of the augmenter.
#[derive(Debug, Clone)]
pub struct ParamStore<T, D> {
    values: Vec<T>,
    dist: D,
}

impl<T, D: Distribution<T>> ParamStore<T, D> {
    /// Fills a store of `size` entries with i.i.d. draws from `dist`.
    pub fn new(size: usize, dist: D) -> Result<Self> {
        if size == 0 {
            bail!(AugmentError::Validation(
                "batch size must be at least 1".into()
            ));
        }
        let values = with_rng(|rng| (0..size).map(|_| dist.sample(rng)).collect());
        Ok(Self { values, dist })
    }

    /// Current per-sample values, one entry per batch index.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Redraws the entry at `index`; every other entry is left untouched.
    pub fn resample_one(&mut self, index: usize) -> Result<()> {
        if index >= self.values.len() {
            bail!(AugmentError::IndexOutOfBounds {
                index,
                batch_size: self.values.len(),
            });
        }
        self.values[index] = with_rng(|rng| self.dist.sample(rng));
        Ok(())
    }

    /// Redraws every entry.
    pub fn resample_all(&mut self) {
        with_rng(|rng| {
            for value in &mut self.values {
                *value = self.dist.sample(rng);
            }
        });
    }
}

/// Uniform distribution over RGB triples, each channel drawn from
/// `[0, 255)`.
#[derive(Debug, Clone, Copy)]
pub struct UniformRgb;

impl Distribution<[u8; 3]> for UniformRgb {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [u8; 3] {
        [
            rng.random_range(0..u8::MAX),
            rng.random_range(0..u8::MAX),
            rng.random_range(0..u8::MAX),
        ]
    }
}

/// Builds a Bernoulli distribution, mapping an out-of-range probability to
/// a validation error.
pub(crate) fn bernoulli(p: f64) -> Result<Bernoulli> {
    if !(0.0..=1.0).contains(&p) {
        bail!(AugmentError::Validation(format!(
            "probability must be in [0, 1], got {p}"
        )));
    }
    Ok(Bernoulli::new(p)?)
}

/// Uniform integer distribution over the half-open range `[low, high)`.
pub(crate) fn uniform_int(low: i64, high: i64) -> Result<Uniform<i64>> {
    if low >= high {
        bail!(AugmentError::Validation(format!(
            "empty integer range [{low}, {high})"
        )));
    }
    Ok(Uniform::new(low, high)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seed_rng;

    #[test]
    fn test_resample_one_touches_only_that_index() -> Result<()> {
        seed_rng(42);
        let mut store = ParamStore::new(16, Uniform::new(0.0f32, 1.0)?)?;
        let before = store.values().to_vec();

        store.resample_one(5)?;

        let after = store.values();
        for (i, (b, a)) in before.iter().zip(after).enumerate() {
            if i != 5 {
                assert_eq!(b, a, "index {i} changed");
            }
        }
        assert_ne!(before[5], after[5]);
        Ok(())
    }

    #[test]
    fn test_resample_one_out_of_bounds() -> Result<()> {
        let mut store = ParamStore::new(4, Uniform::new(0i64, 10)?)?;
        let err = store.resample_one(4).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AugmentError>(),
            Some(AugmentError::IndexOutOfBounds {
                index: 4,
                batch_size: 4
            })
        ));
        Ok(())
    }

    #[test]
    fn test_resample_all_redraws() -> Result<()> {
        seed_rng(7);
        let mut store = ParamStore::new(16, Uniform::new(0.0f32, 1.0)?)?;
        let before = store.values().to_vec();

        store.resample_all();

        // Statistical, not a hard equality: 16 fresh uniform floats all
        // colliding with their predecessors does not happen.
        assert_ne!(before, store.values());
        assert_eq!(store.len(), 16);
        Ok(())
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = ParamStore::new(0, UniformRgb).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AugmentError>(),
            Some(AugmentError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_distribution_parameters() {
        assert!(bernoulli(1.5).is_err());
        assert!(uniform_int(22, 7).is_err());
    }
}
