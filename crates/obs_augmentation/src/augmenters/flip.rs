use crate::augmenter::{Augmenter, NamedParams, ParamValues};
use crate::batch::{check_batch, Batch};
use crate::params::{bernoulli, ParamStore};
use anyhow::Result;
use ndarray::{s, Axis};
use rand::distr::Bernoulli;

// ============================================================================
// RandomFlip
// ============================================================================

/// Mirrors a per-sample random subset of the batch along the width axis.
///
/// The selection vector persists across calls, so a flipped environment
/// stays flipped until it is resampled. Applying twice with every sample
/// selected restores the original batch.
#[derive(Debug)]
pub struct RandomFlip {
    selected: ParamStore<bool, Bernoulli>,
}

impl RandomFlip {
    /// `p_rand` is the per-sample probability of mirroring; must lie in
    /// `[0, 1]`.
    pub fn new(batch_size: usize, p_rand: f64) -> Result<Self> {
        Ok(Self {
            selected: ParamStore::new(batch_size, bernoulli(p_rand)?)?,
        })
    }
}

impl Augmenter for RandomFlip {
    fn apply(&self, batch: &Batch) -> Result<Batch> {
        check_batch(batch, self.selected.len())?;
        let mut out = batch.clone();
        for (i, &selected) in self.selected.values().iter().enumerate() {
            if !selected {
                continue;
            }
            let source = batch.index_axis(Axis(0), i);
            out.index_axis_mut(Axis(0), i)
                .assign(&source.slice(s![.., ..;-1, ..]));
        }
        Ok(out)
    }

    fn resample_one(&mut self, index: usize) -> Result<()> {
        self.selected.resample_one(index)
    }

    fn resample_all(&mut self) {
        self.selected.resample_all();
    }

    fn introspect(&self) -> Vec<NamedParams> {
        vec![NamedParams::new(
            "flip",
            ParamValues::Bool(self.selected.values().to_vec()),
        )]
    }
}
