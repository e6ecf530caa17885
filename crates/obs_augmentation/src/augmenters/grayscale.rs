use crate::augmenter::{Augmenter, NamedParams, ParamValues};
use crate::batch::{check_batch, Batch};
use crate::params::{bernoulli, ParamStore};
use anyhow::Result;
use ndarray::Axis;
use rand::distr::Bernoulli;

/// Luma weights for the red, green and blue channels.
const LUMA: [f32; 3] = [0.2989, 0.5870, 0.1140];

// ============================================================================
// RandomGrayscale
// ============================================================================

/// Converts a per-sample random subset of the batch to grayscale.
///
/// Each selected sample's pixels are replaced by their rounded luma value
/// broadcast across all three channels; unselected samples pass through
/// untouched. The selection vector persists across calls until resampled.
///
/// # Example
/// ```ignore
/// let gray = RandomGrayscale::new(32, 0.5)?;
/// let augmented = gray.apply(&batch)?;
/// ```
#[derive(Debug)]
pub struct RandomGrayscale {
    selected: ParamStore<bool, Bernoulli>,
}

impl RandomGrayscale {
    /// `p_rand` is the per-sample probability of grayscale conversion;
    /// must lie in `[0, 1]`.
    pub fn new(batch_size: usize, p_rand: f64) -> Result<Self> {
        Ok(Self {
            selected: ParamStore::new(batch_size, bernoulli(p_rand)?)?,
        })
    }
}

impl Augmenter for RandomGrayscale {
    fn apply(&self, batch: &Batch) -> Result<Batch> {
        check_batch(batch, self.selected.len())?;
        let mut out = batch.clone();
        for (i, &selected) in self.selected.values().iter().enumerate() {
            if !selected {
                continue;
            }
            let mut image = out.index_axis_mut(Axis(0), i);
            for mut pixel in image.lanes_mut(Axis(2)) {
                let luma = LUMA[0] * pixel[0] as f32
                    + LUMA[1] * pixel[1] as f32
                    + LUMA[2] * pixel[2] as f32;
                pixel.fill(luma.round() as u8);
            }
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
            "grayscale",
            ParamValues::Bool(self.selected.values().to_vec()),
        )]
    }
}
