//! Batched image storage shared by every augmenter.

use crate::error::AugmentError;
use anyhow::{bail, Result};
use ndarray::Array4;

/// A batch of `N` RGB images in `(N, H, W, C)` layout with 8-bit pixels.
///
/// Every augmenter consumes and returns this type; an augmenter's output
/// layout always equals its input layout. The crop augmenters change the
/// height and width, nothing changes the sample or channel count.
pub type Batch = Array4<u8>;

/// Number of color channels every augmenter operates on.
pub const CHANNELS: usize = 3;

/// Checks that `batch` is 3-channel and carries exactly `expected`
/// samples.
pub(crate) fn check_batch(batch: &Batch, expected: usize) -> Result<()> {
    check_channels(batch)?;
    let n = batch.shape()[0];
    if n != expected {
        bail!(AugmentError::Shape(format!(
            "batch holds {n} samples but the augmenter was built for {expected}"
        )));
    }
    Ok(())
}

/// Checks the channel axis alone, for augmenters that size themselves
/// differently (or not at all) on the sample axis.
pub(crate) fn check_channels(batch: &Batch) -> Result<()> {
    let channels = batch.shape()[3];
    if channels != CHANNELS {
        bail!(AugmentError::Shape(format!(
            "expected {CHANNELS} color channels, got {channels}"
        )));
    }
    Ok(())
}
