//! Shared helpers for the integration tests.

use ndarray::Array4;
use obs_augmentation::Batch;

/// Deterministic batch with a distinct value per sample, position and
/// channel.
pub fn gradient_batch(n: usize, h: usize, w: usize) -> Batch {
    Array4::from_shape_fn((n, h, w, 3), |(i, r, c, ch)| {
        (i * 31 + r * 7 + c * 3 + ch * 11) as u8
    })
}
