use crate::augmenter::{Augmenter, NamedParams, ParamValues};
use crate::batch::{check_batch, Batch};
use crate::error::AugmentError;
use crate::params::{uniform_int, ParamStore};
use anyhow::{bail, Result};
use ndarray::{s, Array3, ArrayView3, Axis};
use rand::distr::Uniform;

// ============================================================================
// RandomRotate
// ============================================================================

/// Rotates each sample by its stored number of quarter turns.
///
/// The per-sample rotation class is drawn uniformly from `{0, 1, 2, 3}`
/// (0/90/180/270 degrees counterclockwise) at construction. Resampling
/// redraws uniformly over all four classes, so a resample may land on the
/// previous class again.
///
/// Requires square images: a quarter turn of a non-square image would
/// change its footprint within the batch.
#[derive(Debug)]
pub struct RandomRotate {
    quarter_turns: ParamStore<i64, Uniform<i64>>,
}

impl RandomRotate {
    pub fn new(batch_size: usize) -> Result<Self> {
        Ok(Self {
            quarter_turns: ParamStore::new(batch_size, uniform_int(0, 4)?)?,
        })
    }
}

/// Rotates one image counterclockwise by `turns` quarter turns.
fn rot90(image: ArrayView3<'_, u8>, turns: i64) -> Array3<u8> {
    match turns.rem_euclid(4) {
        1 => image
            .permuted_axes([1, 0, 2])
            .slice_move(s![..;-1, .., ..])
            .to_owned(),
        2 => image.slice(s![..;-1, ..;-1, ..]).to_owned(),
        3 => image
            .permuted_axes([1, 0, 2])
            .slice_move(s![.., ..;-1, ..])
            .to_owned(),
        _ => image.to_owned(),
    }
}

impl Augmenter for RandomRotate {
    fn apply(&self, batch: &Batch) -> Result<Batch> {
        check_batch(batch, self.quarter_turns.len())?;
        let (height, width) = (batch.shape()[1], batch.shape()[2]);
        if height != width {
            bail!(AugmentError::Shape(format!(
                "quarter-turn rotation needs square images, got {height}x{width}"
            )));
        }
        let mut out = batch.clone();
        for (i, &turns) in self.quarter_turns.values().iter().enumerate() {
            if turns == 0 {
                continue;
            }
            out.index_axis_mut(Axis(0), i)
                .assign(&rot90(batch.index_axis(Axis(0), i), turns));
        }
        Ok(out)
    }

    fn resample_one(&mut self, index: usize) -> Result<()> {
        self.quarter_turns.resample_one(index)
    }

    fn resample_all(&mut self) {
        self.quarter_turns.resample_all();
    }

    fn introspect(&self) -> Vec<NamedParams> {
        vec![NamedParams::new(
            "quarter_turns",
            ParamValues::Int(self.quarter_turns.values().to_vec()),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seed_rng;
    use ndarray::Array3;

    /// 2x2 image with a distinct value in each corner.
    fn corner_image() -> Array3<u8> {
        Array3::from_shape_fn((2, 2, 3), |(r, c, _)| (r * 2 + c + 1) as u8)
    }

    #[test]
    fn test_rot90_quarter_turn() {
        // [[1, 2],      [[2, 4],
        //  [3, 4]]  ->   [1, 3]]  (counterclockwise)
        let image = corner_image();
        let rotated = rot90(image.view(), 1);
        assert_eq!(rotated[[0, 0, 0]], 2);
        assert_eq!(rotated[[0, 1, 0]], 4);
        assert_eq!(rotated[[1, 0, 0]], 1);
        assert_eq!(rotated[[1, 1, 0]], 3);
    }

    #[test]
    fn test_rot90_half_turn() {
        let image = corner_image();
        let rotated = rot90(image.view(), 2);
        assert_eq!(rotated[[0, 0, 0]], 4);
        assert_eq!(rotated[[1, 1, 0]], 1);
    }

    #[test]
    fn test_four_quarter_turns_compose_to_identity() {
        let image = corner_image();
        let mut rotated = image.clone();
        for _ in 0..4 {
            rotated = rot90(rotated.view(), 1);
        }
        assert_eq!(rotated, image);
    }

    #[test]
    fn test_classes_stay_in_range() -> Result<()> {
        seed_rng(42);
        let mut rotate = RandomRotate::new(64)?;
        rotate.resample_all();
        for &turns in rotate.quarter_turns.values() {
            assert!((0..4).contains(&turns));
        }
        Ok(())
    }

    #[test]
    fn test_non_square_rejected() -> Result<()> {
        let rotate = RandomRotate::new(2)?;
        let batch = Batch::zeros((2, 4, 6, 3));
        let err = rotate.apply(&batch).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AugmentError>(),
            Some(AugmentError::Shape(_))
        ));
        Ok(())
    }
}
