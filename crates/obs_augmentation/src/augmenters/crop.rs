use crate::augmenter::{Augmenter, NamedParams, ParamValues};
use crate::batch::{check_batch, check_channels, Batch};
use crate::error::AugmentError;
use crate::params::{uniform_int, ParamStore};
use anyhow::{bail, Context, Result};
use image::{imageops, imageops::FilterType, RgbImage};
use ndarray::{s, Array4, Axis};
use rand::distr::Uniform;

/// Side length of the intermediate upscale fed to the random window.
pub const RESIZE_TARGET: usize = 84;
/// Side length of every crop output.
pub const CROP_SIZE: usize = 64;
/// Exclusive upper bound for random window offsets.
const CROP_MAX: i64 = (RESIZE_TARGET - CROP_SIZE) as i64;

// ============================================================================
// RandomCrop
// ============================================================================

/// Upscales each sample to 84x84, then extracts a per-sample 64x64 window
/// at that sample's stored row/column offsets.
///
/// The upscale uses Lanczos3, a deterministic anti-aliasing-capable
/// filter, so the output depends only on the input batch and the stored
/// offsets. Offsets are drawn from `[0, 20)` and persist across calls.
#[derive(Debug)]
pub struct RandomCrop {
    row_offsets: ParamStore<i64, Uniform<i64>>,
    col_offsets: ParamStore<i64, Uniform<i64>>,
}

impl RandomCrop {
    pub fn new(batch_size: usize) -> Result<Self> {
        let offset = uniform_int(0, CROP_MAX)?;
        Ok(Self {
            row_offsets: ParamStore::new(batch_size, offset)?,
            col_offsets: ParamStore::new(batch_size, offset)?,
        })
    }
}

impl Augmenter for RandomCrop {
    fn apply(&self, batch: &Batch) -> Result<Batch> {
        check_batch(batch, self.row_offsets.len())?;
        let n = batch.shape()[0];
        let (h, w) = (batch.shape()[1], batch.shape()[2]);
        let mut out = Array4::<u8>::zeros((n, CROP_SIZE, CROP_SIZE, 3));
        for i in 0..n {
            let pixels: Vec<u8> = batch.index_axis(Axis(0), i).iter().copied().collect();
            let rgb = RgbImage::from_raw(w as u32, h as u32, pixels)
                .context("failed to wrap sample pixels as an RGB image")?;
            let resized = imageops::resize(
                &rgb,
                RESIZE_TARGET as u32,
                RESIZE_TARGET as u32,
                FilterType::Lanczos3,
            );
            let row0 = self.row_offsets.values()[i] as u32;
            let col0 = self.col_offsets.values()[i] as u32;
            let mut window = out.index_axis_mut(Axis(0), i);
            for r in 0..CROP_SIZE as u32 {
                for c in 0..CROP_SIZE as u32 {
                    let pixel = resized.get_pixel(col0 + c, row0 + r);
                    for channel in 0..3 {
                        window[[r as usize, c as usize, channel]] = pixel[channel];
                    }
                }
            }
        }
        Ok(out)
    }

    fn resample_one(&mut self, index: usize) -> Result<()> {
        self.row_offsets.resample_one(index)?;
        self.col_offsets.resample_one(index)?;
        Ok(())
    }

    fn resample_all(&mut self) {
        self.row_offsets.resample_all();
        self.col_offsets.resample_all();
    }

    fn introspect(&self) -> Vec<NamedParams> {
        vec![
            NamedParams::new(
                "row_offset",
                ParamValues::Int(self.row_offsets.values().to_vec()),
            ),
            NamedParams::new(
                "col_offset",
                ParamValues::Int(self.col_offsets.values().to_vec()),
            ),
        ]
    }
}

// ============================================================================
// CenterCrop
// ============================================================================

/// Extracts the centered 64x64 window from every sample.
///
/// Stateless: there is nothing to randomize, so the resample operations
/// exist only to satisfy the shared augmenter contract and do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct CenterCrop;

impl Augmenter for CenterCrop {
    fn apply(&self, batch: &Batch) -> Result<Batch> {
        check_channels(batch)?;
        let (h, w) = (batch.shape()[1], batch.shape()[2]);
        if h < CROP_SIZE || w < CROP_SIZE {
            bail!(AugmentError::Shape(format!(
                "cannot take a {CROP_SIZE}x{CROP_SIZE} center crop from {h}x{w} images"
            )));
        }
        let top = (h - CROP_SIZE) / 2;
        let left = (w - CROP_SIZE) / 2;
        Ok(batch
            .slice(s![.., top..top + CROP_SIZE, left..left + CROP_SIZE, ..])
            .to_owned())
    }

    fn resample_one(&mut self, _index: usize) -> Result<()> {
        Ok(())
    }

    fn resample_all(&mut self) {}

    fn introspect(&self) -> Vec<NamedParams> {
        Vec::new()
    }
}
