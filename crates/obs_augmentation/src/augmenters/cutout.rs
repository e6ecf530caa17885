use crate::augmenter::{Augmenter, NamedParams, ParamValues};
use crate::batch::{check_batch, Batch};
use crate::error::AugmentError;
use crate::params::{uniform_int, ParamStore, UniformRgb};
use anyhow::{bail, Result};
use rand::distr::Uniform;
use std::ops::Range;

pub const DEFAULT_BOX_MIN: i64 = 7;
pub const DEFAULT_BOX_MAX: i64 = 22;
pub const DEFAULT_PIVOT_H: usize = 12;
pub const DEFAULT_PIVOT_W: usize = 24;

/// Row/column ranges of a sample's box, clipped to an `h` by `w` image.
///
/// The box's top-left corner sits at `(pivot_h + box_h, pivot_w + box_w)`
/// with extent `(box_h, box_w)`. A box reaching past the image boundary is
/// clipped silently; overflow is defined behavior, not an error.
fn clipped_region(
    pivot: (usize, usize),
    box_h: usize,
    box_w: usize,
    h: usize,
    w: usize,
) -> (Range<usize>, Range<usize>) {
    let rows = (pivot.0 + box_h).min(h)..(pivot.0 + 2 * box_h).min(h);
    let cols = (pivot.1 + box_w).min(w)..(pivot.1 + 2 * box_w).min(w);
    (rows, cols)
}

fn check_box(box_min: i64, box_max: i64) -> Result<()> {
    if box_min < 0 {
        bail!(AugmentError::Validation(format!(
            "box_min must be non-negative, got {box_min}"
        )));
    }
    if box_min >= box_max {
        bail!(AugmentError::Validation(format!(
            "box_min must be below box_max, got [{box_min}, {box_max})"
        )));
    }
    Ok(())
}

// ============================================================================
// Cutout
// ============================================================================

/// Zeroes one rectangular region per sample.
///
/// Box height and width are drawn per sample from `[box_min, box_max)` and
/// persist across calls.
#[derive(Debug)]
pub struct Cutout {
    pivot: (usize, usize),
    widths: ParamStore<i64, Uniform<i64>>,
    heights: ParamStore<i64, Uniform<i64>>,
}

impl Cutout {
    pub fn new(
        batch_size: usize,
        box_min: i64,
        box_max: i64,
        pivot_h: usize,
        pivot_w: usize,
    ) -> Result<Self> {
        check_box(box_min, box_max)?;
        let side = uniform_int(box_min, box_max)?;
        Ok(Self {
            pivot: (pivot_h, pivot_w),
            widths: ParamStore::new(batch_size, side)?,
            heights: ParamStore::new(batch_size, side)?,
        })
    }

    pub fn with_defaults(batch_size: usize) -> Result<Self> {
        Self::new(
            batch_size,
            DEFAULT_BOX_MIN,
            DEFAULT_BOX_MAX,
            DEFAULT_PIVOT_H,
            DEFAULT_PIVOT_W,
        )
    }
}

impl Augmenter for Cutout {
    fn apply(&self, batch: &Batch) -> Result<Batch> {
        check_batch(batch, self.widths.len())?;
        let (h, w) = (batch.shape()[1], batch.shape()[2]);
        let mut out = batch.clone();
        for i in 0..self.widths.len() {
            let box_h = self.heights.values()[i] as usize;
            let box_w = self.widths.values()[i] as usize;
            let (rows, cols) = clipped_region(self.pivot, box_h, box_w, h, w);
            out.slice_mut(ndarray::s![i, rows, cols, ..]).fill(0);
        }
        Ok(out)
    }

    fn resample_one(&mut self, index: usize) -> Result<()> {
        self.widths.resample_one(index)?;
        self.heights.resample_one(index)?;
        Ok(())
    }

    fn resample_all(&mut self) {
        self.widths.resample_all();
        self.heights.resample_all();
    }

    fn introspect(&self) -> Vec<NamedParams> {
        vec![
            NamedParams::new("width", ParamValues::Int(self.widths.values().to_vec())),
            NamedParams::new("height", ParamValues::Int(self.heights.values().to_vec())),
        ]
    }
}

// ============================================================================
// ColorCutout
// ============================================================================

/// Like [`Cutout`], but fills the region with a per-sample random RGB
/// color instead of zeros. The fill color persists across calls alongside
/// the box extents.
#[derive(Debug)]
pub struct ColorCutout {
    pivot: (usize, usize),
    widths: ParamStore<i64, Uniform<i64>>,
    heights: ParamStore<i64, Uniform<i64>>,
    colors: ParamStore<[u8; 3], UniformRgb>,
}

impl ColorCutout {
    pub fn new(
        batch_size: usize,
        box_min: i64,
        box_max: i64,
        pivot_h: usize,
        pivot_w: usize,
    ) -> Result<Self> {
        check_box(box_min, box_max)?;
        let side = uniform_int(box_min, box_max)?;
        Ok(Self {
            pivot: (pivot_h, pivot_w),
            widths: ParamStore::new(batch_size, side)?,
            heights: ParamStore::new(batch_size, side)?,
            colors: ParamStore::new(batch_size, UniformRgb)?,
        })
    }

    pub fn with_defaults(batch_size: usize) -> Result<Self> {
        Self::new(
            batch_size,
            DEFAULT_BOX_MIN,
            DEFAULT_BOX_MAX,
            DEFAULT_PIVOT_H,
            DEFAULT_PIVOT_W,
        )
    }
}

impl Augmenter for ColorCutout {
    fn apply(&self, batch: &Batch) -> Result<Batch> {
        check_batch(batch, self.widths.len())?;
        let (h, w) = (batch.shape()[1], batch.shape()[2]);
        let mut out = batch.clone();
        for i in 0..self.widths.len() {
            let box_h = self.heights.values()[i] as usize;
            let box_w = self.widths.values()[i] as usize;
            let color = self.colors.values()[i];
            let (rows, cols) = clipped_region(self.pivot, box_h, box_w, h, w);
            for (channel, &value) in color.iter().enumerate() {
                out.slice_mut(ndarray::s![i, rows.clone(), cols.clone(), channel])
                    .fill(value);
            }
        }
        Ok(out)
    }

    fn resample_one(&mut self, index: usize) -> Result<()> {
        self.widths.resample_one(index)?;
        self.heights.resample_one(index)?;
        self.colors.resample_one(index)?;
        Ok(())
    }

    fn resample_all(&mut self) {
        self.widths.resample_all();
        self.heights.resample_all();
        self.colors.resample_all();
    }

    fn introspect(&self) -> Vec<NamedParams> {
        vec![
            NamedParams::new("width", ParamValues::Int(self.widths.values().to_vec())),
            NamedParams::new("height", ParamValues::Int(self.heights.values().to_vec())),
            NamedParams::new("fill_color", ParamValues::Rgb(self.colors.values().to_vec())),
        ]
    }
}
