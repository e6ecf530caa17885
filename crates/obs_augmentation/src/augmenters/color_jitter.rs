use crate::augmenter::{Augmenter, NamedParams, ParamValues};
use crate::batch::{check_channels, Batch};
use crate::color::{hsv_to_rgb, rgb_to_hsv};
use crate::error::AugmentError;
use crate::params::ParamStore;
use crate::rng::gen_bool;
use anyhow::{bail, Result};
use ndarray::Array4;
use rand::distr::Uniform;
use tch::{Device, Kind, Tensor};

// ============================================================================
// Factor ranges
// ============================================================================

/// How far a tonal factor may wander from its neutral value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactorRange {
    /// Symmetric spread around the factor's neutral center; must be
    /// non-negative. `Magnitude(0.0)` disables the factor.
    Magnitude(f64),
    /// Explicit `[low, high]` range; must be ordered and lie inside the
    /// factor's documented bounds.
    Range(f64, f64),
}

impl FactorRange {
    /// Resolves into a concrete sampling range, or `None` when the range
    /// collapses to the neutral center (the factor then applies as the
    /// identity).
    fn resolve(self, name: &str, center: f64, bound: (f64, f64)) -> Result<Option<(f64, f64)>> {
        let (low, high) = match self {
            FactorRange::Magnitude(value) => {
                if value < 0.0 {
                    bail!(AugmentError::Validation(format!(
                        "{name} magnitude must be non-negative, got {value}"
                    )));
                }
                (
                    (center - value).clamp(bound.0, bound.1),
                    (center + value).clamp(bound.0, bound.1),
                )
            }
            FactorRange::Range(low, high) => {
                if !(bound.0 <= low && low <= high && high <= bound.1) {
                    bail!(AugmentError::Validation(format!(
                        "{name} range [{low}, {high}] must be ordered and lie within [{}, {}]",
                        bound.0, bound.1
                    )));
                }
                (low, high)
            }
        };
        if low == center && high == center {
            return Ok(None);
        }
        Ok(Some((low, high)))
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for [`ColorJitter`].
///
/// Defaults match the procgen training setup: magnitudes 0.4 for
/// brightness, contrast and saturation, 0.5 for hue, every sample jittered
/// on every call, no frame stacking.
///
/// Example:
/// ```ignore
/// let config = ColorJitterConfig::builder()
///     .brightness(FactorRange::Range(0.8, 1.2))
///     .p_rand(0.5)
///     .stack_size(4)
///     .build();
/// let jitter = ColorJitter::new(16, config)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ColorJitterConfig {
    /// Multiplier on the HSV value channel; neutral 1, bounded to `>= 0`.
    pub brightness: FactorRange,
    /// Spread around the per-sample spatial mean in RGB; neutral 1,
    /// bounded to `>= 0`.
    pub contrast: FactorRange,
    /// Multiplier on the HSV saturation channel; neutral 1, bounded to
    /// `>= 0`.
    pub saturation: FactorRange,
    /// Additive hue rotation; neutral 0, bounded to `[-0.5, 0.5]`.
    pub hue: FactorRange,
    /// Per-sample probability of receiving the composed transform on a
    /// given `apply` call.
    pub p_rand: f64,
    /// Temporally stacked frames per environment; all frames of one
    /// environment share that environment's factors.
    pub stack_size: usize,
}

impl Default for ColorJitterConfig {
    fn default() -> Self {
        Self {
            brightness: FactorRange::Magnitude(0.4),
            contrast: FactorRange::Magnitude(0.4),
            saturation: FactorRange::Magnitude(0.4),
            hue: FactorRange::Magnitude(0.5),
            p_rand: 1.0,
            stack_size: 1,
        }
    }
}

impl ColorJitterConfig {
    pub fn builder() -> ColorJitterConfigBuilder {
        ColorJitterConfigBuilder::default()
    }
}

/// Builder for [`ColorJitterConfig`] with method chaining.
#[derive(Default)]
pub struct ColorJitterConfigBuilder {
    config: ColorJitterConfig,
}

impl ColorJitterConfigBuilder {
    pub fn brightness(mut self, range: FactorRange) -> Self {
        self.config.brightness = range;
        self
    }

    pub fn contrast(mut self, range: FactorRange) -> Self {
        self.config.contrast = range;
        self
    }

    pub fn saturation(mut self, range: FactorRange) -> Self {
        self.config.saturation = range;
        self
    }

    pub fn hue(mut self, range: FactorRange) -> Self {
        self.config.hue = range;
        self
    }

    pub fn p_rand(mut self, p: f64) -> Self {
        self.config.p_rand = p;
        self
    }

    pub fn stack_size(mut self, frames: usize) -> Self {
        self.config.stack_size = frames;
        self
    }

    pub fn build(self) -> ColorJitterConfig {
        self.config
    }
}

// ============================================================================
// ColorJitter
// ============================================================================

type FactorStore = ParamStore<f32, Uniform<f32>>;

fn factor_store(batch_size: usize, range: Option<(f64, f64)>) -> Result<Option<FactorStore>> {
    match range {
        None => Ok(None),
        Some((low, high)) => {
            let dist = Uniform::new_inclusive(low as f32, high as f32)?;
            Ok(Some(ParamStore::new(batch_size, dist)?))
        }
    }
}

/// Randomized tonal jitter.
///
/// Keeps one factor vector per enabled adjustment (contrast, hue,
/// brightness, saturation), each with one entry per environment.
/// `apply` selects a fresh random subset of samples, then runs the five
/// sub-transforms in one of two orders chosen per call: contrast acts in
/// RGB space, the other three act on their HSV channel between a
/// round-trip through HSV. A factor whose range collapses to its neutral
/// center is disabled and applies as the identity.
///
/// The tensor work runs on the accelerator when one is available; only
/// numeric semantics are fixed, placement is not.
#[derive(Debug)]
pub struct ColorJitter {
    batch_size: usize,
    stack_size: usize,
    p_rand: f64,
    device: Device,
    contrast: Option<FactorStore>,
    hue: Option<FactorStore>,
    brightness: Option<FactorStore>,
    saturation: Option<FactorStore>,
}

impl ColorJitter {
    pub fn new(batch_size: usize, config: ColorJitterConfig) -> Result<Self> {
        if batch_size == 0 {
            bail!(AugmentError::Validation(
                "batch size must be at least 1".into()
            ));
        }
        if !(0.0..=1.0).contains(&config.p_rand) {
            bail!(AugmentError::Validation(format!(
                "p_rand must be in [0, 1], got {}",
                config.p_rand
            )));
        }
        if config.stack_size == 0 {
            bail!(AugmentError::Validation(
                "stack size must be at least 1".into()
            ));
        }
        let contrast = factor_store(
            batch_size,
            config.contrast.resolve("contrast", 1.0, (0.0, f64::INFINITY))?,
        )?;
        let hue = factor_store(batch_size, config.hue.resolve("hue", 0.0, (-0.5, 0.5))?)?;
        let brightness = factor_store(
            batch_size,
            config
                .brightness
                .resolve("brightness", 1.0, (0.0, f64::INFINITY))?,
        )?;
        let saturation = factor_store(
            batch_size,
            config
                .saturation
                .resolve("saturation", 1.0, (0.0, f64::INFINITY))?,
        )?;
        Ok(Self {
            batch_size,
            stack_size: config.stack_size,
            p_rand: config.p_rand,
            device: Device::cuda_if_available(),
            contrast,
            hue,
            brightness,
            saturation,
        })
    }

    pub fn with_defaults(batch_size: usize) -> Result<Self> {
        Self::new(batch_size, ColorJitterConfig::default())
    }

    /// Factor tensor for the selected rows, expanding per-environment
    /// factors across that environment's stacked frames.
    fn gather(&self, store: &FactorStore, selected: &[usize]) -> Tensor {
        let values = store.values();
        let gathered: Vec<f32> = selected
            .iter()
            .map(|&row| values[row / self.stack_size])
            .collect();
        Tensor::from_slice(&gathered).to_device(self.device)
    }

    fn adjust_contrast(x: &Tensor, factors: &Tensor) -> Tensor {
        let factors = factors.reshape([-1, 1, 1, 1]);
        let means = x.adaptive_avg_pool2d([1, 1]);
        ((x - &means) * &factors + &means).clamp(0.0, 1.0)
    }

    fn adjust_brightness(hsv: &Tensor, factors: &Tensor) -> Tensor {
        let factors = factors.reshape([-1, 1, 1]);
        let value = (hsv.select(1, 2) * &factors).clamp(0.0, 1.0);
        Tensor::stack(&[hsv.select(1, 0), hsv.select(1, 1), value], 1)
    }

    fn adjust_hue(hsv: &Tensor, factors: &Tensor) -> Tensor {
        let factors = factors.reshape([-1, 1, 1]);
        let hue = (hsv.select(1, 0) + &factors * (255.0 / 360.0)).remainder(1.0);
        Tensor::stack(&[hue, hsv.select(1, 1), hsv.select(1, 2)], 1)
    }

    fn adjust_saturation(hsv: &Tensor, factors: &Tensor) -> Tensor {
        let factors = factors.reshape([-1, 1, 1]);
        let saturation = (hsv.select(1, 1) * &factors).clamp(0.0, 1.0);
        Tensor::stack(&[hsv.select(1, 0), saturation, hsv.select(1, 2)], 1)
    }

    fn apply_contrast(&self, x: Tensor, selected: &[usize]) -> Tensor {
        match &self.contrast {
            Some(store) => Self::adjust_contrast(&x, &self.gather(store, selected)),
            None => x,
        }
    }

    /// HSV round trip with brightness, hue and saturation applied inside.
    fn apply_hsv_block(&self, x: Tensor, selected: &[usize]) -> Tensor {
        let mut hsv = rgb_to_hsv(&x);
        if let Some(store) = &self.brightness {
            hsv = Self::adjust_brightness(&hsv, &self.gather(store, selected));
        }
        if let Some(store) = &self.hue {
            hsv = Self::adjust_hue(&hsv, &self.gather(store, selected));
        }
        if let Some(store) = &self.saturation {
            hsv = Self::adjust_saturation(&hsv, &self.gather(store, selected));
        }
        hsv_to_rgb(&hsv)
    }

    /// Runs the five sub-transforms in one of the two orders, chosen
    /// 50/50 per call and applied uniformly to the whole selected subset.
    fn transform(&self, rgb: Tensor, selected: &[usize]) -> Tensor {
        if gen_bool(0.5) {
            let x = self.apply_contrast(rgb, selected);
            self.apply_hsv_block(x, selected)
        } else {
            let x = self.apply_hsv_block(rgb, selected);
            self.apply_contrast(x, selected)
        }
    }

    fn for_each_store(&mut self, mut f: impl FnMut(&mut FactorStore) -> Result<()>) -> Result<()> {
        for store in [
            &mut self.contrast,
            &mut self.hue,
            &mut self.brightness,
            &mut self.saturation,
        ]
        .into_iter()
        .flatten()
        {
            f(store)?;
        }
        Ok(())
    }
}

impl Augmenter for ColorJitter {
    fn apply(&self, batch: &Batch) -> Result<Batch> {
        check_channels(batch)?;
        let n = batch.shape()[0];
        let expected = self.batch_size * self.stack_size;
        if n != expected {
            bail!(AugmentError::Shape(format!(
                "batch holds {n} samples but the augmenter expects {expected} \
                 ({} environments x stack {})",
                self.batch_size, self.stack_size
            )));
        }

        // Fresh per-call selection; the persisted factor vectors are not
        // touched either way.
        let selected: Vec<usize> = (0..n).filter(|_| gen_bool(self.p_rand)).collect();
        if selected.is_empty() {
            return Ok(batch.clone());
        }

        let (h, w) = (batch.shape()[1], batch.shape()[2]);
        let pixels: Vec<u8> = batch.iter().copied().collect();
        let inputs = Tensor::from_slice(&pixels)
            .reshape([n as i64, h as i64, w as i64, 3])
            .permute([0, 3, 1, 2])
            .to_kind(Kind::Float)
            .to_device(self.device)
            / 255.0;

        let index: Vec<i64> = selected.iter().map(|&i| i as i64).collect();
        let index = Tensor::from_slice(&index).to_device(self.device);
        let subset = inputs.index_select(0, &index);
        let transformed = self.transform(subset, &selected);
        let outputs = inputs.index_copy(0, &index, &transformed);

        let outputs = (outputs * 255.0)
            .round()
            .clamp(0.0, 255.0)
            .permute([0, 2, 3, 1])
            .to_device(Device::Cpu)
            .contiguous();
        let flat: Vec<f32> = outputs.flatten(0, -1).try_into()?;
        let data: Vec<u8> = flat.into_iter().map(|v| v as u8).collect();
        Ok(Array4::from_shape_vec((n, h, w, 3), data)?)
    }

    fn resample_one(&mut self, index: usize) -> Result<()> {
        if index >= self.batch_size {
            bail!(AugmentError::IndexOutOfBounds {
                index,
                batch_size: self.batch_size,
            });
        }
        self.for_each_store(|store| store.resample_one(index))
    }

    fn resample_all(&mut self) {
        // Infallible: resample_all on a store cannot fail.
        let _ = self.for_each_store(|store| {
            store.resample_all();
            Ok(())
        });
    }

    fn introspect(&self) -> Vec<NamedParams> {
        let mut params = Vec::new();
        let mut push = |name: &'static str, store: &Option<FactorStore>| {
            if let Some(store) = store {
                params.push(NamedParams::new(
                    name,
                    ParamValues::Float(store.values().to_vec()),
                ));
            }
        };
        push("contrast", &self.contrast);
        push("hue", &self.hue);
        push("brightness", &self.brightness);
        push("saturation", &self.saturation);
        params
    }
}
