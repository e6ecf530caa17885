//! Batch observation augmentation for visual reinforcement-learning agents.
//!
//! Every augmenter owns a per-sample vector of randomized transform
//! parameters that persists across calls, so the temporally stacked frames
//! of one environment instance keep receiving the same transform until that
//! environment is refreshed. [`Augmenter::resample_one`] redraws the
//! parameters of a single sample (e.g. on an environment reset);
//! [`Augmenter::resample_all`] redraws the whole batch.
//!
//! # Example
//! ```ignore
//! use obs_augmentation::{Augmenter, RandomFlip};
//!
//! let mut flip = RandomFlip::new(32, 0.5)?;
//! let augmented = flip.apply(&observations)?;
//! flip.resample_one(3)?; // environment 3 reset
//! ```

pub mod augmenter;
pub mod augmenters;
pub mod batch;
pub mod color;
pub mod error;
pub mod params;
pub mod rng;

pub use augmenter::{Augmenter, NamedParams, ParamValues};
pub use augmenters::{
    CenterCrop, ColorCutout, ColorJitter, ColorJitterConfig, Cutout, FactorRange, RandomCrop,
    RandomFlip, RandomGrayscale, RandomRotate,
};
pub use batch::Batch;
pub use error::AugmentError;
pub use params::ParamStore;
