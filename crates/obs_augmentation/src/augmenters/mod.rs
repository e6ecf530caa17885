//! The concrete augmenters.

pub mod color_jitter;
pub mod crop;
pub mod cutout;
pub mod flip;
pub mod grayscale;
pub mod rotate;

pub use color_jitter::{ColorJitter, ColorJitterConfig, ColorJitterConfigBuilder, FactorRange};
pub use crop::{CenterCrop, RandomCrop};
pub use cutout::{ColorCutout, Cutout};
pub use flip::RandomFlip;
pub use grayscale::RandomGrayscale;
pub use rotate::RandomRotate;
