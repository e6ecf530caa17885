//! Error types for batch augmentation.

use thiserror::Error;

/// Failure kinds surfaced by augmenter construction and per-call
/// operations.
///
/// All of these indicate a programming or configuration error on the
/// caller's side, never a transient condition, so they propagate
/// immediately with no retry semantics. Public APIs return
/// `anyhow::Result`; this enum is the error source and stays reachable
/// through `downcast_ref`.
#[derive(Error, Debug)]
pub enum AugmentError {
    /// A range or probability parameter violates its documented bounds.
    #[error("invalid parameter: {0}")]
    Validation(String),

    /// `resample_one` was called with an index outside `[0, batch_size)`.
    #[error("sample index {index} out of bounds for batch size {batch_size}")]
    IndexOutOfBounds { index: usize, batch_size: usize },

    /// The input batch's sample count, image dimensions, or channel count
    /// does not match the augmenter's configuration.
    #[error("incompatible batch: {0}")]
    Shape(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AugmentError::IndexOutOfBounds {
            index: 9,
            batch_size: 4,
        };
        assert_eq!(
            err.to_string(),
            "sample index 9 out of bounds for batch size 4"
        );
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err = anyhow::Error::new(AugmentError::Validation("bad range".into()));
        assert!(matches!(
            err.downcast_ref::<AugmentError>(),
            Some(AugmentError::Validation(_))
        ));
    }
}
