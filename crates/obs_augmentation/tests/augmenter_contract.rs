//! Contract tests run against every augmenter through the trait-object
//! surface.
//!
//! Tests cover:
//! - sample-count preservation on apply
//! - height/width/channel preservation for the non-crop augmenters
//! - resample-one touching exactly one index
//! - resample-all refreshing state
//! - out-of-range resample indices
//! - batch-size mismatch rejection

mod common;
use common::gradient_batch;
use obs_augmentation::{
    rng::seed_rng, AugmentError, Augmenter, CenterCrop, ColorCutout, ColorJitter, Cutout,
    ParamValues, RandomCrop, RandomFlip, RandomGrayscale, RandomRotate,
};

use anyhow::Result;

const BATCH_SIZE: usize = 6;

/// Every augmenter, behind the shared trait.
fn build_all() -> Result<Vec<(&'static str, Box<dyn Augmenter>)>> {
    Ok(vec![
        (
            "grayscale",
            Box::new(RandomGrayscale::new(BATCH_SIZE, 0.5)?),
        ),
        ("flip", Box::new(RandomFlip::new(BATCH_SIZE, 0.5)?)),
        ("rotate", Box::new(RandomRotate::new(BATCH_SIZE)?)),
        ("cutout", Box::new(Cutout::with_defaults(BATCH_SIZE)?)),
        (
            "color_cutout",
            Box::new(ColorCutout::with_defaults(BATCH_SIZE)?),
        ),
        ("random_crop", Box::new(RandomCrop::new(BATCH_SIZE)?)),
        ("center_crop", Box::new(CenterCrop)),
        (
            "color_jitter",
            Box::new(ColorJitter::with_defaults(BATCH_SIZE)?),
        ),
    ])
}

/// Indices where two snapshots of one parameter vector differ.
fn changed_indices(before: &ParamValues, after: &ParamValues) -> Vec<usize> {
    fn diff<T: PartialEq>(before: &[T], after: &[T]) -> Vec<usize> {
        before
            .iter()
            .zip(after)
            .enumerate()
            .filter(|(_, (b, a))| b != a)
            .map(|(i, _)| i)
            .collect()
    }
    match (before, after) {
        (ParamValues::Bool(b), ParamValues::Bool(a)) => diff(b, a),
        (ParamValues::Int(b), ParamValues::Int(a)) => diff(b, a),
        (ParamValues::Float(b), ParamValues::Float(a)) => diff(b, a),
        (ParamValues::Rgb(b), ParamValues::Rgb(a)) => diff(b, a),
        _ => panic!("parameter vector changed type across a resample"),
    }
}

// ================================================================================================
// Apply
// ================================================================================================

#[test]
fn test_apply_preserves_sample_count() -> Result<()> {
    seed_rng(42);
    // Square and >= 64 on both sides so every augmenter accepts it.
    let batch = gradient_batch(BATCH_SIZE, 96, 96);
    for (name, augmenter) in build_all()? {
        let out = augmenter.apply(&batch)?;
        assert_eq!(out.shape()[0], BATCH_SIZE, "{name} changed sample count");
        assert_eq!(out.shape()[3], 3, "{name} changed channel count");
    }
    Ok(())
}

#[test]
fn test_non_crop_augmenters_preserve_dimensions() -> Result<()> {
    seed_rng(42);
    let batch = gradient_batch(BATCH_SIZE, 96, 96);
    for (name, augmenter) in build_all()? {
        if matches!(name, "random_crop" | "center_crop") {
            continue;
        }
        let out = augmenter.apply(&batch)?;
        assert_eq!(out.shape(), batch.shape(), "{name} changed dimensions");
    }
    Ok(())
}

#[test]
fn test_crop_augmenters_emit_64x64() -> Result<()> {
    seed_rng(42);
    let batch = gradient_batch(BATCH_SIZE, 96, 96);
    for (name, augmenter) in build_all()? {
        if !matches!(name, "random_crop" | "center_crop") {
            continue;
        }
        let out = augmenter.apply(&batch)?;
        assert_eq!(out.shape(), &[BATCH_SIZE, 64, 64, 3], "{name} output shape");
    }
    Ok(())
}

#[test]
fn test_apply_does_not_mutate_parameters() -> Result<()> {
    seed_rng(42);
    let batch = gradient_batch(BATCH_SIZE, 96, 96);
    for (name, augmenter) in build_all()? {
        let before = augmenter.introspect();
        augmenter.apply(&batch)?;
        assert_eq!(before, augmenter.introspect(), "{name} mutated state");
    }
    Ok(())
}

#[test]
fn test_wrong_sample_count_rejected() -> Result<()> {
    seed_rng(42);
    let batch = gradient_batch(BATCH_SIZE + 1, 96, 96);
    for (name, augmenter) in build_all()? {
        if name == "center_crop" {
            continue; // sized by the batch itself
        }
        let err = augmenter.apply(&batch).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<AugmentError>(),
                Some(AugmentError::Shape(_))
            ),
            "{name} accepted a mismatched batch"
        );
    }
    Ok(())
}

// ================================================================================================
// Resampling
// ================================================================================================

#[test]
fn test_resample_one_touches_only_that_index() -> Result<()> {
    seed_rng(42);
    for (name, mut augmenter) in build_all()? {
        let before = augmenter.introspect();
        augmenter.resample_one(2)?;
        let after = augmenter.introspect();

        for (b, a) in before.iter().zip(&after) {
            let changed = changed_indices(&b.values, &a.values);
            // A redraw may land on the previous value (booleans, rotation
            // classes), so the difference set is at most {2}.
            assert!(
                changed.iter().all(|&i| i == 2),
                "{name}: resample_one(2) changed indices {changed:?} in {}",
                b.name
            );
        }
    }
    Ok(())
}

#[test]
fn test_resample_all_redraws_continuous_state() -> Result<()> {
    seed_rng(42);
    let mut jitter = ColorJitter::with_defaults(16)?;
    let before = jitter.introspect();
    jitter.resample_all();
    let after = jitter.introspect();

    // Statistical, not a hard equality: 4 x 16 fresh uniform floats all
    // colliding with their predecessors does not happen.
    assert_ne!(before, after);
    Ok(())
}

#[test]
fn test_resample_one_out_of_bounds() -> Result<()> {
    for (name, mut augmenter) in build_all()? {
        if name == "center_crop" {
            // Stateless: resampling is a callable no-op at any index.
            augmenter.resample_one(BATCH_SIZE)?;
            continue;
        }
        let err = augmenter.resample_one(BATCH_SIZE).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<AugmentError>(),
                Some(AugmentError::IndexOutOfBounds {
                    index,
                    batch_size,
                }) if *index == BATCH_SIZE && *batch_size == BATCH_SIZE
            ),
            "{name} reported the wrong error for an out-of-range index"
        );
    }
    Ok(())
}

#[test]
fn test_introspection_is_batch_sized() -> Result<()> {
    seed_rng(42);
    for (name, augmenter) in build_all()? {
        for params in augmenter.introspect() {
            assert_eq!(
                params.values.len(),
                BATCH_SIZE,
                "{name}/{} vector length",
                params.name
            );
        }
    }
    Ok(())
}
