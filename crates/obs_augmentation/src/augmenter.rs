//! The capability surface shared by every augmenter.

use crate::batch::Batch;
use anyhow::Result;

/// Current contents of one parameter vector, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValues {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f32>),
    Rgb(Vec<[u8; 3]>),
}

impl ParamValues {
    /// Number of per-sample entries in the vector.
    pub fn len(&self) -> usize {
        match self {
            ParamValues::Bool(v) => v.len(),
            ParamValues::Int(v) => v.len(),
            ParamValues::Float(v) => v.len(),
            ParamValues::Rgb(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named parameter vector as reported by [`Augmenter::introspect`].
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParams {
    pub name: &'static str,
    pub values: ParamValues,
}

impl NamedParams {
    pub fn new(name: &'static str, values: ParamValues) -> Self {
        Self { name, values }
    }
}

/// One randomized batch transform with persistent per-sample state.
///
/// `apply` is a pure function of the batch and the current parameter
/// vectors. The two resample operations are the only mutations, and they
/// take `&mut self`, so the single-writer / no-reader-during-write
/// discipline on one instance is enforced at compile time. Distinct
/// instances are independent and may be used from different threads.
pub trait Augmenter: Send {
    /// Transforms a batch using the current per-sample parameters.
    ///
    /// The sample count never changes; the crop augmenters change height
    /// and width, nothing else does.
    fn apply(&self, batch: &Batch) -> Result<Batch>;

    /// Redraws the parameters of the sample at `index`, e.g. when that
    /// environment instance resets.
    fn resample_one(&mut self, index: usize) -> Result<()>;

    /// Redraws the parameters of every sample.
    fn resample_all(&mut self);

    /// Current parameter vectors, for debugging and logging.
    fn introspect(&self) -> Vec<NamedParams>;
}
