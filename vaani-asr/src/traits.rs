//! Seams between the pipeline and its pluggable components.

use crate::error::Result;
use crate::preprocessor::Features;
use crate::types::ModelOutput;
use ndarray::ArrayD;

/// Acoustic model mapping features to per-frame token scores.
///
/// Implementations must be safe to share across threads: [`infer`] takes
/// `&self` and may be called concurrently. Models backed by a runtime
/// session that needs exclusive access serialize calls internally.
///
/// Any closure `Fn(&Features) -> Result<ArrayD<f32>>` is an acoustic model,
/// which keeps tests free of a real runtime.
///
/// [`infer`]: AcousticModel::infer
pub trait AcousticModel: Send + Sync {
    /// Run inference on one utterance.
    fn infer(&self, features: &Features) -> Result<ModelOutput>;
}

impl<F> AcousticModel for F
where
    F: Fn(&Features) -> Result<ArrayD<f32>> + Send + Sync,
{
    fn infer(&self, features: &Features) -> Result<ModelOutput> {
        ModelOutput::from_dyn(self(features)?)
    }
}

