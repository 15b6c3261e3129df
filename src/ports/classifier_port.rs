//! Classifier port trait.

use crate::domain::error::AlphaCrossError;
use crate::domain::label_codec::{ClassifierSample, FEATURE_COUNT};

/// A multi-class probabilistic classifier over fixed-width feature rows.
///
/// Classes are dense indices `0..n_classes`.
pub trait Classifier {
    fn fit(&mut self, samples: &[ClassifierSample], n_classes: usize)
        -> Result<(), AlphaCrossError>;

    /// Probability per class index; sums to 1.
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<Vec<f64>, AlphaCrossError>;
}
