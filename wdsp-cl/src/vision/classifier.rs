//! Classifier capability consumed by the pipeline
//!
//! The model is a black box: given a normalized image tensor it returns
//! scored labels from its fixed vocabulary. The pipeline only depends on this
//! trait, so policy tests run against scripted outputs instead of real weights.

use std::fmt;

use tract_onnx::prelude::Tensor;

use crate::error::Result;

/// One scored label from the classifier's vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Probability in `[0, 1]`
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3})", self.label, self.confidence)
    }
}

/// Image classifier shared read-only across requests
///
/// `infer` is a blocking call. Implementations may serialize internally.
pub trait ImageClassifier: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Score the input tensor
    ///
    /// The result need not be sorted; the pipeline ranks it.
    fn infer(&self, input: Tensor) -> Result<Vec<Prediction>>;
}
