use std::sync::Mutex;

use tract_onnx::prelude::Tensor;

use crate::error::{Error, Result};
use crate::vision::classifier::{ImageClassifier, Prediction};

/// Classifier returning a fixed script, for exercising pipeline policy
/// without model weights
pub struct ScriptedClassifier {
    output: std::result::Result<Vec<Prediction>, String>,
    last_shape: Mutex<Option<Vec<usize>>>,
}

impl ScriptedClassifier {
    /// Always answer with these `(label, confidence)` pairs, in this order
    pub fn new<L: Into<String>>(predictions: Vec<(L, f32)>) -> Self {
        Self {
            output: Ok(predictions
                .into_iter()
                .map(|(label, confidence)| Prediction::new(label, confidence))
                .collect()),
            last_shape: Mutex::new(None),
        }
    }

    /// Always fail inference with this message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            output: Err(message.into()),
            last_shape: Mutex::new(None),
        }
    }

    /// Shape of the most recent input tensor, if `infer` has been called
    pub fn last_input_shape(&self) -> Option<Vec<usize>> {
        self.last_shape
            .lock()
            .map(|shape| shape.clone())
            .unwrap_or(None)
    }
}

impl ImageClassifier for ScriptedClassifier {
    fn name(&self) -> &str {
        "scripted"
    }

    fn infer(&self, input: Tensor) -> Result<Vec<Prediction>> {
        if let Ok(mut shape) = self.last_shape.lock() {
            *shape = Some(input.shape().to_vec());
        }

        self.output.clone().map_err(Error::Inference)
    }
}
