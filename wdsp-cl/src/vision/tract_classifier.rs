//! ONNX classifier backend executed with tract
//!
//! Loads an ImageNet-style classification model plus its label vocabulary.
//! Two vocabulary formats are accepted:
//! - `.json`: Keras `imagenet_class_index.json` (`{"0": ["n01440764", "tench"], ...}`)
//! - anything else: one label per line, optionally prefixed by a WordNet id
//!   (`n04557648 water_bottle`)

use std::path::Path;

use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::vision::classifier::{ImageClassifier, Prediction};
use crate::vision::normalizer::InputSpec;

type RunnableOnnx = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

pub struct TractClassifier {
    model: RunnableOnnx,
    labels: Vec<String>,
}

impl TractClassifier {
    /// Load model and vocabulary, pinning the model input to `spec`'s shape
    pub fn load(model_path: &Path, labels_path: &Path, spec: &InputSpec) -> Result<Self> {
        let labels = load_labels(labels_path)?;
        info!(
            "Loaded {} labels from {}",
            labels.len(),
            labels_path.display()
        );

        let shape = spec.shape();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| model.with_input_fact(0, f32::fact(shape).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                Error::Model(format!("Failed to load {}: {}", model_path.display(), e))
            })?;
        info!(
            "Loaded ONNX model {} with input shape {:?}",
            model_path.display(),
            shape
        );

        Ok(Self { model, labels })
    }
}

impl ImageClassifier for TractClassifier {
    fn name(&self) -> &str {
        "tract-onnx"
    }

    fn infer(&self, input: Tensor) -> Result<Vec<Prediction>> {
        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(|e| Error::Inference(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| Error::Inference("Model produced no outputs".to_string()))?;
        debug!("Model output shape: {:?}", output.shape());

        let scores = output
            .as_slice::<f32>()
            .map_err(|e| Error::Inference(format!("Unexpected output type: {}", e)))?;

        decode_scores(scores, &self.labels)
    }
}

/// Pair raw output scores with vocabulary labels
///
/// One extra leading score (background class) is dropped. Scores that are not
/// already probabilities are passed through softmax.
pub fn decode_scores(scores: &[f32], labels: &[String]) -> Result<Vec<Prediction>> {
    let scores = if scores.len() == labels.len() {
        scores
    } else if scores.len() == labels.len() + 1 {
        &scores[1..]
    } else {
        return Err(Error::Inference(format!(
            "Model produced {} scores for a vocabulary of {} labels",
            scores.len(),
            labels.len()
        )));
    };

    let is_probability = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let probabilities = if is_probability {
        scores.to_vec()
    } else {
        softmax(scores)
    };

    Ok(labels
        .iter()
        .zip(probabilities)
        .map(|(label, confidence)| Prediction::new(label.clone(), confidence))
        .collect())
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

/// Read a label vocabulary file
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Model(format!("Failed to read labels {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let labels = if is_json {
        parse_class_index_json(&content)?
    } else {
        parse_label_lines(&content)
    };

    if labels.is_empty() {
        return Err(Error::Model(format!(
            "Label file {} contains no labels",
            path.display()
        )));
    }

    Ok(labels)
}

/// Parse Keras `imagenet_class_index.json`
pub fn parse_class_index_json(content: &str) -> Result<Vec<String>> {
    let index: std::collections::HashMap<String, (String, String)> =
        serde_json::from_str(content)
            .map_err(|e| Error::Model(format!("Invalid class index JSON: {}", e)))?;

    let mut entries = index
        .into_iter()
        .map(|(idx, (_wnid, label))| {
            idx.parse::<usize>()
                .map(|i| (i, label))
                .map_err(|_| Error::Model(format!("Invalid class index '{}'", idx)))
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by_key(|(i, _)| *i);

    for (expected, (actual, _)) in entries.iter().enumerate() {
        if expected != *actual {
            return Err(Error::Model(format!(
                "Class index has a gap: expected {}, found {}",
                expected, actual
            )));
        }
    }

    Ok(entries.into_iter().map(|(_, label)| label).collect())
}

/// Parse a one-label-per-line vocabulary
pub fn parse_label_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(char::is_whitespace) {
            Some((first, rest)) if is_wordnet_id(first) => rest.trim().to_string(),
            _ => line.to_string(),
        })
        .collect()
}

fn is_wordnet_id(token: &str) -> bool {
    token.len() == 9
        && token.starts_with('n')
        && token[1..].chars().all(|c| c.is_ascii_digit())
}
