//! Classification pipeline
//!
//! normalize → infer → rank top-K → resolve first mapped label → record.
//!
//! Only an undecodable upload is reported to the caller as an error. A failed
//! inference or a top-K window without any mapped label both end in the
//! `UNIDENTIFIED` record.

use std::sync::Arc;

use tracing::{info, warn};

use crate::disposal::{DisposalRecord, KnowledgeBase, LabelResolver, UNIDENTIFIED};
use crate::error::{Error, Result};
use crate::vision::{ImageClassifier, ImageNormalizer, Prediction};

/// Default number of ranked predictions considered for resolution
pub const DEFAULT_TOP_K: usize = 3;

/// Outcome of one classification request
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub record: DisposalRecord,
    /// Top-K predictions, best first
    pub candidates: Vec<Prediction>,
    /// Raw label that resolved, `None` for the unidentified outcome
    pub matched_label: Option<String>,
}

impl Classification {
    pub fn is_identified(&self) -> bool {
        self.matched_label.is_some()
    }
}

/// Process-wide pipeline; all parts are read-only after construction
pub struct ClassificationPipeline {
    normalizer: ImageNormalizer,
    classifier: Arc<dyn ImageClassifier>,
    resolver: LabelResolver,
    knowledge_base: KnowledgeBase,
    top_k: usize,
}

impl ClassificationPipeline {
    /// Assemble the pipeline
    ///
    /// Fails with `Error::Config` if `top_k` is zero or the resolver maps any
    /// label to a key the knowledge base does not contain.
    pub fn new(
        normalizer: ImageNormalizer,
        classifier: Arc<dyn ImageClassifier>,
        resolver: LabelResolver,
        knowledge_base: KnowledgeBase,
        top_k: usize,
    ) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }

        if let Err(dangling) = resolver.validate_against(&knowledge_base) {
            let listed: Vec<String> = dangling
                .iter()
                .map(|d| format!("{} -> {}", d.raw_label, d.item_key))
                .collect();
            return Err(Error::Config(format!(
                "Label map references unknown item keys: {}",
                listed.join(", ")
            )));
        }

        info!(
            "Classification pipeline ready: classifier={}, labels mapped={}, items={}, top_k={}",
            classifier.name(),
            resolver.len(),
            knowledge_base.len(),
            top_k
        );

        Ok(Self {
            normalizer,
            classifier,
            resolver,
            knowledge_base,
            top_k,
        })
    }

    /// Classify one uploaded image
    ///
    /// Blocking: runs inference on the calling thread.
    pub fn classify(&self, image_bytes: &[u8]) -> Result<Classification> {
        let input = self.normalizer.normalize(image_bytes)?;

        let predictions = match self.classifier.infer(input) {
            Ok(predictions) => predictions,
            Err(e) => {
                warn!("Inference failed, returning unidentified record: {}", e);
                return Ok(Classification {
                    record: UNIDENTIFIED,
                    candidates: Vec::new(),
                    matched_label: None,
                });
            }
        };

        let candidates = rank_top_k(predictions, self.top_k);
        info!("Classifier predictions: [{}]", format_candidates(&candidates));

        Ok(self.resolve(candidates))
    }

    /// First candidate whose label maps to a known item wins
    pub fn resolve(&self, candidates: Vec<Prediction>) -> Classification {
        for candidate in &candidates {
            let Some(key) = self.resolver.resolve(&candidate.label) else {
                continue;
            };
            if let Some(record) = self.knowledge_base.lookup(key) {
                info!(
                    "Resolved '{}' ({:.3}) to item '{}'",
                    candidate.label, candidate.confidence, key
                );
                let matched_label = Some(candidate.label.clone());
                return Classification {
                    record: *record,
                    candidates,
                    matched_label,
                };
            }
        }

        info!(
            "No mapped label in top-{} predictions, returning unidentified record",
            self.top_k
        );
        Classification {
            record: UNIDENTIFIED,
            candidates,
            matched_label: None,
        }
    }
}

/// Rank by descending confidence and keep the best `k`
///
/// The sort is stable, so equal confidences keep the classifier's order.
/// Non-finite scores are dropped.
pub fn rank_top_k(mut predictions: Vec<Prediction>, k: usize) -> Vec<Prediction> {
    predictions.retain(|p| p.confidence.is_finite());
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    predictions.truncate(k);
    predictions
}

fn format_candidates(candidates: &[Prediction]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
