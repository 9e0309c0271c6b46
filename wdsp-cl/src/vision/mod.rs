//! Image normalization and classifier backends

pub mod classifier;
pub mod fake_classifier;
pub mod normalizer;
pub mod tract_classifier;

pub use classifier::{ImageClassifier, Prediction};
pub use fake_classifier::ScriptedClassifier;
pub use normalizer::{ImageNormalizer, InputSpec, Preprocessing, TensorLayout};
pub use tract_classifier::TractClassifier;
