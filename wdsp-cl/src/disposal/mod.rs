//! Static disposal tables: knowledge base and label resolver

pub mod knowledge_base;
pub mod label_resolver;

pub use knowledge_base::{Category, DisposalRecord, KnowledgeBase, UNIDENTIFIED};
pub use label_resolver::{DanglingMapping, LabelResolver};
