//! HTTP API handlers for wdsp-cl

pub mod buildinfo;
pub mod classify;
pub mod health;

pub use buildinfo::get_build_info;
pub use classify::{classify_image, DisposalResponse, FILE_FIELD};
pub use health::health_routes;
