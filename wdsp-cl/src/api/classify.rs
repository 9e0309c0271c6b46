//! Classification endpoint
//!
//! POST /classify with a multipart form whose `file` part carries the image.
//! Input-shape problems are rejected before the pipeline runs.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::disposal::DisposalRecord;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// JSON body returned for every successful classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposalResponse {
    pub name: String,
    /// Display label, e.g. `Recycle ♻️`
    pub category: String,
    /// CSS class for the frontend, e.g. `recycle`
    pub class_name: String,
    pub instructions: String,
    pub tip: String,
}

impl From<&DisposalRecord> for DisposalResponse {
    fn from(record: &DisposalRecord) -> Self {
        Self {
            name: record.name.to_string(),
            category: record.category.display_label().to_string(),
            class_name: record.category.class_name().to_string(),
            instructions: record.instructions.to_string(),
            tip: record.tip.to_string(),
        }
    }
}

struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// POST /classify
pub async fn classify_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<DisposalResponse>> {
    let multipart = multipart.map_err(|e| {
        debug!("Request is not a multipart upload: {}", e);
        ApiError::MissingFile
    })?;

    let upload = read_upload(multipart).await?;
    info!(
        "Classifying upload '{}' ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let pipeline = Arc::clone(&state.pipeline);
    let classification = tokio::task::spawn_blocking(move || pipeline.classify(&upload.bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("Classification task failed: {}", e)))??;

    Ok(Json(DisposalResponse::from(&classification.record)))
}

/// Pull the first `file` part with a filename; other fields are skipped
async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD && upload.is_none() {
            if let Some(file_name) = field.file_name().map(str::to_string) {
                if file_name.is_empty() {
                    return Err(ApiError::EmptyFilename);
                }
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some(Upload { file_name, bytes });
                continue;
            }
        }

        debug!("Ignoring form field '{}'", name);
    }

    upload.ok_or(ApiError::MissingFile)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
