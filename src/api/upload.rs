use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::storage::PDF_MIME_TYPE;
use crate::AppState;

use super::error::ApiError;

/// Name of the multipart field carrying the PDF
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_name: String,
    pub original_name: String,
    pub size: u64,
}

fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME_TYPE))
        .unwrap_or(false)
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::bad_request(format!("Invalid upload: {}", err.body_text())).with_status(err.status())
}

/// Store a PDF under a generated name. The content type is checked before
/// the body is read, so rejected uploads never touch the disk.
///
/// POST /api/upload
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        if !is_pdf(field.content_type()) {
            return Err(ApiError::bad_request("Only PDF files are allowed"));
        }

        let original_name = field.file_name().unwrap_or("document.pdf").to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        let stored = state.sessions.upload_pdf(&original_name, &data).await?;

        return Ok(Json(UploadResponse {
            success: true,
            file_name: stored.file_name,
            original_name,
            size: stored.size,
        }));
    }

    Err(ApiError::bad_request("No file provided"))
}
