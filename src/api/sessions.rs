use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{
    CreateSessionRequest, NewSessionRequest, SessionDownload, SessionListQuery, SessionRequest,
    UpdateSessionStatusRequest,
};
use crate::AppState;

use super::error::{ApiError, ApiJson, ValidationErrorBuilder};
use super::validation::{require, validate_requested_date, validate_status, validate_text_len};
use super::{user_filter, SuccessResponse};

/// Validate a create body, reporting every missing field at once
fn validate_create_request(req: CreateSessionRequest) -> Result<NewSessionRequest, ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    let mut required = |value: Option<String>, field: &str| match require(value, field) {
        Ok(v) => v,
        Err(e) => {
            errors.add(field, e);
            String::new()
        }
    };

    let title = required(req.title, "title");
    let user_id = required(req.user_id, "userId");
    let user_name = required(req.user_name, "userName");
    let user_email = required(req.user_email, "userEmail");
    let pdf_path = required(req.pdf_path, "pdfPath");
    let original_file_name = required(req.original_file_name, "originalFileName");
    let requested_date = required(req.requested_date, "requestedDate");
    let requested_time = required(req.requested_time, "requestedTime");
    let description = req.description.unwrap_or_default();

    let requested_date = if requested_date.is_empty() {
        None
    } else {
        match validate_requested_date(&requested_date) {
            Ok(date) => Some(date),
            Err(e) => {
                errors.add("requestedDate", e);
                None
            }
        }
    };

    if let Err(e) = validate_text_len(&title, "title") {
        errors.add("title", e);
    }
    if let Err(e) = validate_text_len(&description, "description") {
        errors.add("description", e);
    }

    errors.finish()?;

    let requested_date = requested_date.ok_or_else(|| {
        ApiError::validation_field("requestedDate", "requestedDate is required")
    })?;

    Ok(NewSessionRequest {
        title,
        description,
        user_id,
        user_name,
        user_email,
        pdf_path,
        original_file_name,
        file_size: req.file_size.unwrap_or(0),
        requested_date,
        requested_time,
    })
}

/// List session requests, optionally for one user
///
/// GET /api/sessions?userId=
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<SessionRequest>>, ApiError> {
    let sessions = state.sessions.list(user_filter(&query.user_id)).await?;
    Ok(Json(sessions))
}

/// Create a session request in `pending` state
///
/// POST /api/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionRequest>), ApiError> {
    let input = validate_create_request(req)?;
    let session = state.sessions.create(input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Approved sessions from today onward, soonest first
///
/// GET /api/sessions/upcoming?userId=
pub async fn upcoming_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<SessionRequest>>, ApiError> {
    let sessions = state.sessions.upcoming(user_filter(&query.user_id)).await?;
    Ok(Json(sessions))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionRequest>, ApiError> {
    Ok(Json(state.sessions.get(&id).await?))
}

/// Approve, reject or reset a session request
///
/// PATCH /api/sessions/:id
pub async fn update_session_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateSessionStatusRequest>,
) -> Result<Json<SessionRequest>, ApiError> {
    let status = validate_status(req.status.as_deref())
        .map_err(|e| ApiError::validation_field("status", e))?;

    if let Some(ref notes) = req.admin_notes {
        validate_text_len(notes, "adminNotes")
            .map_err(|e| ApiError::validation_field("adminNotes", e))?;
    }

    let session = state
        .sessions
        .set_status(&id, status, req.admin_notes)
        .await?;
    Ok(Json(session))
}

/// Delete a session request and its uploaded file
///
/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.sessions.delete(&id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// The session's PDF as base64
///
/// GET /api/sessions/:id/download
pub async fn download_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionDownload>, ApiError> {
    Ok(Json(state.sessions.download(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorCode;

    fn full_request() -> CreateSessionRequest {
        CreateSessionRequest {
            title: Some("Review".to_string()),
            description: None,
            user_id: Some("u1".to_string()),
            user_name: Some("Ada".to_string()),
            user_email: Some("ada@example.com".to_string()),
            pdf_path: Some("abc.pdf".to_string()),
            original_file_name: Some("draft.pdf".to_string()),
            file_size: Some(1024),
            requested_date: Some("2030-01-02".to_string()),
            requested_time: Some("2:00 PM".to_string()),
        }
    }

    #[test]
    fn test_validate_create_request_ok() {
        let input = validate_create_request(full_request()).unwrap();
        assert_eq!(input.title, "Review");
        assert_eq!(input.description, "");
        assert_eq!(input.file_size, 1024);
        assert_eq!(input.requested_date.to_string(), "2030-01-02");
    }

    #[test]
    fn test_validate_create_request_reports_missing_fields() {
        let mut req = full_request();
        req.title = None;
        req.pdf_path = Some(String::new());

        let err = validate_create_request(req).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("2 fields"));
    }

    #[test]
    fn test_validate_create_request_rejects_bad_date() {
        let mut req = full_request();
        req.requested_date = Some("next tuesday".to_string());

        let err = validate_create_request(req).unwrap_err();
        assert!(err.message().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_validate_create_request_empty_body() {
        let err = validate_create_request(CreateSessionRequest::default()).unwrap_err();
        assert!(err.message().contains("8 fields"));
    }
}
