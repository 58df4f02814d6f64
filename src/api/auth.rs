use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{LoginRequest, UserResponse};
use crate::service::ServiceError;
use crate::AppState;

use super::error::{ApiError, ApiJson};

/// Check credentials and return the matching user. No token is issued; the
/// client keeps the returned record as its session.
///
/// POST /api/auth
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    match state
        .users
        .authenticate(&request.email, &request.password)
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, role = %user.role, "User logged in");
            Ok(Json(user))
        }
        Err(ServiceError::InvalidCredentials) => {
            warn!(email = %request.email, "Failed login attempt");
            Err(ApiError::unauthorized("Invalid credentials"))
        }
        Err(e) => Err(e.into()),
    }
}
