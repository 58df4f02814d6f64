use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

use crate::db::{DashboardStats, SessionListQuery, UserStats};
use crate::AppState;

use super::error::ApiError;
use super::user_filter;

/// Session counters (all or one user's) plus the total number of users
///
/// GET /api/stats?userId=
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<DashboardStats>, ApiError> {
    let sessions = state.sessions.stats(user_filter(&query.user_id)).await?;
    let users = UserStats {
        total: state.users.count().await?,
    };
    Ok(Json(DashboardStats { sessions, users }))
}
