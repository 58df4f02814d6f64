pub mod auth;
pub mod error;
mod sessions;
mod stats;
mod upload;
mod users;
mod validation;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Body of successful deletes
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// `?userId=` filter; an empty value means no filter.
fn user_filter(user_id: &Option<String>) -> Option<&str> {
    user_id.as_deref().filter(|id| !id.is_empty())
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/auth", post(auth::login))
        // Session requests
        .route(
            "/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/sessions/upcoming", get(sessions::upcoming_sessions))
        .route(
            "/sessions/:id",
            get(sessions::get_session)
                .patch(sessions::update_session_status)
                .delete(sessions::delete_session),
        )
        .route("/sessions/:id/download", get(sessions::download_session))
        // Uploads
        .route("/upload", post(upload::upload_pdf))
        // Dashboard
        .route("/stats", get(stats::get_stats))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .put(users::change_user_role)
                .delete(users::delete_user),
        );

    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    if state.config.server.cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
