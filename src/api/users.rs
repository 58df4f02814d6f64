use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{ChangeRoleRequest, CreateUserRequest, UpdateUserRequest, UserResponse, UserRole};
use crate::service::users::NewUser;
use crate::AppState;

use super::error::{ApiError, ApiJson, ValidationErrorBuilder};
use super::validation::{require, validate_email, validate_password, validate_role, validate_text_len};
use super::SuccessResponse;

fn validate_create_request(req: CreateUserRequest) -> Result<NewUser, ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    let name = require(req.name, "Name").unwrap_or_else(|e| {
        errors.add("name", e);
        String::new()
    });
    let email = require(req.email, "Email").unwrap_or_else(|e| {
        errors.add("email", e);
        String::new()
    });
    let password = require(req.password, "Password").unwrap_or_else(|e| {
        errors.add("password", e);
        String::new()
    });

    if !email.is_empty() {
        if let Err(e) = validate_email(&email) {
            errors.add("email", e);
        }
    }
    if let Err(e) = validate_text_len(&name, "Name") {
        errors.add("name", e);
    }
    if !password.is_empty() {
        if let Err(e) = validate_password(&password) {
            errors.add("password", e);
        }
    }

    errors.finish()?;

    // Anything but an explicit "admin" creates a regular user
    let role = match req.role.as_deref() {
        Some("admin") => UserRole::Admin,
        _ => UserRole::User,
    };

    Ok(NewUser {
        name,
        email,
        password,
        role,
    })
}

fn validate_update_request(req: &UpdateUserRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref name) = req.name {
        if name.trim().is_empty() {
            errors.add("name", "Name cannot be empty");
        } else if let Err(e) = validate_text_len(name, "Name") {
            errors.add("name", e);
        }
    }

    if let Some(ref email) = req.email {
        if let Err(e) = validate_email(email) {
            errors.add("email", e);
        }
    }

    if let Some(ref password) = req.password {
        if let Err(e) = validate_password(password) {
            errors.add("password", e);
        }
    }

    errors.finish()
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

/// Create a user; duplicate emails are rejected with 409
///
/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let input = validate_create_request(req)?;
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(state.users.get(&id).await?))
}

/// Partial update of name, email, password or role
///
/// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_update_request(&req)?;
    Ok(Json(state.users.update(&id, req).await?))
}

/// Change only the role
///
/// PUT /api/users/:id
pub async fn change_user_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ChangeRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role =
        validate_role(req.role.as_deref()).map_err(|e| ApiError::validation_field("role", e))?;
    Ok(Json(state.users.change_role(&id, role).await?))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.users.delete(&id).await?;
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            name: Some("Grace".to_string()),
            email: Some("grace@example.com".to_string()),
            password: Some("hopper".to_string()),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_role_defaults_to_user() {
        assert_eq!(validate_create_request(request(None)).unwrap().role, UserRole::User);
        assert_eq!(
            validate_create_request(request(Some("superuser"))).unwrap().role,
            UserRole::User
        );
        assert_eq!(
            validate_create_request(request(Some("admin"))).unwrap().role,
            UserRole::Admin
        );
    }

    #[test]
    fn test_create_requires_name_email_password() {
        let err = validate_create_request(CreateUserRequest::default()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("3 fields"));
    }

    #[test]
    fn test_create_rejects_bad_email() {
        let mut req = request(None);
        req.email = Some("not-an-email".to_string());
        let err = validate_create_request(req).unwrap_err();
        assert_eq!(err.message(), "Invalid email format");
    }

    #[test]
    fn test_update_validation() {
        assert!(validate_update_request(&UpdateUserRequest::default()).is_ok());

        let req = UpdateUserRequest {
            name: Some(" ".to_string()),
            email: Some("bad".to_string()),
            ..Default::default()
        };
        assert!(validate_update_request(&req).is_err());
    }
}
