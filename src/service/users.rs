//! User accounts: CRUD, role assignment and credential checks.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::crypto::{hash_password, verify_password};
use crate::db::{JsonStore, UpdateUserRequest, User, UserResponse, UserRole};

const ENTITY: &str = "User";
const EMAIL_CONFLICT: &str = "Email already exists";

/// Validated input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

pub struct UserService {
    store: JsonStore<User>,
}

impl UserService {
    pub fn new(store: JsonStore<User>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ServiceResult<Vec<UserResponse>> {
        Ok(self
            .store
            .load()
            .await?
            .into_iter()
            .map(UserResponse::from)
            .collect())
    }

    pub async fn count(&self) -> ServiceResult<usize> {
        Ok(self.store.load().await?.len())
    }

    pub async fn get(&self, id: &str) -> ServiceResult<UserResponse> {
        self.store
            .find(id)
            .await?
            .map(UserResponse::from)
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    pub async fn create(&self, input: NewUser) -> ServiceResult<UserResponse> {
        let password = hash_password(&input.password)?;

        let mut writer = self.store.write().await?;
        if writer.records().iter().any(|u| u.email == input.email) {
            return Err(ServiceError::Conflict(EMAIL_CONFLICT.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            password,
            role: input.role,
            created_at: now,
            updated_at: now,
        };
        writer.push(user.clone());
        writer.commit().await?;

        info!(user_id = %user.id, email = %user.email, role = %user.role, "User created");
        Ok(user.into())
    }

    /// Apply the fields present in `changes`. Changing the email to one held
    /// by another user is a conflict.
    pub async fn update(&self, id: &str, changes: UpdateUserRequest) -> ServiceResult<UserResponse> {
        let password = changes
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;

        let mut writer = self.store.write().await?;
        let current_email = writer
            .records()
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.email.clone())
            .ok_or(ServiceError::NotFound(ENTITY))?;

        if let Some(email) = changes.email.as_deref() {
            let taken = email != current_email
                && writer.records().iter().any(|u| u.email == email && u.id != id);
            if taken {
                return Err(ServiceError::Conflict(EMAIL_CONFLICT.to_string()));
            }
        }

        let user = writer.get_mut(id).ok_or(ServiceError::NotFound(ENTITY))?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password) = password {
            user.password = password;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        let updated = user.clone();
        writer.commit().await?;

        info!(user_id = %id, "User updated");
        Ok(updated.into())
    }

    pub async fn change_role(&self, id: &str, role: UserRole) -> ServiceResult<UserResponse> {
        self.update(
            id,
            UpdateUserRequest {
                role: Some(role),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let mut writer = self.store.write().await?;
        writer.remove(id).ok_or(ServiceError::NotFound(ENTITY))?;
        writer.commit().await?;

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Look up the user by email and check the password.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<UserResponse> {
        let user = self
            .store
            .load()
            .await?
            .into_iter()
            .find(|u| u.email == email)
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password) {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user.into())
    }
}
