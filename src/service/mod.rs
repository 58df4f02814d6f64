//! Business operations over the flat-file stores.

pub mod sessions;
pub mod users;

pub use sessions::SessionService;
pub use users::UserService;

use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("upload storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
