//! Persisted records and the request/response DTOs built around them.

pub mod session_request;
pub mod stats;
pub mod user;

pub use session_request::*;
pub use stats::*;
pub use user::*;

/// A record kept in a flat-file store, addressable by its opaque id.
pub trait Record {
    fn id(&self) -> &str;
}
