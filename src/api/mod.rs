//! HTTP request layer
//!
//! Payload validation, error mapping and the axum router over [`AppState`].
//!
//! [`AppState`]: crate::service::AppState

pub mod error;
pub mod handlers;
pub mod payloads;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use server::{router, ApiServer};
