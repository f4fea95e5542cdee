//! Request and response types shared by the HTTP handlers

pub mod envelope;
pub mod error;
pub mod json;

pub use envelope::ApiResponse;
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
