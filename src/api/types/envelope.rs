//! Success response envelope

use serde::{Deserialize, Serialize};

/// `{"message": "...", "data": ...}` wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(operation: &str, data: T) -> Self {
        Self {
            message: format!("operation from handler: {}, successful.", operation),
            data,
        }
    }
}
