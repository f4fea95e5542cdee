//! JSON extractor whose rejections use the API error body

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiError, ApiErrorType};

/// Wrapper around `axum::Json` that reports body errors as [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(|rejection| rejection_to_error(&rejection))
    }
}

fn rejection_to_error(rejection: &JsonRejection) -> ApiError {
    let (message, code) = match rejection {
        JsonRejection::JsonDataError(err) => (
            format!("Invalid JSON data: {}", err.body_text()),
            "invalid_json_data",
        ),
        JsonRejection::JsonSyntaxError(err) => (
            format!("Invalid JSON syntax: {}", err.body_text()),
            "invalid_json_syntax",
        ),
        JsonRejection::MissingJsonContentType(_) => (
            "Missing Content-Type header. Expected 'application/json'.".to_string(),
            "missing_content_type",
        ),
        JsonRejection::BytesRejection(err) => (
            format!("Failed to read request body: {}", err.body_text()),
            "unreadable_body",
        ),
        _ => ("Invalid JSON request".to_string(), "invalid_json"),
    };

    ApiError::new(rejection.status(), ApiErrorType::InvalidRequestError, message).with_code(code)
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
