use axum::extract::{rejection::JsonRejection, FromRequest};

use super::ApiError;

/// `Json` extractor whose rejections render as `{code, msg}` bodies
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
