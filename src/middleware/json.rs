use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
};

use crate::error::AppError;

/// `Json` whose rejections render through `AppError` as a 400 envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "json body rejected");
        AppError::BadRequest(rejection.body_text())
    }
}
