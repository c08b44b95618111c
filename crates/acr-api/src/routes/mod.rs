//! API route modules.

pub mod anchors;
pub mod credentials;
pub mod graduation;
pub mod verify;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Unwrap a JSON body, mapping deserialization failures onto the
/// structured 422 response instead of Axum's plain-text default.
pub(crate) fn extract_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::Validation(rejection.body_text())),
    }
}
