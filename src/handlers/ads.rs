use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::ad::{SanitizeContentRequest, SanitizeContentResponse},
    sanitizer::Sanitizer,
};

/// Sanitize ad creative markup before it is stored.
///
/// The result is what the ad workflows persist in the `content` field.
/// Whether an empty result is acceptable is up to the caller.
pub async fn sanitize_content(
    State(sanitizer): State<Arc<Sanitizer>>,
    payload: Result<Json<SanitizeContentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;

    // 1. Validate payload
    payload.validate()?;

    // 2. Sanitize
    let content = sanitizer.sanitize(&payload.content);
    tracing::debug!(
        input_len = payload.content.len(),
        output_len = content.len(),
        "Sanitized ad content"
    );

    Ok(Json(SanitizeContentResponse {
        is_empty: content.is_empty(),
        content,
    }))
}
