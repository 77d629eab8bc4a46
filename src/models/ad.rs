use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO for sanitizing ad creative markup.
#[derive(Debug, Deserialize, Validate)]
pub struct SanitizeContentRequest {
    /// Raw markup or plain text as entered in the ad form.
    #[validate(length(
        max = 20000,
        message = "Content length must be at most 20000 chars"
    ))]
    pub content: String,
}

/// Sanitized content, safe to store and emit without further escaping.
#[derive(Debug, Serialize, Deserialize)]
pub struct SanitizeContentResponse {
    pub content: String,

    /// Everything was filtered away (or the input was empty).
    pub is_empty: bool,
}
