//! services/api/src/web/voice.rs
//!
//! Voice input: recorded audio is transcribed so it can be dropped into the chat box.

use crate::{
    error::ApiError,
    web::{protocol::TranscriptionResponse, state::AppState},
};
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

/// Transcribe a recording of raw 16-bit little-endian mono PCM.
///
/// The first file part of the form is used.
#[utoipa::path(
    post,
    path = "/voice/transcribe",
    request_body(content_type = "multipart/form-data", description = "The recorded audio."),
    responses(
        (status = 200, description = "The transcript", body = TranscriptionResponse),
        (status = 400, description = "No audio in the request"),
        (status = 401, description = "The API key is missing or invalid")
    )
)]
pub async fn transcribe_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let service = state.speech_service()?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read multipart data: {}", e)))?
        .ok_or_else(|| ApiError::Validation("No audio provided".to_string()))?;
    let audio = field
        .bytes()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read audio bytes: {}", e)))?;

    let text = service
        .transcribe_audio(&audio)
        .await
        .map_err(|e| ApiError::upstream("Failed to transcribe audio", e))?;
    info!(chars = text.len(), "Audio transcribed");

    Ok(Json(TranscriptionResponse { text }))
}
