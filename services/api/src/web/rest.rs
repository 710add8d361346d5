//! services/api/src/web/rest.rs
//!
//! The health endpoint and the master definition for the OpenAPI specification.

use crate::web::{auth, chat, documents, protocol::*, quiz, voice};
use axum::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        documents::list_documents_handler,
        documents::upload_documents_handler,
        documents::paste_text_handler,
        documents::delete_document_handler,
        documents::clear_documents_handler,
        documents::context_handler,
        chat::chat_handler,
        chat::chat_history_handler,
        chat::clear_chat_handler,
        quiz::quiz_state_handler,
        quiz::generate_quiz_handler,
        quiz::answer_handler,
        quiz::next_question_handler,
        quiz::previous_question_handler,
        quiz::finish_quiz_handler,
        quiz::reset_quiz_handler,
        voice::transcribe_handler,
        auth::login_handler,
        auth::signup_handler,
        auth::logout_handler,
        auth::me_handler,
    ),
    components(
        schemas(
            HealthResponse,
            PasteTextRequest, ChatRequest, GenerateQuizRequest, AnswerRequest, CredentialsRequest,
            DocumentView, DocumentListResponse, RejectedFile, UploadResponse, ContextResponse,
            MessageView, ChatHistoryResponse, UsageView, ChatResponse,
            QuestionView, QuizView, QuizResultView, QuizSessionView,
            UserView, SessionResponse, TranscriptionResponse,
        )
    ),
    tags(
        (
            name = "AI Study Assistant API",
            description = "Upload study material, chat about it, and quiz yourself."
        )
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
