//! services/api/src/web/chat.rs
//!
//! Handlers for the document-grounded chat.

use crate::{
    error::ApiError,
    web::{
        extract::AppJson,
        protocol::{ChatHistoryResponse, ChatRequest, ChatResponse, MessageView},
        state::{AppState, InFlight, InFlightGuard},
    },
};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use study_assistant_core::{
    domain::ChatRole,
    ports::PortError,
    prompts::{build_chat_request, quota_fallback_reply},
};
use tracing::{info, warn};

const QUOTA_WARNING: &str = "OpenAI API quota exceeded - showing fallback response";
const QUOTA_SUGGESTION: &str =
    "Add billing information to your OpenAI account to get full AI responses";

/// Ask a question about the uploaded material.
///
/// The question is recorded in the history before anything else can fail. When
/// the model is out of quota a fallback reply is recorded and returned with a
/// `warning`; any other model failure records no reply.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The assistant's reply", body = ChatResponse),
        (status = 400, description = "Empty message or no study material"),
        (status = 401, description = "The API key is missing or invalid"),
        (status = 409, description = "Another chat request is still pending"),
        (status = 500, description = "The model call failed")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = req.message.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::Validation("Message and context are required".to_string()));
    }

    // --- 1. Record the question and prepare the request under the lock ---
    let (service, request, in_flight) = {
        let mut workspace = state.workspace.lock().await;
        if workspace.chat.is_pending() {
            return Err(ApiError::Conflict(
                "A chat request is already in progress".to_string(),
            ));
        }
        workspace.chat.add_message(ChatRole::User, question.as_str());

        let context = workspace.resolve_context(req.context.as_deref());
        let request = build_chat_request(&context, &question)?;
        let service = state.chat_service()?;
        let in_flight = InFlightGuard::acquire(state.clone(), &mut workspace, InFlight::Chat);
        (service, request, in_flight)
    };

    // --- 2. Call the model without holding the lock ---
    info!(question_len = question.len(), "Sending chat request");
    let outcome = service.complete(request).await;

    // --- 3. Record the outcome ---
    let mut workspace = state.workspace.lock().await;
    in_flight.release(&mut workspace);
    match outcome {
        Ok(completion) => {
            let message = MessageView::from(
                workspace.chat.add_message(ChatRole::Assistant, completion.text.as_str()),
            );
            Ok(Json(ChatResponse {
                response: completion.text,
                message,
                usage: completion.usage.map(Into::into),
                warning: None,
                suggestion: None,
            }))
        }
        Err(PortError::QuotaExceeded(detail)) => {
            warn!(%detail, "Chat quota exceeded, answering with fallback");
            let reply = quota_fallback_reply(&question);
            let message =
                MessageView::from(workspace.chat.add_message(ChatRole::Assistant, reply.as_str()));
            Ok(Json(ChatResponse {
                response: reply,
                message,
                usage: None,
                warning: Some(QUOTA_WARNING.to_string()),
                suggestion: Some(QUOTA_SUGGESTION.to_string()),
            }))
        }
        Err(e) => Err(ApiError::upstream("Failed to process chat request", e)),
    }
}

/// The chat history, oldest first.
#[utoipa::path(
    get,
    path = "/chat/messages",
    responses((status = 200, description = "The chat history", body = ChatHistoryResponse))
)]
pub async fn chat_history_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ChatHistoryResponse> {
    let workspace = state.workspace.lock().await;
    Json(ChatHistoryResponse {
        messages: workspace.chat.messages().iter().map(MessageView::from).collect(),
        pending: workspace.chat.is_pending(),
    })
}

/// Empty the chat history.
#[utoipa::path(
    delete,
    path = "/chat/messages",
    responses((status = 204, description = "History cleared"))
)]
pub async fn clear_chat_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.workspace.lock().await.chat.clear();
    StatusCode::NO_CONTENT
}
