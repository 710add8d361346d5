//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the chat-completion LLM used by both the
//! grounded Q&A endpoint and quiz generation.
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use study_assistant_core::{
    domain::TokenUsage,
    ports::{Completion, CompletionRequest, CompletionService, PortError, PortResult},
};
use tracing::{info, warn};

/// Returned when the model answers with an empty choice list or no text.
const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Sorts an OpenAI failure into the port's error taxonomy by its reported code/message.
pub fn classify_openai_failure(message: &str) -> PortError {
    let lowered = message.to_lowercase();
    if lowered.contains("insufficient_quota")
        || lowered.contains("rate_limit")
        || lowered.contains("rate limit")
        || lowered.contains("429 too many requests")
    {
        PortError::QuotaExceeded(message.to_string())
    } else if lowered.contains("invalid_api_key")
        || lowered.contains("incorrect api key")
        || lowered.contains("401 unauthorized")
    {
        PortError::Unauthorized(message.to_string())
    } else {
        PortError::Unexpected(message.to_string())
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiChatAdapter {
    async fn complete(&self, request: CompletionRequest) -> PortResult<Completion> {
        info!(
            model = %self.model,
            system_len = request.system.len(),
            user_len = request.user.len(),
            "Sending completion request"
        );

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| classify_openai_failure(&e.to_string()))?;

        let usage = response.usage.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let text = match response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        {
            Some(content) => content,
            None => {
                warn!("Completion response contained no text content");
                EMPTY_REPLY.to_string()
            }
        };

        info!(reply_len = text.len(), "Completion response received");
        Ok(Completion { text, usage })
    }
}
