//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like LLM APIs or storage.

use crate::domain::{AuthUser, TokenUsage};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Quota or rate limit exceeded: {0}")]
    QuotaExceeded(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Port Payloads
//=========================================================================================

/// A single system-instruction/user-turn exchange sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// The generated text plus whatever usage metadata the service reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Result of running a PDF through the extractor.
///
/// `note` is advisory: when extraction is unavailable the extractor still returns
/// placeholder `content`, which callers store like any other document text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub content: String,
    pub pages: usize,
    pub note: Option<String>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one system instruction and one user message, returning the model's reply.
    async fn complete(&self, request: CompletionRequest) -> PortResult<Completion>;
}

#[async_trait]
pub trait SpeechToTextService: Send + Sync {
    /// Transcribes a slice of audio data into text.
    async fn transcribe_audio(&self, audio_data: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    async fn extract(&self, file_name: &str, data: &[u8]) -> PortResult<ExtractedText>;
}

/// Persistence for the logged-in user record.
///
/// Implementations treat a missing or unreadable record as "nobody logged in".
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self) -> Option<AuthUser>;
    async fn save_session(&self, user: &AuthUser) -> PortResult<()>;
    async fn clear_session(&self) -> PortResult<()>;
}
