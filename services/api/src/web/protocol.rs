//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use study_assistant_core::{
    domain::{
        AuthUser, ChatMessage, ChatRole, Difficulty, DocumentKind, QuestionType, Quiz,
        QuizQuestion, TokenUsage, UploadedDocument,
    },
    quiz::{QuizPhase, QuizResult, QuizSession},
};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client TO the Server
//=========================================================================================

/// Text pasted directly into the app.
#[derive(Deserialize, Debug, ToSchema)]
pub struct PasteTextRequest {
    /// Defaults to "Pasted Text".
    pub name: Option<String>,
    pub content: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    /// Overrides the uploaded documents as the grounding context.
    pub context: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct GenerateQuizRequest {
    #[schema(value_type = String, example = "multiple-choice")]
    pub quiz_type: QuestionType,
    #[schema(value_type = String, example = "medium")]
    pub difficulty: Difficulty,
    pub num_questions: usize,
    /// Overrides the uploaded documents as the study material.
    pub content: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct AnswerRequest {
    pub answer_index: usize,
}

/// Mock credentials: the password is accepted and ignored.
#[derive(Deserialize, Debug, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
pub struct DocumentView {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    #[schema(value_type = String, example = "pdf")]
    pub kind: DocumentKind,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&UploadedDocument> for DocumentView {
    fn from(doc: &UploadedDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name.clone(),
            content: doc.content.clone(),
            kind: doc.kind,
            uploaded_at: doc.uploaded_at,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentView>,
}

/// A file from a multipart upload that was not stored.
#[derive(Serialize, Debug, ToSchema)]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct UploadResponse {
    pub documents: Vec<DocumentView>,
    /// Advisory notes, e.g. when PDF text could not be extracted.
    pub notes: Vec<String>,
    pub rejected: Vec<RejectedFile>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ContextResponse {
    pub content: String,
    pub document_count: usize,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct MessageView {
    pub id: Uuid,
    pub content: String,
    #[schema(value_type = String, example = "assistant")]
    pub role: ChatRole,
    pub timestamp: DateTime<Utc>,
}

impl From<&ChatMessage> for MessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            role: message.role,
            timestamp: message.timestamp,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ChatHistoryResponse {
    pub messages: Vec<MessageView>,
    pub pending: bool,
}

#[derive(Serialize, Debug, Clone, Copy, ToSchema)]
pub struct UsageView {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<TokenUsage> for UsageView {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ChatResponse {
    /// The assistant's reply text.
    pub response: String,
    /// The reply as recorded in the chat history.
    pub message: MessageView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageView>,
    /// Present when the reply is a fallback rather than a model answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A quiz question. The answer key is withheld until the quiz is completed.
#[derive(Serialize, Debug, ToSchema)]
pub struct QuestionView {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuestionView {
    fn new(question: &QuizQuestion, reveal: bool) -> Self {
        Self {
            id: question.id.clone(),
            question: question.question.clone(),
            options: question.options.clone(),
            correct_answer_index: reveal.then_some(question.correct_answer_index),
            explanation: reveal.then(|| question.explanation.clone()),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct QuizView {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<QuestionView>,
}

impl QuizView {
    fn new(quiz: &Quiz, reveal: bool) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            created_at: quiz.created_at,
            questions: quiz
                .questions
                .iter()
                .map(|q| QuestionView::new(q, reveal))
                .collect(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct QuizResultView {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub correct: Vec<bool>,
}

impl From<&QuizResult> for QuizResultView {
    fn from(result: &QuizResult) -> Self {
        Self {
            score: result.score,
            total: result.total,
            percentage: result.percentage,
            correct: result.correct.clone(),
        }
    }
}

/// The full state of the quiz session.
#[derive(Serialize, Debug, ToSchema)]
pub struct QuizSessionView {
    #[schema(value_type = String, example = "in_progress")]
    pub phase: QuizPhase,
    pub quiz: Option<QuizView>,
    pub current_index: Option<usize>,
    /// One slot per question; `null` means unanswered.
    pub answers: Vec<Option<usize>>,
    pub result: Option<QuizResultView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageView>,
}

impl From<&QuizSession> for QuizSessionView {
    fn from(session: &QuizSession) -> Self {
        let reveal = session.phase() == QuizPhase::Completed;
        Self {
            phase: session.phase(),
            quiz: session.quiz().map(|quiz| QuizView::new(quiz, reveal)),
            current_index: session.current_index(),
            answers: session.answers().to_vec(),
            result: session.result().map(QuizResultView::from),
            usage: None,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<&AuthUser> for UserView {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SessionResponse {
    pub user: Option<UserView>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct TranscriptionResponse {
    pub text: String,
}
