//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.
//!
//! Every handler returns `Result<T, ApiError>`. Client mistakes are echoed back
//! verbatim; upstream and internal failures are logged in full and answered with
//! a generic message.

use crate::config::ConfigError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use study_assistant_core::{
    ports::PortError,
    prompts::PromptError,
    quiz::{QuizParseError, QuizStateError},
};
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Missing or malformed request input, detected before any remote call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A prompt could not be built because a required input was empty.
    #[error("Validation error: {0}")]
    Prompt(#[from] PromptError),

    /// No OpenAI API key is configured.
    #[error("OpenAI API key not configured")]
    MissingCredentials,

    /// The request is valid but collides with work already in flight.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An uploaded file has a type the service does not read.
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    /// The quiz model replied with something that is not a usable quiz.
    #[error("Quiz generation error: {0}")]
    QuizGeneration(#[from] QuizParseError),

    /// A quiz action was attempted in the wrong state.
    #[error("Quiz state error: {0}")]
    QuizState(#[from] QuizStateError),

    /// Represents an error that propagated up from one of the core service ports,
    /// with the user-facing summary of what was being attempted.
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: PortError,
    },

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Wraps a port failure with a summary of the operation that failed.
    pub fn upstream(context: &'static str, source: PortError) -> Self {
        ApiError::Upstream { context, source }
    }
}

/// A JSON body that is missing, malformed, or has the wrong shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMedia(
                "Expected request with `Content-Type: application/json`".to_string(),
            ),
            other => ApiError::Validation(other.body_text()),
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            suggestion: None,
        }
    }

    fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(message.clone()))
            }
            ApiError::Prompt(e) => (StatusCode::BAD_REQUEST, ErrorBody::new(e.to_string())),
            ApiError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("OpenAI API key not configured")
                    .details("Please add your OpenAI API key to the .env file")
                    .suggestion("Get your API key from https://platform.openai.com/api-keys"),
            ),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, ErrorBody::new(message.clone())),
            ApiError::UnsupportedMedia(message) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, ErrorBody::new(message.clone()))
            }
            ApiError::QuizGeneration(e) => {
                let summary = match e {
                    QuizParseError::Parse(_) => "Failed to generate quiz questions",
                    QuizParseError::Shape(_) => "Invalid quiz format generated",
                };
                (StatusCode::BAD_GATEWAY, ErrorBody::new(summary).details(e.to_string()))
            }
            ApiError::QuizState(e) => {
                let status = match e {
                    QuizStateError::OptionOutOfRange { .. } | QuizStateError::EmptyQuiz => {
                        StatusCode::BAD_REQUEST
                    }
                    QuizStateError::QuizAlreadyActive | QuizStateError::NotInProgress => {
                        StatusCode::CONFLICT
                    }
                };
                (status, ErrorBody::new(e.to_string()))
            }
            ApiError::Upstream { context, source } => upstream_response(context, source),
            ApiError::Config(_) | ApiError::Io(_) => {
                error!(error = %self, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error"),
                )
            }
        }
    }
}

fn upstream_response(context: &'static str, source: &PortError) -> (StatusCode, ErrorBody) {
    match source {
        PortError::InvalidInput(message) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new(context).details(message.clone()),
        ),
        PortError::Unauthorized(_) => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("Invalid OpenAI API key")
                .details("Please check your API key in the .env file")
                .suggestion("Check your OpenAI API key and try again"),
        ),
        PortError::QuotaExceeded(detail) => {
            error!(error = %detail, context, "upstream quota exceeded");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(context)
                    .details("Rate limit exceeded. Please wait a moment and try again")
                    .suggestion("Check your OpenAI billing or try again later"),
            )
        }
        PortError::Unexpected(detail) => {
            error!(error = %detail, context, "upstream service failure");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(context))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
