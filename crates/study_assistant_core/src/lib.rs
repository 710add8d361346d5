pub mod chat_store;
pub mod document_store;
pub mod domain;
pub mod ports;
pub mod prompts;
pub mod quiz;

pub use chat_store::ChatStore;
pub use document_store::DocumentStore;
pub use domain::{
    AuthUser, ChatMessage, ChatRole, Difficulty, DocumentKind, QuestionType, Quiz, QuizQuestion,
    TokenUsage, UploadedDocument,
};
pub use ports::{
    Completion, CompletionRequest, CompletionService, ExtractedText, PdfTextExtractor, PortError,
    PortResult, SessionStore, SpeechToTextService,
};
pub use quiz::{QuizPhase, QuizResult, QuizSession};
