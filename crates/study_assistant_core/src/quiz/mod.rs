pub mod parser;
pub mod scoring;
pub mod session;

pub use parser::{parse_quiz_questions, QuizParseError, OPTIONS_PER_QUESTION};
pub use scoring::{score_quiz, QuizResult};
pub use session::{QuizPhase, QuizSession, QuizStateError};
