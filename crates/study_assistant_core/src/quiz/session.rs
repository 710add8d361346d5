//! crates/study_assistant_core/src/quiz/session.rs
//!
//! The quiz navigation state machine: `configuring → in_progress → completed`,
//! with `reset` leading back to `configuring` from anywhere.

use super::scoring::{score_quiz, QuizResult};
use crate::domain::Quiz;
use serde::Serialize;

/// The externally visible phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    Configuring,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizStateError {
    #[error("A quiz is already active; reset it before generating a new one")]
    QuizAlreadyActive,
    #[error("No quiz is in progress")]
    NotInProgress,
    #[error("The quiz has no questions")]
    EmptyQuiz,
    #[error("Option {option} does not exist for question {question}")]
    OptionOutOfRange { question: usize, option: usize },
}

#[derive(Debug, Clone)]
struct Attempt {
    quiz: Quiz,
    /// One slot per question; `None` means unanswered.
    answers: Vec<Option<usize>>,
    current_index: usize,
}

#[derive(Debug, Clone, Default)]
enum Stage {
    #[default]
    Configuring,
    InProgress(Attempt),
    Completed { attempt: Attempt, result: QuizResult },
}

#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    stage: Stage,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> QuizPhase {
        match self.stage {
            Stage::Configuring => QuizPhase::Configuring,
            Stage::InProgress(_) => QuizPhase::InProgress,
            Stage::Completed { .. } => QuizPhase::Completed,
        }
    }

    fn attempt(&self) -> Option<&Attempt> {
        match &self.stage {
            Stage::Configuring => None,
            Stage::InProgress(attempt) | Stage::Completed { attempt, .. } => Some(attempt),
        }
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.attempt().map(|a| &a.quiz)
    }

    /// The answer slots, empty while configuring.
    pub fn answers(&self) -> &[Option<usize>] {
        self.attempt().map(|a| a.answers.as_slice()).unwrap_or(&[])
    }

    pub fn current_index(&self) -> Option<usize> {
        self.attempt().map(|a| a.current_index)
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.stage {
            Stage::Completed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Enters `in_progress` with the cursor on the first question and every answer unset.
    pub fn start(&mut self, quiz: Quiz) -> Result<(), QuizStateError> {
        if !matches!(self.stage, Stage::Configuring) {
            return Err(QuizStateError::QuizAlreadyActive);
        }
        if quiz.questions.is_empty() {
            return Err(QuizStateError::EmptyQuiz);
        }
        let answers = vec![None; quiz.questions.len()];
        self.stage = Stage::InProgress(Attempt {
            quiz,
            answers,
            current_index: 0,
        });
        Ok(())
    }

    fn in_progress_mut(&mut self) -> Result<&mut Attempt, QuizStateError> {
        match &mut self.stage {
            Stage::InProgress(attempt) => Ok(attempt),
            _ => Err(QuizStateError::NotInProgress),
        }
    }

    /// Records `option` for the question under the cursor, replacing any earlier choice.
    pub fn select_answer(&mut self, option: usize) -> Result<(), QuizStateError> {
        let attempt = self.in_progress_mut()?;
        let index = attempt.current_index;
        if option >= attempt.quiz.questions[index].options.len() {
            return Err(QuizStateError::OptionOutOfRange {
                question: index,
                option,
            });
        }
        attempt.answers[index] = Some(option);
        Ok(())
    }

    /// Moves forward one question; a no-op on the last one.
    pub fn next(&mut self) -> Result<usize, QuizStateError> {
        let attempt = self.in_progress_mut()?;
        if attempt.current_index + 1 < attempt.quiz.questions.len() {
            attempt.current_index += 1;
        }
        Ok(attempt.current_index)
    }

    /// Moves back one question; a no-op on the first one.
    pub fn previous(&mut self) -> Result<usize, QuizStateError> {
        let attempt = self.in_progress_mut()?;
        attempt.current_index = attempt.current_index.saturating_sub(1);
        Ok(attempt.current_index)
    }

    /// Scores the attempt and freezes it.
    pub fn finish(&mut self) -> Result<&QuizResult, QuizStateError> {
        let attempt = match std::mem::take(&mut self.stage) {
            Stage::InProgress(attempt) => attempt,
            other => {
                self.stage = other;
                return Err(QuizStateError::NotInProgress);
            }
        };
        let result = score_quiz(&attempt.quiz.questions, &attempt.answers);
        self.stage = Stage::Completed { attempt, result };
        self.result().ok_or(QuizStateError::NotInProgress)
    }

    /// Discards the quiz and every answer.
    pub fn reset(&mut self) {
        self.stage = Stage::Configuring;
    }
}
