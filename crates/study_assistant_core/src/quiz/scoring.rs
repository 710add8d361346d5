//! crates/study_assistant_core/src/quiz/scoring.rs

use crate::domain::QuizQuestion;
use serde::Serialize;

/// Outcome of scoring one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    /// Per-question correctness, by position.
    pub correct: Vec<bool>,
}

/// Counts positions where the selected option equals the question's correct index.
/// Unanswered slots (`None`) never match.
pub fn score_quiz(questions: &[QuizQuestion], answers: &[Option<usize>]) -> QuizResult {
    let correct: Vec<bool> = questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            answers.get(i).copied().flatten() == Some(question.correct_answer_index)
        })
        .collect();
    let score = correct.iter().filter(|hit| **hit).count();
    let total = questions.len();

    QuizResult {
        score,
        total,
        percentage: percentage(score, total),
        correct,
    }
}

fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (score as f64 / total as f64 * 100.0).round() as u32
}
