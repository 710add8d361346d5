//! crates/study_assistant_core/src/quiz/parser.rs
//!
//! Turns the raw text returned by the quiz-generation model into validated
//! `QuizQuestion`s. Nothing the model says is trusted: every element is checked
//! for the expected fields, option count and answer bounds.

use crate::domain::QuizQuestion;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Every generated question must offer exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\n?(.*?)\s*```\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizParseError {
    /// The model output is not JSON at all.
    #[error("Failed to parse quiz response: {0}")]
    Parse(String),
    /// The JSON does not have the quiz shape.
    #[error("Invalid quiz format: {0}")]
    Shape(String),
}

/// Parses and validates a model response, assigning ids `q1..qN` in order.
pub fn parse_quiz_questions(raw: &str) -> Result<Vec<QuizQuestion>, QuizParseError> {
    let body = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(body).map_err(|e| QuizParseError::Parse(e.to_string()))?;

    let items = value
        .as_array()
        .ok_or_else(|| QuizParseError::Shape("expected a JSON array of questions".to_string()))?;
    if items.is_empty() {
        return Err(QuizParseError::Shape("the model returned no questions".to_string()));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let position = index + 1;
            validate_question(item, position).map_err(|reason| {
                QuizParseError::Shape(format!("question {}: {}", position, reason))
            })
        })
        .collect()
}

fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

fn validate_question(item: &Value, position: usize) -> Result<QuizQuestion, String> {
    let object = item.as_object().ok_or("expected an object")?;

    let question = object
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or("missing question text")?;

    let options = object
        .get("options")
        .and_then(Value::as_array)
        .ok_or("missing options array")?
        .iter()
        .map(|option| option.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or("options must all be strings")?;
    if options.len() != OPTIONS_PER_QUESTION {
        return Err(format!(
            "expected {} options, got {}",
            OPTIONS_PER_QUESTION,
            options.len()
        ));
    }

    let correct = object
        .get("correctAnswer")
        .or_else(|| object.get("correctAnswerIndex"))
        .ok_or("missing correctAnswer")?;
    let correct_answer_index = correct
        .as_u64()
        .ok_or_else(|| format!("correctAnswer must be a non-negative integer, got {}", correct))?
        as usize;
    if correct_answer_index >= options.len() {
        return Err(format!(
            "correctAnswer {} is out of range for {} options",
            correct_answer_index,
            options.len()
        ));
    }

    let explanation = match object.get("explanation") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => return Err("explanation must be a string".to_string()),
    };

    Ok(QuizQuestion {
        id: format!("q{}", position),
        question: question.to_string(),
        options,
        correct_answer_index,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_json(correct: &str) -> String {
        format!(
            r#"{{"question": "Which organelle makes ATP?", "options": ["Nucleus", "Mitochondrion", "Ribosome", "Golgi"], "correctAnswer": {}, "explanation": "Cellular respiration."}}"#,
            correct
        )
    }

    #[test]
    fn assigns_positional_ids() {
        let raw = format!(
            "[{}, {}, {}]",
            question_json("1"),
            question_json("0"),
            question_json("3")
        );
        let questions = parse_quiz_questions(&raw).unwrap();

        let ids: Vec<_> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["q1", "q2", "q3"]);
        assert_eq!(questions[0].correct_answer_index, 1);
        assert_eq!(questions[2].options[3], "Golgi");
        assert_eq!(questions[0].explanation, "Cellular respiration.");
    }

    #[test]
    fn non_array_is_a_shape_error() {
        let err = parse_quiz_questions(r#""not an array""#).unwrap_err();
        assert!(matches!(err, QuizParseError::Shape(_)));

        let err = parse_quiz_questions(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, QuizParseError::Shape(_)));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_quiz_questions("Sure! Here are your questions: 1. ...").unwrap_err();
        assert!(matches!(err, QuizParseError::Parse(_)));
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(matches!(
            parse_quiz_questions("[]"),
            Err(QuizParseError::Shape(_))
        ));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = format!("```json\n[{}]\n```", question_json("2"));
        let questions = parse_quiz_questions(&raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer_index, 2);
    }

    #[test]
    fn out_of_range_answer_names_the_position() {
        let raw = format!("[{}, {}]", question_json("0"), question_json("4"));
        let err = parse_quiz_questions(&raw).unwrap_err();
        assert_eq!(
            err,
            QuizParseError::Shape(
                "question 2: correctAnswer 4 is out of range for 4 options".to_string()
            )
        );
    }

    #[test]
    fn negative_answer_is_rejected() {
        let raw = format!("[{}]", question_json("-1"));
        assert!(matches!(parse_quiz_questions(&raw), Err(QuizParseError::Shape(_))));
    }

    #[test]
    fn wrong_option_count_is_rejected() {
        let raw = r#"[{"question": "True or false?", "options": ["True", "False"], "correctAnswer": 0, "explanation": ""}]"#;
        let err = parse_quiz_questions(raw).unwrap_err();
        assert_eq!(
            err,
            QuizParseError::Shape("question 1: expected 4 options, got 2".to_string())
        );
    }

    #[test]
    fn missing_question_text_is_rejected() {
        let raw = r#"[{"question": "  ", "options": ["a", "b", "c", "d"], "correctAnswer": 0}]"#;
        assert!(matches!(parse_quiz_questions(raw), Err(QuizParseError::Shape(_))));
    }

    #[test]
    fn index_alias_and_missing_explanation_are_tolerated() {
        let raw = r#"[{"question": "Pick c", "options": ["a", "b", "c", "d"], "correctAnswerIndex": 2}]"#;
        let questions = parse_quiz_questions(raw).unwrap();
        assert_eq!(questions[0].correct_answer_index, 2);
        assert_eq!(questions[0].explanation, "");
    }
}
