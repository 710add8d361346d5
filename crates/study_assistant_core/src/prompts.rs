//! crates/study_assistant_core/src/prompts.rs
//!
//! Builds the instructions sent to the completion service: the context-grounded
//! Q&A prompt, the quiz-generation prompt, and the fallback reply used when the
//! service is out of quota.

use crate::domain::{Difficulty, QuestionType};
use crate::ports::CompletionRequest;

/// The exact sentence the model must use when the context does not cover a question.
pub const INSUFFICIENT_INFORMATION_REPLY: &str =
    "I don't have enough information to answer that question based on the provided materials.";

const CHAT_SYSTEM_TEMPLATE: &str = r#"You are an AI study assistant. Your role is to help students understand their study materials by answering questions based on the content they've uploaded.

IMPORTANT: Only answer questions based on the information provided in the context. If the answer is not in the context, say "{fallback}"

Context from uploaded materials:
{context}

Guidelines:
- Provide clear, concise answers
- Use examples when helpful
- Break down complex concepts
- Be encouraging and supportive
- If asked for explanations, provide step-by-step reasoning
- If asked for summaries, highlight key points
- If asked for study tips, provide practical advice

Student's question: {question}"#;

const QUIZ_SYSTEM_INSTRUCTIONS: &str =
    "You are an expert educator who creates high-quality quiz questions. Always respond with valid JSON format.";

const QUIZ_USER_TEMPLATE: &str = r#"Generate {count} {difficulty} level {kind} questions based on the following study material.

Study Material:
{content}

Requirements:
- Questions should be based on key concepts from the material
- Provide 4 multiple choice options for each question
- Include a brief explanation for the correct answer
- Make questions appropriate for {difficulty} difficulty level
- Focus on important concepts and details

Format the response as a JSON array with the following structure:
[
  {
    "question": "Question text here?",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correctAnswer": 0,
    "explanation": "Brief explanation of why this is correct"
  }
]

Generate exactly {count} questions:"#;

const QUOTA_FALLBACK_TEMPLATE: &str = r#"I'm currently experiencing high demand and can't process your request right now. Here are some alternatives:

1. **Try again in a few minutes** - The service may be available again shortly
2. **Check your OpenAI account** - You may need to add billing information or upgrade your plan
3. **Use the study features** - You can still:
   - Upload and organize your study materials
   - Use the "Paste Text" feature to add content manually
   - Generate quizzes from your materials
   - Review your uploaded content

For immediate help, try visiting: https://platform.openai.com/account/billing

Your question was: "{question}"
I'll be happy to help once the service is available again!"#;

pub const CHAT_MAX_TOKENS: u32 = 1000;
pub const QUIZ_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Raised before any remote call when a required input is missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("{0}")]
    MissingInput(&'static str),
}

//=========================================================================================
// Context-grounded Q&A
//=========================================================================================

/// Builds the grounded chat request: the instruction block is the system message
/// and the raw question is repeated as the user turn.
pub fn build_chat_request(context: &str, question: &str) -> Result<CompletionRequest, PromptError> {
    if question.trim().is_empty() || context.trim().is_empty() {
        return Err(PromptError::MissingInput("Message and context are required"));
    }

    let system = fill_template(
        CHAT_SYSTEM_TEMPLATE,
        &[
            ("fallback", INSUFFICIENT_INFORMATION_REPLY),
            ("context", context),
            ("question", question),
        ],
    );

    Ok(CompletionRequest {
        system,
        user: question.to_string(),
        max_tokens: CHAT_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
    })
}

/// The informational reply substituted for a real answer when the service is out of quota.
pub fn quota_fallback_reply(question: &str) -> String {
    fill_template(QUOTA_FALLBACK_TEMPLATE, &[("question", question)])
}

//=========================================================================================
// Quiz generation
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizParameters {
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    /// Forwarded literally; only zero is rejected.
    pub num_questions: usize,
}

pub fn build_quiz_request(
    content: &str,
    params: &QuizParameters,
) -> Result<CompletionRequest, PromptError> {
    if content.trim().is_empty() || params.num_questions == 0 {
        return Err(PromptError::MissingInput(
            "Content, type, difficulty, and number of questions are required",
        ));
    }

    let count = params.num_questions.to_string();
    let user = fill_template(
        QUIZ_USER_TEMPLATE,
        &[
            ("count", count.as_str()),
            ("difficulty", params.difficulty.as_str()),
            ("kind", params.question_type.as_str()),
            ("content", content),
        ],
    );

    Ok(CompletionRequest {
        system: QUIZ_SYSTEM_INSTRUCTIONS.to_string(),
        user,
        max_tokens: QUIZ_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
    })
}

/// Substitutes `{key}` placeholders in a single pass, so braces inside the
/// substituted values (user text, JSON) are never expanded again.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let matched = values
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));
        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_embeds_context_then_question() {
        let request = build_chat_request("Mitochondria make ATP.", "What makes ATP?").unwrap();

        assert!(request.system.contains("Only answer questions based on the information provided"));
        assert!(request.system.contains(INSUFFICIENT_INFORMATION_REPLY));
        assert!(request.system.contains("Guidelines:"));
        let context_at = request.system.find("Mitochondria make ATP.").unwrap();
        let question_at = request.system.find("Student's question: What makes ATP?").unwrap();
        assert!(context_at < question_at);
        assert_eq!(request.user, "What makes ATP?");
        assert_eq!(request.max_tokens, CHAT_MAX_TOKENS);
    }

    #[test]
    fn chat_request_is_deterministic() {
        let a = build_chat_request("ctx", "q").unwrap();
        let b = build_chat_request("ctx", "q").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn placeholders_inside_user_text_are_left_alone() {
        let request = build_chat_request("Notes mention {question} literally.", "Why?").unwrap();
        assert!(request.system.contains("Notes mention {question} literally."));
    }

    #[test]
    fn json_braces_in_quiz_template_survive() {
        let params = QuizParameters {
            question_type: QuestionType::MultipleChoice,
            difficulty: Difficulty::Medium,
            num_questions: 3,
        };
        let request = build_quiz_request("material", &params).unwrap();
        assert!(request.user.contains("[\n  {\n    \"question\""));
    }

    #[test]
    fn empty_context_is_rejected() {
        assert_eq!(
            build_chat_request("", "What makes ATP?"),
            Err(PromptError::MissingInput("Message and context are required"))
        );
        assert!(build_chat_request("   \n", "What makes ATP?").is_err());
    }

    #[test]
    fn empty_question_is_rejected() {
        assert!(build_chat_request("Mitochondria make ATP.", "").is_err());
    }

    #[test]
    fn quota_fallback_embeds_question() {
        let reply = quota_fallback_reply("What is a cell?");
        assert!(reply.contains("Your question was: \"What is a cell?\""));
        assert!(reply.starts_with("I'm currently experiencing high demand"));
    }

    #[test]
    fn quiz_request_forwards_parameters_literally() {
        let params = QuizParameters {
            question_type: QuestionType::TrueFalse,
            difficulty: Difficulty::Hard,
            num_questions: 37,
        };
        let request = build_quiz_request("Photosynthesis uses light.", &params).unwrap();

        assert!(request.user.starts_with("Generate 37 hard level true-false questions"));
        assert!(request.user.contains("Photosynthesis uses light."));
        assert!(request.user.ends_with("Generate exactly 37 questions:"));
        assert!(request.user.contains("\"correctAnswer\": 0"));
        assert!(request.system.contains("valid JSON"));
        assert_eq!(request.max_tokens, QUIZ_MAX_TOKENS);
    }

    #[test]
    fn quiz_request_rejects_zero_questions_and_empty_content() {
        let params = QuizParameters {
            question_type: QuestionType::MultipleChoice,
            difficulty: Difficulty::Easy,
            num_questions: 0,
        };
        assert!(build_quiz_request("material", &params).is_err());

        let params = QuizParameters { num_questions: 5, ..params };
        assert!(build_quiz_request("", &params).is_err());
    }
}
