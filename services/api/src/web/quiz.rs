//! services/api/src/web/quiz.rs
//!
//! Handlers for generating a quiz from the study material and walking through it.

use crate::{
    error::ApiError,
    web::{
        extract::AppJson,
        protocol::{AnswerRequest, GenerateQuizRequest, QuizSessionView},
        state::{AppState, InFlight, InFlightGuard},
    },
};
use axum::{extract::State, Json};
use std::sync::Arc;
use study_assistant_core::{
    domain::Quiz,
    prompts::{build_quiz_request, QuizParameters},
    quiz::{parse_quiz_questions, QuizPhase, QuizStateError},
};
use tracing::{info, warn};

/// The current quiz session. Correct answers stay hidden until it is completed.
#[utoipa::path(
    get,
    path = "/quiz",
    responses((status = 200, description = "The quiz session", body = QuizSessionView))
)]
pub async fn quiz_state_handler(State(state): State<Arc<AppState>>) -> Json<QuizSessionView> {
    let workspace = state.workspace.lock().await;
    Json(QuizSessionView::from(&workspace.quiz))
}

/// Generate a quiz from the uploaded documents (or the supplied `content`) and start it.
///
/// Any failure leaves the session in the `configuring` phase.
#[utoipa::path(
    post,
    path = "/quiz",
    request_body = GenerateQuizRequest,
    responses(
        (status = 200, description = "The quiz has started", body = QuizSessionView),
        (status = 400, description = "No study material or zero questions requested"),
        (status = 401, description = "The API key is missing or invalid"),
        (status = 409, description = "A quiz is already active or being generated"),
        (status = 502, description = "The model's reply was not a usable quiz")
    )
)]
pub async fn generate_quiz_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<GenerateQuizRequest>,
) -> Result<Json<QuizSessionView>, ApiError> {
    let params = QuizParameters {
        question_type: req.quiz_type,
        difficulty: req.difficulty,
        num_questions: req.num_questions,
    };

    // --- 1. Validate and claim the generator under the lock ---
    let (service, request, in_flight) = {
        let mut workspace = state.workspace.lock().await;
        if workspace.quiz.phase() != QuizPhase::Configuring {
            return Err(QuizStateError::QuizAlreadyActive.into());
        }
        if workspace.quiz_generating {
            return Err(ApiError::Conflict("A quiz is already being generated".to_string()));
        }

        let content = workspace.resolve_context(req.content.as_deref());
        let request = build_quiz_request(&content, &params)?;
        let service = state.quiz_service()?;
        let in_flight =
            InFlightGuard::acquire(state.clone(), &mut workspace, InFlight::QuizGeneration);
        (service, request, in_flight)
    };

    // --- 2. Call the model without holding the lock ---
    info!(
        quiz_type = %params.question_type,
        difficulty = %params.difficulty,
        num_questions = params.num_questions,
        "Generating quiz"
    );
    let outcome = service.complete(request).await;

    // --- 3. Parse and start ---
    let mut workspace = state.workspace.lock().await;
    in_flight.release(&mut workspace);
    let completion = outcome.map_err(|e| ApiError::upstream("Failed to generate quiz", e))?;
    let questions = parse_quiz_questions(&completion.text).inspect_err(|e| {
        warn!(error = %e, raw_len = completion.text.len(), "Discarding unusable quiz reply");
    })?;

    info!(questions = questions.len(), "Quiz generated");
    workspace
        .quiz
        .start(Quiz::new(params.question_type, params.difficulty, questions))?;

    let mut view = QuizSessionView::from(&workspace.quiz);
    view.usage = completion.usage.map(Into::into);
    Ok(Json(view))
}

/// Select an option for the current question, replacing any earlier choice.
#[utoipa::path(
    post,
    path = "/quiz/answer",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = QuizSessionView),
        (status = 400, description = "The option does not exist"),
        (status = 409, description = "No quiz is in progress")
    )
)]
pub async fn answer_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AnswerRequest>,
) -> Result<Json<QuizSessionView>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    workspace.quiz.select_answer(req.answer_index)?;
    Ok(Json(QuizSessionView::from(&workspace.quiz)))
}

/// Move to the next question; stays put on the last one.
#[utoipa::path(
    post,
    path = "/quiz/next",
    responses(
        (status = 200, description = "Moved forward", body = QuizSessionView),
        (status = 409, description = "No quiz is in progress")
    )
)]
pub async fn next_question_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QuizSessionView>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    workspace.quiz.next()?;
    Ok(Json(QuizSessionView::from(&workspace.quiz)))
}

/// Move to the previous question; stays put on the first one.
#[utoipa::path(
    post,
    path = "/quiz/previous",
    responses(
        (status = 200, description = "Moved back", body = QuizSessionView),
        (status = 409, description = "No quiz is in progress")
    )
)]
pub async fn previous_question_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QuizSessionView>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    workspace.quiz.previous()?;
    Ok(Json(QuizSessionView::from(&workspace.quiz)))
}

/// Score the quiz. Unanswered questions count as wrong.
#[utoipa::path(
    post,
    path = "/quiz/finish",
    responses(
        (
            status = 200,
            description = "The scored quiz with answers revealed",
            body = QuizSessionView
        ),
        (status = 409, description = "No quiz is in progress")
    )
)]
pub async fn finish_quiz_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QuizSessionView>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    let result = workspace.quiz.finish()?;
    info!(score = result.score, total = result.total, "Quiz finished");
    Ok(Json(QuizSessionView::from(&workspace.quiz)))
}

/// Discard the quiz and return to configuring.
#[utoipa::path(
    post,
    path = "/quiz/reset",
    responses((status = 200, description = "Back to configuring", body = QuizSessionView))
)]
pub async fn reset_quiz_handler(State(state): State<Arc<AppState>>) -> Json<QuizSessionView> {
    let mut workspace = state.workspace.lock().await;
    workspace.quiz.reset();
    Json(QuizSessionView::from(&workspace.quiz))
}
