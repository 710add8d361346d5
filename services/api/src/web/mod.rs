pub mod auth;
pub mod chat;
pub mod documents;
pub mod extract;
pub mod protocol;
pub mod quiz;
pub mod rest;
pub mod state;
pub mod voice;


use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin).allow_credentials(true),
        Err(e) => {
            warn!("Ignoring invalid CORS_ORIGIN {:?}: {}", origin, e);
            layer
        }
    }
}

/// Builds the complete application: the REST API plus the Swagger UI.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origin);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let api_router = Router::new()
        .route("/health", get(rest::health_handler))
        .route(
            "/documents",
            get(documents::list_documents_handler)
                .post(documents::upload_documents_handler)
                .delete(documents::clear_documents_handler),
        )
        .route("/documents/text", post(documents::paste_text_handler))
        .route("/documents/context", get(documents::context_handler))
        .route("/documents/{id}", delete(documents::delete_document_handler))
        .route("/chat", post(chat::chat_handler))
        .route(
            "/chat/messages",
            get(chat::chat_history_handler).delete(chat::clear_chat_handler),
        )
        .route(
            "/quiz",
            get(quiz::quiz_state_handler).post(quiz::generate_quiz_handler),
        )
        .route("/quiz/answer", post(quiz::answer_handler))
        .route("/quiz/next", post(quiz::next_question_handler))
        .route("/quiz/previous", post(quiz::previous_question_handler))
        .route("/quiz/finish", post(quiz::finish_quiz_handler))
        .route("/quiz/reset", post(quiz::reset_quiz_handler))
        .route("/voice/transcribe", post(voice::transcribe_handler))
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
        .layer(body_limit)
        .layer(cors)
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
