//! services/api/src/web/auth.rs
//!
//! Mock authentication. Any email is accepted, no password is checked, and the
//! resulting user is persisted through the session store.

use crate::{
    error::ApiError,
    web::{
        extract::AppJson,
        protocol::{CredentialsRequest, SessionResponse, UserView},
        state::AppState,
    },
};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use study_assistant_core::domain::AuthUser;
use tracing::{info, warn};

async fn sign_in(
    state: &AppState,
    req: CredentialsRequest,
) -> Result<Json<SessionResponse>, ApiError> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }

    let user = AuthUser::from_email(email);
    state
        .session_store
        .save_session(&user)
        .await
        .map_err(|e| ApiError::upstream("Failed to save session", e))?;
    info!(email = %user.email, "User signed in");

    let view = UserView::from(&user);
    state.workspace.lock().await.current_user = Some(user);
    Ok(Json(SessionResponse { user: Some(view) }))
}

/// POST /auth/login - Start a mock session
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 400, description = "Email missing")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    sign_in(&state, req).await
}

/// POST /auth/signup - Identical to login in the mock
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed up and signed in", body = SessionResponse),
        (status = 400, description = "Email missing")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    sign_in(&state, req).await
}

/// POST /auth/logout - Forget the current user
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    if let Err(e) = state.session_store.clear_session().await {
        warn!("Failed to clear saved session: {}", e);
    }
    state.workspace.lock().await.current_user = None;
    StatusCode::NO_CONTENT
}

/// GET /auth/me - The signed-in user, if any
#[utoipa::path(
    get,
    path = "/auth/me",
    responses((status = 200, description = "The current session", body = SessionResponse))
)]
pub async fn me_handler(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let workspace = state.workspace.lock().await;
    Json(SessionResponse {
        user: workspace.current_user.as_ref().map(UserView::from),
    })
}
