//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the mutable study workspace.

use crate::{config::Config, error::ApiError};
use std::sync::Arc;
use study_assistant_core::{
    domain::AuthUser,
    ports::{CompletionService, PdfTextExtractor, SessionStore, SpeechToTextService},
    ChatStore, DocumentStore, QuizSession,
};
use tokio::{runtime::Handle, sync::Mutex};
use tracing::warn;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The LLM-backed services are optional: without an API key the server still
/// starts, and the endpoints that need them answer with a credentials error.
pub struct AppState {
    pub config: Arc<Config>,
    pub chat_llm: Option<Arc<dyn CompletionService>>,
    pub quiz_llm: Option<Arc<dyn CompletionService>>,
    pub sst_adapter: Option<Arc<dyn SpeechToTextService>>,
    pub pdf_extractor: Arc<dyn PdfTextExtractor>,
    pub session_store: Arc<dyn SessionStore>,
    pub workspace: Mutex<Workspace>,
}

impl AppState {
    pub fn chat_service(&self) -> Result<Arc<dyn CompletionService>, ApiError> {
        self.chat_llm.clone().ok_or(ApiError::MissingCredentials)
    }

    pub fn quiz_service(&self) -> Result<Arc<dyn CompletionService>, ApiError> {
        self.quiz_llm.clone().ok_or(ApiError::MissingCredentials)
    }

    pub fn speech_service(&self) -> Result<Arc<dyn SpeechToTextService>, ApiError> {
        self.sst_adapter.clone().ok_or(ApiError::MissingCredentials)
    }
}

//=========================================================================================
// Workspace (The User's Study Material and Progress)
//=========================================================================================

/// Everything a user builds up while studying. Handlers take the lock only for
/// short bookkeeping steps and never hold it across a remote call.
#[derive(Debug, Default)]
pub struct Workspace {
    pub documents: DocumentStore,
    pub chat: ChatStore,
    pub quiz: QuizSession,
    /// Set while a quiz-generation call is outstanding.
    pub quiz_generating: bool,
    pub current_user: Option<AuthUser>,
}

impl Workspace {
    /// A fresh workspace with the user restored from the session store, if any.
    pub fn with_user(current_user: Option<AuthUser>) -> Self {
        Self {
            current_user,
            ..Self::default()
        }
    }

    /// The explicit context if one was supplied, otherwise the combined documents.
    pub fn resolve_context(&self, explicit: Option<&str>) -> String {
        match explicit.filter(|text| !text.trim().is_empty()) {
            Some(text) => text.to_string(),
            None => self.documents.combined_content(),
        }
    }
}

//=========================================================================================
// In-flight Guard (Clears a Re-entry Flag Even When the Request Is Dropped)
//=========================================================================================

/// Which re-entry flag an outstanding remote call holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlight {
    Chat,
    QuizGeneration,
}

impl InFlight {
    fn set(self, workspace: &mut Workspace, value: bool) {
        match self {
            InFlight::Chat => workspace.chat.set_pending(value),
            InFlight::QuizGeneration => workspace.quiz_generating = value,
        }
    }
}

/// Holds a re-entry flag for the duration of a remote call.
///
/// The handler calls [`InFlightGuard::release`] once it has re-locked the
/// workspace. If the handler future is dropped first (the client went away),
/// `Drop` clears the flag instead.
pub struct InFlightGuard {
    state: Arc<AppState>,
    kind: InFlight,
    armed: bool,
}

impl InFlightGuard {
    /// Raises the flag on a workspace the caller holds locked.
    pub fn acquire(state: Arc<AppState>, workspace: &mut Workspace, kind: InFlight) -> Self {
        kind.set(workspace, true);
        Self {
            state,
            kind,
            armed: true,
        }
    }

    /// Clears the flag on a workspace the caller holds locked.
    pub fn release(mut self, workspace: &mut Workspace) {
        self.kind.set(workspace, false);
        self.armed = false;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(kind = ?self.kind, "Request dropped during a remote call; clearing its flag");
        if let Ok(mut workspace) = self.state.workspace.try_lock() {
            self.kind.set(&mut workspace, false);
            return;
        }
        // The flag still blocks re-entry, so clearing it a little later is safe.
        let kind = self.kind;
        let state = self.state.clone();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    kind.set(&mut *state.workspace.lock().await, false);
                });
            }
            Err(_) => warn!(kind = ?kind, "No runtime available; flag left set"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::PlaceholderPdfExtractor;
    use async_trait::async_trait;
    use study_assistant_core::{ports::PortResult, DocumentKind};

    struct NoSessions;

    #[async_trait]
    impl SessionStore for NoSessions {
        async fn load_session(&self) -> Option<AuthUser> {
            None
        }

        async fn save_session(&self, _user: &AuthUser) -> PortResult<()> {
            Ok(())
        }

        async fn clear_session(&self) -> PortResult<()> {
            Ok(())
        }
    }

    fn bare_state() -> Arc<AppState> {
        Arc::new(AppState {
            config: Arc::new(Config::default()),
            chat_llm: None,
            quiz_llm: None,
            sst_adapter: None,
            pdf_extractor: Arc::new(PlaceholderPdfExtractor::new()),
            session_store: Arc::new(NoSessions),
            workspace: Mutex::new(Workspace::default()),
        })
    }

    #[tokio::test]
    async fn released_guard_leaves_flag_cleared() {
        let state = bare_state();
        let guard = {
            let mut workspace = state.workspace.lock().await;
            InFlightGuard::acquire(state.clone(), &mut workspace, InFlight::Chat)
        };
        assert!(state.workspace.lock().await.chat.is_pending());

        let mut workspace = state.workspace.lock().await;
        guard.release(&mut workspace);
        assert!(!workspace.chat.is_pending());
    }

    #[tokio::test]
    async fn dropped_guard_clears_flag() {
        let state = bare_state();
        let guard = {
            let mut workspace = state.workspace.lock().await;
            InFlightGuard::acquire(state.clone(), &mut workspace, InFlight::QuizGeneration)
        };
        assert!(state.workspace.lock().await.quiz_generating);

        drop(guard);
        assert!(!state.workspace.lock().await.quiz_generating);
    }

    #[tokio::test]
    async fn guard_dropped_while_locked_clears_flag_later() {
        let state = bare_state();
        let workspace = {
            let mut workspace = state.workspace.lock().await;
            let guard = InFlightGuard::acquire(state.clone(), &mut workspace, InFlight::Chat);
            drop(guard);
            workspace
        };
        assert!(workspace.chat.is_pending());
        drop(workspace);

        for _ in 0..10 {
            if !state.workspace.lock().await.chat.is_pending() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("flag was never cleared");
    }

    #[test]
    fn explicit_context_wins_over_documents() {
        let mut workspace = Workspace::default();
        workspace.documents.add("a.txt", "stored", DocumentKind::Text);

        assert_eq!(workspace.resolve_context(Some("given")), "given");
        assert_eq!(workspace.resolve_context(Some("   ")), "stored");
        assert_eq!(workspace.resolve_context(None), "stored");
    }
}
