//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{JsonFileSessionStore, OpenAiChatAdapter, OpenAiSstAdapter, PlaceholderPdfExtractor},
    config::Config,
    error::ApiError,
    web::{
        self,
        state::{AppState, Workspace},
    },
};
use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use study_assistant_core::ports::{CompletionService, SessionStore, SpeechToTextService};
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let mut chat_llm: Option<Arc<dyn CompletionService>> = None;
    let mut quiz_llm: Option<Arc<dyn CompletionService>> = None;
    let mut sst_adapter: Option<Arc<dyn SpeechToTextService>> = None;
    match config.openai_api_key.as_deref() {
        Some(api_key) => {
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
            chat_llm = Some(Arc::new(OpenAiChatAdapter::new(
                openai_client.clone(),
                config.chat_model.clone(),
            )));
            quiz_llm = Some(Arc::new(OpenAiChatAdapter::new(
                openai_client.clone(),
                config.quiz_model.clone(),
            )));
            sst_adapter = Some(Arc::new(OpenAiSstAdapter::new(
                openai_client,
                config.sst_model.clone(),
                config.audio_sample_rate,
            )));
            info!(
                chat_model = %config.chat_model,
                quiz_model = %config.quiz_model,
                "OpenAI adapters ready"
            );
        }
        None => warn!("OPENAI_API_KEY is not set; chat, quiz and voice endpoints will answer 401"),
    }

    // --- 3. Restore the Saved Session ---
    let session_store = Arc::new(JsonFileSessionStore::new(config.session_path.clone()));
    let current_user = session_store.load_session().await;

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        chat_llm,
        quiz_llm,
        sst_adapter,
        pdf_extractor: Arc::new(PlaceholderPdfExtractor::new()),
        session_store,
        workspace: Mutex::new(Workspace::with_user(current_user)),
    });

    // --- 5. Create the Web Router ---
    let app = web::router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
