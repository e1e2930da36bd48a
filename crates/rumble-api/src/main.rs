//! Rumble arena server entry point.

use std::error::Error;
use std::sync::Arc;

use rumble_api::config::AppConfig;
use rumble_api::state::AppState;
use rumble_core::clock::SystemClock;
use rumble_core::narrator::Narrator;
use rumble_core::rng::SystemRng;
use rumble_gateway::BroadcastGateway;
use rumble_narrative::application::narration::PromptEchoNarrator;
use rumble_narrative::application::openai::OpenAiNarrator;
use rumble_round::{Collaborators, RoundService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Rumble arena server");

    // Read configuration from environment.
    let config = AppConfig::from_env()?;
    let addr = config.bind_addr()?;

    let narrator: Arc<dyn Narrator> = match config.narrator.clone() {
        Some(openai) => {
            tracing::info!(model = %openai.model, base_url = %openai.base_url, "using OpenAI narrator");
            Arc::new(OpenAiNarrator::new(openai))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, narrating with event descriptions");
            Arc::new(PromptEchoNarrator)
        }
    };

    // Start the round service.
    let gateway = Arc::new(BroadcastGateway::new());
    let (round, _service) = RoundService::spawn(
        config.timings,
        Collaborators {
            sink: gateway.clone(),
            narrator,
            clock: Arc::new(SystemClock),
            rng: Box::new(SystemRng::from_entropy()),
        },
    );

    // Build router.
    let app = rumble_api::build_router(AppState::new(round, gateway));

    // Start server.
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
