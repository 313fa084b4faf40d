use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use arcana_auth::FirebaseVerifier;
use arcana_core::{QuestionValidator, ReadingGenerator, ReadingPipeline, WhitespaceTokenCounter};
use arcana_provider::GeminiProvider;
use arcana_server::config::ServerConfig;
use arcana_server::state::AppState;
use arcana_speech::GoogleSpeechSynthesizer;
use arcana_store::ConversationStore;

#[derive(Parser)]
#[command(name = "arcana-server", version, about = "Localized Tarot-reading backend")]
struct Cli {
    #[arg(long, help = "Path to a yaml config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Override the configured listen address")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    // Missing keys fail here, before any request is served.
    let provider = Arc::new(GeminiProvider::from_env(config.gemini_api_base.clone())?);
    let synthesizer = Arc::new(GoogleSpeechSynthesizer::from_env(config.tts_api_base.clone())?);
    let verifier = Arc::new(FirebaseVerifier::from_env(config.identity_api_base.clone())?);
    let store = Arc::new(ConversationStore::open(&config.database_path)?);

    let pipeline = ReadingPipeline::new(
        verifier,
        QuestionValidator::new(provider.clone(), config.model.clone()),
        ReadingGenerator::new(provider, config.model),
        synthesizer,
        store,
        Arc::new(WhitespaceTokenCounter),
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    arcana_server::serve(state, &config.listen_addr).await
}
