// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use memory_lane::api::create_router;
use memory_lane::config::AppConfig;
use memory_lane::conversation::voice_clip::ClipUploadBackend;
use memory_lane::conversation::{terminal, BackendClient, ModeContext};
use memory_lane::shell::BackendSupervisor;
use memory_lane::state::AppState;
use memory_lane::voice::{SpeechBackend, UnsupportedBackend, VoiceInput};

#[derive(Parser)]
#[command(name = "memory-lane", version, about = "Companion chat for people living with dementia")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API (default)
    Serve,

    /// Talk to a running backend from the terminal
    Chat {
        #[arg(long, value_enum, default_value = "chat")]
        mode: ModeContext,

        /// Audio file the host recorder writes; enables /voice
        #[arg(long, env = "MEMORY_LANE_VOICE_CLIP")]
        voice_clip: Option<PathBuf>,
    },

    /// Start the backend, wait for it, then open the conversation view
    Desktop {
        #[arg(long, value_enum, default_value = "chat")]
        mode: ModeContext,

        #[arg(long, env = "MEMORY_LANE_VOICE_CLIP")]
        voice_clip: Option<PathBuf>,
    },
}

fn init_tracing(config: &AppConfig) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn voice_input(client: &BackendClient, clip: Option<PathBuf>) -> VoiceInput {
    let backend: Arc<dyn SpeechBackend> = match clip {
        Some(path) => Arc::new(ClipUploadBackend::new(client.clone(), path)),
        None => Arc::new(UnsupportedBackend),
    };
    VoiceInput::new(backend)
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Starting Memory Lane backend");
    info!("Model: {}", config.model);
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; every reply will be a safe fallback");
    }
    info!(
        "Transcription: {}",
        config.transcription_base_url.as_deref().unwrap_or("not configured")
    );

    let bind_address = config.bind_address();
    let app = create_router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("REST API listening on http://{}/api", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();
    init_tracing(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,

        Commands::Chat { mode, voice_clip } => {
            let client = BackendClient::new(&config.backend_url);
            let voice = voice_input(&client, voice_clip);
            terminal::run(&client, mode, &voice).await
        }

        Commands::Desktop { mode, voice_clip } => {
            // The child binds from the same config, so poll that address.
            let mut supervisor = BackendSupervisor::spawn_current(&config.local_url())?;
            if let Err(e) = supervisor.wait_healthy().await {
                supervisor.stop().await?;
                return Err(e);
            }

            let client = supervisor.client().clone();
            let voice = voice_input(&client, voice_clip);
            let result = terminal::run(&client, mode, &voice).await;

            supervisor.stop().await?;
            result
        }
    }
}
