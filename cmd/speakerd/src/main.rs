//! speakerd - HTTP inference endpoint for speaker enrollment and verification.

mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sonicbridge_speaker::{
    RemoteModel, RemoteModelConfig, ServiceConfig, SpeakerService, Threshold,
};

use crate::server::AppState;

/// Stateless speaker verification endpoint.
///
/// Accepts raw PCM16 16kHz mono audio and returns voice embeddings
/// (enroll) or similarity decisions against a stored embedding (verify).
/// Identity storage is owned by the calling backend.
#[derive(Parser, Debug)]
#[command(name = "speakerd")]
#[command(about = "Speaker verification inference service")]
struct Args {
    /// Listen address (e.g. :7860 or 127.0.0.1:7860)
    #[arg(long, default_value = ":7860")]
    listen: String,

    /// Base URL of the embedding model sidecar
    #[arg(long)]
    model_url: Option<String>,

    /// Embedding dimensionality produced by the model
    #[arg(long, default_value_t = 192)]
    dimension: usize,

    /// Match decision threshold (similarity must exceed it strictly)
    #[arg(long, default_value_t = 0.75)]
    threshold: f32,

    /// Model request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let cfg = ServiceConfig {
        threshold: Threshold(args.threshold),
    };

    // The model loads exactly once. A failed load is logged and the
    // process serves 503s until restarted, matching the contract that
    // callers see a uniform unavailable signal rather than a crash.
    let (service, model_id) = match &args.model_url {
        Some(url) => {
            let model_cfg = RemoteModelConfig::new(url)
                .with_dimension(args.dimension)
                .with_timeout(Duration::from_millis(args.timeout_ms));
            match RemoteModel::connect(model_cfg).await {
                Ok(model) => {
                    tracing::info!(url = %url, dimension = args.dimension, "embedding model ready");
                    (SpeakerService::new(Arc::new(model), cfg), url.clone())
                }
                Err(e) => {
                    tracing::warn!("could not load embedding model: {e}");
                    (SpeakerService::unavailable(cfg), "unavailable".to_string())
                }
            }
        }
        None => {
            tracing::warn!("no --model-url configured, serving in unavailable state");
            (SpeakerService::unavailable(cfg), "unavailable".to_string())
        }
    };

    let state = AppState {
        service: Arc::new(service),
        model_id,
    };
    server::serve(&args.listen, state).await
}
