//! HTTP server exposing the speaker verification pipeline.
//!
//! API endpoints:
//! - POST /api/enroll - multipart `file` (raw PCM16) -> embedding JSON
//! - POST /api/verify - multipart `embedding` (JSON array) + `file` -> decision JSON
//! - GET  /health     - model identifier
//! - GET  /           - static greeting

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use sonicbridge_speaker::{SpeakerError, SpeakerService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SpeakerService>,
    /// Identifier of the backing model, reported by /health.
    pub model_id: String,
}

#[derive(Debug, Serialize)]
struct EnrollResponse {
    embedding: Vec<f32>,
    message: String,
}

#[derive(Debug, Serialize)]
struct VerifyResponse {
    similarity: f32,
    is_match: bool,
    message: String,
}

/// Error shape returned to callers: `{"detail": "..."}` with a status
/// code derived from the error class.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<SpeakerError> for ApiError {
    fn from(err: SpeakerError) -> Self {
        let status = match err {
            SpeakerError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            SpeakerError::EmptyAudio
            | SpeakerError::OddByteLength { .. }
            | SpeakerError::DimensionMismatch { .. } => StatusCode::BAD_REQUEST,
            SpeakerError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

/// Starts the HTTP server and blocks until it exits.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let app = router(state);

    let addr = parse_addr(addr)?;
    tracing::info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/enroll", post(enroll))
        .route("/api/verify", post(verify))
        .with_state(state)
}

/// Parses an address string, expanding the ":port" shorthand to
/// "0.0.0.0:port".
fn parse_addr(addr: &str) -> Result<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };
    Ok(addr.parse()?)
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "SonicBridge speaker service is running" }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "model": state.model_id }))
}

async fn enroll(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EnrollResponse>, ApiError> {
    let parts = UploadParts::read(multipart).await?;
    let audio = parts.require_file()?;

    let embedding = state.service.enroll(&audio).await?;
    Ok(Json(EnrollResponse {
        embedding,
        message: "Host enrolled successfully".to_string(),
    }))
}

async fn verify(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<VerifyResponse>, ApiError> {
    let parts = UploadParts::read(multipart).await?;
    let stored = parts.require_embedding()?;
    let audio = parts.require_file()?;

    let result = state.service.verify(&stored, &audio).await?;
    Ok(Json(VerifyResponse {
        similarity: result.similarity,
        is_match: result.is_match,
        message: "Verification complete".to_string(),
    }))
}

/// Multipart fields accepted by enroll and verify. Unknown parts are
/// ignored so callers can attach extra metadata without breaking.
#[derive(Default)]
struct UploadParts {
    file: Option<Vec<u8>>,
    embedding: Option<Vec<f32>>,
}

impl UploadParts {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut parts = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
        {
            match field.name().unwrap_or_default() {
                "file" => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("read file part: {e}")))?;
                    parts.file = Some(data.to_vec());
                }
                "embedding" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("read embedding part: {e}")))?;
                    parts.embedding = Some(parse_embedding(&text)?);
                }
                _ => {}
            }
        }
        Ok(parts)
    }

    fn require_file(&self) -> Result<Vec<u8>, ApiError> {
        self.file
            .clone()
            .ok_or_else(|| ApiError::bad_request("missing multipart part: file"))
    }

    fn require_embedding(&self) -> Result<Vec<f32>, ApiError> {
        self.embedding
            .clone()
            .ok_or_else(|| ApiError::bad_request("missing multipart part: embedding"))
    }
}

/// Parses a stored embedding sent as a JSON float array.
fn parse_embedding(text: &str) -> Result<Vec<f32>, ApiError> {
    let embedding: Vec<f32> = serde_json::from_str(text)
        .map_err(|e| ApiError::bad_request(format!("invalid embedding JSON: {e}")))?;
    if embedding.is_empty() {
        return Err(ApiError::bad_request("embedding must not be empty"));
    }
    Ok(embedding)
}
