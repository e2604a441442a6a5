use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SpeakerError;
use crate::model::EmbeddingModel;

const DEFAULT_DIMENSION: usize = 192;
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Configuration for [`RemoteModel`].
#[derive(Debug, Clone)]
pub struct RemoteModelConfig {
    /// Base URL of the inference sidecar (e.g. "http://127.0.0.1:8601").
    pub base_url: String,
    /// Embedding dimensionality the sidecar produces (default: 192).
    pub dimension: usize,
    /// Per-request timeout. Inference is expected to finish well under
    /// this; the bound keeps a wedged sidecar from stalling callers.
    pub timeout: Duration,
}

impl RemoteModelConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            dimension: DEFAULT_DIMENSION,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.dimension = dim;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`EmbeddingModel`] implementation backed by an inference sidecar
/// over HTTP.
///
/// The sidecar owns the actual neural network; this adapter only ships
/// normalized samples out and embeddings back:
///
/// - `GET  {base_url}/health` -> 200 when the model is loaded
/// - `POST {base_url}/encode` with `{"samples": [[f32,...],...]}` ->
///   `{"embeddings": [[f32,...],...]}`
///
/// [`RemoteModel::connect`] probes the health endpoint exactly once.
/// A failed probe is a permanent model-load failure for this process;
/// callers degrade to the unavailable state instead of retrying.
pub struct RemoteModel {
    client: Client,
    base_url: String,
    dim: usize,
}

#[derive(Serialize)]
struct EncodeRequest<'a> {
    samples: &'a [Vec<f32>],
}

#[derive(Deserialize)]
struct EncodeResponse {
    embeddings: Vec<Vec<f32>>,
}

impl RemoteModel {
    /// Connects to the sidecar, probing its health endpoint once.
    pub async fn connect(cfg: RemoteModelConfig) -> Result<Self, SpeakerError> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| SpeakerError::Model(e.to_string()))?;

        let url = format!("{}/health", cfg.base_url);
        let resp = client
            .get(&url)
            .send()
            .await
            .map_err(|e| SpeakerError::Model(format!("health probe: {e}")))?;
        if !resp.status().is_success() {
            return Err(SpeakerError::Model(format!(
                "health probe: HTTP {}",
                resp.status()
            )));
        }

        Ok(Self {
            client,
            base_url: cfg.base_url,
            dim: cfg.dimension,
        })
    }

    async fn call_encode(&self, batch: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, SpeakerError> {
        let url = format!("{}/encode", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&EncodeRequest { samples: batch })
            .send()
            .await
            .map_err(|e| SpeakerError::Model(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SpeakerError::Model(format!("HTTP {status}: {body}")));
        }

        let data: EncodeResponse = resp
            .json()
            .await
            .map_err(|e| SpeakerError::Model(e.to_string()))?;

        if data.embeddings.len() != batch.len() {
            return Err(SpeakerError::Model(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                data.embeddings.len()
            )));
        }
        for emb in &data.embeddings {
            if emb.len() != self.dim {
                return Err(SpeakerError::DimensionMismatch {
                    expected: self.dim,
                    got: emb.len(),
                });
            }
        }
        Ok(data.embeddings)
    }
}

#[async_trait::async_trait]
impl EmbeddingModel for RemoteModel {
    async fn encode(&self, samples: &[f32]) -> Result<Vec<f32>, SpeakerError> {
        let batch = [samples.to_vec()];
        let mut out = self.call_encode(&batch).await?;
        Ok(out.remove(0))
    }

    async fn encode_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, SpeakerError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        self.call_encode(batch).await
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
