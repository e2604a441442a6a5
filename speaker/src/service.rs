use std::sync::Arc;

use crate::error::SpeakerError;
use crate::model::EmbeddingModel;
use crate::pcm::decode_pcm16;
use crate::similarity::{cosine_sim, Threshold, Verification};

/// Configuration for [`SpeakerService`].
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Match decision threshold (default: 0.75, strict greater-than).
    pub threshold: Threshold,
}

/// Orchestrates the verification pipeline: decode -> encode -> compare.
///
/// The service is stateless across calls. The only state it carries is
/// the one-time model-load outcome: a service built with
/// [`SpeakerService::unavailable`] rejects every operation with
/// [`SpeakerError::ModelUnavailable`] until the process restarts.
///
/// The model capability is shared read-only, so concurrent enroll and
/// verify calls are safe.
pub struct SpeakerService {
    model: Option<Arc<dyn EmbeddingModel>>,
    threshold: Threshold,
}

impl SpeakerService {
    /// Creates a service backed by a loaded embedding model.
    pub fn new(model: Arc<dyn EmbeddingModel>, cfg: ServiceConfig) -> Self {
        Self {
            model: Some(model),
            threshold: cfg.threshold,
        }
    }

    /// Creates a service in the model-not-loaded state. Every operation
    /// fails fast with [`SpeakerError::ModelUnavailable`].
    pub fn unavailable(cfg: ServiceConfig) -> Self {
        Self {
            model: None,
            threshold: cfg.threshold,
        }
    }

    /// Returns true if the embedding model loaded at startup.
    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    fn model(&self) -> Result<&Arc<dyn EmbeddingModel>, SpeakerError> {
        self.model.as_ref().ok_or(SpeakerError::ModelUnavailable)
    }

    /// Computes the speaker embedding for a reference recording.
    ///
    /// The returned vector always has the model's fixed dimensionality.
    /// The caller persists it; this service stores nothing.
    pub async fn enroll(&self, audio: &[u8]) -> Result<Vec<f32>, SpeakerError> {
        let model = self.model()?;
        let samples = decode_pcm16(audio)?;
        let embedding = model.encode(&samples).await?;
        tracing::debug!(samples = samples.len(), dim = embedding.len(), "enrolled speaker");
        Ok(embedding)
    }

    /// Compares a live audio chunk against a previously enrolled embedding.
    ///
    /// The stored embedding must have the same dimensionality as the
    /// model's output; a mismatch is rejected before any similarity math.
    pub async fn verify(
        &self,
        stored: &[f32],
        audio: &[u8],
    ) -> Result<Verification, SpeakerError> {
        let model = self.model()?;
        let samples = decode_pcm16(audio)?;
        let fresh = model.encode(&samples).await?;

        if stored.len() != fresh.len() {
            return Err(SpeakerError::DimensionMismatch {
                expected: fresh.len(),
                got: stored.len(),
            });
        }

        let similarity = cosine_sim(&fresh, stored);
        let is_match = self.threshold.decide(similarity);
        tracing::debug!(similarity, is_match, "verified speaker");
        Ok(Verification {
            similarity,
            is_match,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for the embedding model: folds the sample
    /// sequence into `dim` buckets so different audio yields different
    /// directions while identical audio yields identical vectors.
    struct FakeModel {
        dim: usize,
    }

    #[async_trait::async_trait]
    impl EmbeddingModel for FakeModel {
        async fn encode(&self, samples: &[f32]) -> Result<Vec<f32>, SpeakerError> {
            let mut v = vec![0.1f32; self.dim];
            for (i, &s) in samples.iter().enumerate() {
                v[i % self.dim] += s * (1.0 + (i % 7) as f32 * 0.01);
            }
            Ok(v)
        }

        fn dimension(&self) -> usize {
            self.dim
        }
    }

    fn service(dim: usize) -> SpeakerService {
        SpeakerService::new(Arc::new(FakeModel { dim }), ServiceConfig::default())
    }

    fn sine_pcm(freq_hz: f64, n_samples: usize) -> Vec<u8> {
        let mut audio = vec![0u8; n_samples * 2];
        for i in 0..n_samples {
            let t = i as f64 / 16000.0;
            let sample = (16000.0 * (freq_hz * 2.0 * std::f64::consts::PI * t).sin()) as i16;
            audio[2 * i] = sample as u8;
            audio[2 * i + 1] = (sample >> 8) as u8;
        }
        audio
    }

    #[tokio::test]
    async fn enroll_returns_model_dimension() {
        let svc = service(192);
        // 10s of 16kHz silence.
        let audio = vec![0u8; 16000 * 2 * 10];
        let emb = svc.enroll(&audio).await.unwrap();
        assert_eq!(emb.len(), 192);
        assert!(emb.iter().all(|x| x.is_finite()));
    }

    #[tokio::test]
    async fn enroll_is_deterministic() {
        let svc = service(192);
        let audio = sine_pcm(440.0, 16000);
        let a = svc.enroll(&audio).await.unwrap();
        let b = svc.enroll(&audio).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn verify_same_chunk_matches() {
        let svc = service(64);
        let audio = sine_pcm(330.0, 8000);
        let stored = svc.enroll(&audio).await.unwrap();
        let result = svc.verify(&stored, &audio).await.unwrap();
        assert!((result.similarity - 1.0).abs() < 1e-5);
        assert!(result.is_match);
    }

    #[tokio::test]
    async fn verify_negated_embedding_rejects() {
        let svc = service(64);
        let audio = sine_pcm(330.0, 8000);
        let stored: Vec<f32> = svc
            .enroll(&audio)
            .await
            .unwrap()
            .iter()
            .map(|x| -x)
            .collect();
        let result = svc.verify(&stored, &audio).await.unwrap();
        assert!((result.similarity + 1.0).abs() < 1e-5);
        assert!(!result.is_match);
    }

    #[tokio::test]
    async fn verify_dimension_mismatch_rejected() {
        let svc = service(64);
        let audio = sine_pcm(330.0, 8000);
        let stored = vec![0.5f32; 32];
        let err = svc.verify(&stored, &audio).await.unwrap_err();
        assert!(matches!(
            err,
            SpeakerError::DimensionMismatch {
                expected: 64,
                got: 32
            }
        ));
    }

    #[tokio::test]
    async fn unavailable_service_fails_fast() {
        let svc = SpeakerService::unavailable(ServiceConfig::default());
        assert!(!svc.is_available());

        // Even malformed audio reports ModelUnavailable: the gate comes
        // before any decoding.
        let err = svc.enroll(&[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, SpeakerError::ModelUnavailable));

        let err = svc.verify(&[1.0], &[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, SpeakerError::ModelUnavailable));
    }

    #[tokio::test]
    async fn malformed_audio_rejected() {
        let svc = service(16);
        let err = svc.enroll(&[1, 2, 3, 4, 5]).await.unwrap_err();
        assert!(matches!(err, SpeakerError::OddByteLength { len: 5 }));

        let err = svc.enroll(&[]).await.unwrap_err();
        assert!(matches!(err, SpeakerError::EmptyAudio));
    }
}
