use crate::error::SpeakerError;

/// Computes speaker embedding vectors from normalized audio samples.
///
/// The input is mono audio normalized to [-1.0, 1.0] at the sample rate
/// the model was trained on (16000 Hz for the reference ECAPA model).
/// The output is a dense f32 vector whose length is returned by
/// [`EmbeddingModel::dimension`].
///
/// # Contract
///
/// - Inference only: no training side effects.
/// - Deterministic for a given input and loaded checkpoint.
/// - Implementations must be safe for concurrent use.
#[async_trait::async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Returns the embedding for a single sample sequence.
    async fn encode(&self, samples: &[f32]) -> Result<Vec<f32>, SpeakerError>;

    /// Returns embeddings for multiple sample sequences.
    /// Implementations may split large batches into smaller calls.
    async fn encode_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, SpeakerError> {
        let mut out = Vec::with_capacity(batch.len());
        for samples in batch {
            out.push(self.encode(samples).await?);
        }
        Ok(out)
    }

    /// Returns the dimensionality of the embedding vectors (e.g., 192).
    fn dimension(&self) -> usize;
}
