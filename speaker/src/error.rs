use thiserror::Error;

/// Errors returned by speaker verification operations.
#[derive(Debug, Error)]
pub enum SpeakerError {
    /// The embedding model never loaded; every operation fails with this
    /// until the process restarts. There is no re-initialization path.
    #[error("speaker: model not loaded")]
    ModelUnavailable,

    #[error("speaker: empty audio buffer")]
    EmptyAudio,

    /// Buffer length is not a multiple of 2 and cannot be a whole number
    /// of PCM16 samples.
    #[error("speaker: audio byte length {len} is odd, expected whole PCM16 samples")]
    OddByteLength { len: usize },

    #[error("speaker: embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("speaker: model error: {0}")]
    Model(String),
}
