//! Speaker verification via voice embeddings and cosine similarity.
//!
//! # Architecture
//!
//! The pipeline processes each request in three stages:
//!
//! 1. [`decode_pcm16`]: PCM16 16kHz mono audio -> normalized f32 samples
//! 2. [`EmbeddingModel::encode`]: samples -> fixed-length embedding vector
//! 3. [`cosine_sim`] + [`Threshold`]: two embeddings -> [`Verification`]
//!
//! [`SpeakerService`] ties the stages together and exposes the two
//! operations consumed by the HTTP layer:
//!
//! - `enroll(audio)` returns the embedding for a reference recording;
//!   the calling backend owns its storage.
//! - `verify(stored, audio)` compares a live chunk against a previously
//!   enrolled embedding and decides match / no-match.
//!
//! The service is stateless: nothing persists between calls. The only
//! process-wide state is the one-time model-load outcome, which gates
//! every operation (see [`SpeakerService::unavailable`]).
//!
//! # Model
//!
//! The embedding model itself is an external collaborator behind the
//! [`EmbeddingModel`] trait. [`RemoteModel`] delegates to an inference
//! sidecar over HTTP; tests inject deterministic fakes.

mod error;
mod model;
mod pcm;
mod remote;
mod service;
mod similarity;

pub use error::SpeakerError;
pub use model::EmbeddingModel;
pub use pcm::decode_pcm16;
pub use remote::{RemoteModel, RemoteModelConfig};
pub use service::{ServiceConfig, SpeakerService};
pub use similarity::{cosine_sim, Threshold, Verification};
