//! Client for the external encoding worker.
//!
//! Submission is fire-and-forget: the worker acknowledges with an opaque job
//! id and reports the outcome later through a signed callback. The only
//! timeout here covers the submission call itself.

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::{EncoderClient, EncoderClientConfig};
pub use error::EncodeError;
pub use types::{
    EncodeCallback, EncodeCallbackStatus, EncodeJobAck, EncodeJobRequest, EncodeOutput,
};

/// Capability seam over the encoding worker. The production implementation is
/// [`EncoderClient`]; tests substitute a fake that records submissions.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    /// Hand a job to the worker and return its opaque job id. Does not wait
    /// for transcoding; completion arrives out-of-band via callback.
    async fn submit(&self, request: &EncodeJobRequest) -> Result<String, EncodeError>;
}
