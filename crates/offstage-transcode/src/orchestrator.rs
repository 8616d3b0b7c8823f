//! The transcoding state machine: trigger jobs, apply completion callbacks,
//! bound retries.

use std::sync::Arc;

use uuid::Uuid;

use offstage_core::models::{MediaItem, MediaStatus, TranscodeOutputs, TranscodeStatusResponse};
use offstage_core::AppError;
use offstage_encoder::{EncodeCallback, EncodeCallbackStatus, EncodeJobRequest, JobSubmitter};

use crate::store::MediaStore;

/// Orchestrator settings derived from the application config.
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
    /// Callback URL handed to the worker with every job.
    pub callback_url: String,
    /// Retry cap; the conditional retry update enforces it at write time.
    pub max_attempts: i32,
}

impl TranscodeConfig {
    pub fn from_app_config(config: &offstage_core::Config) -> Self {
        Self {
            callback_url: config.transcode_callback_url(),
            max_attempts: config.max_transcode_attempts,
        }
    }
}

/// What a callback did. Stale and duplicate deliveries are successful no-ops,
/// not errors; redelivery is an expected property of the worker contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Outputs applied, media is `ready`.
    Completed,
    /// Failure recorded, media is `failed` and eligible for retry.
    Failed,
    /// The record had already moved on; nothing was written.
    Stale,
}

/// Coordinates the media transcoding lifecycle against the store and the
/// external encoding worker. Stateless between calls.
pub struct TranscodeOrchestrator {
    store: Arc<dyn MediaStore>,
    submitter: Arc<dyn JobSubmitter>,
    config: TranscodeConfig,
}

impl TranscodeOrchestrator {
    pub fn new(
        store: Arc<dyn MediaStore>,
        submitter: Arc<dyn JobSubmitter>,
        config: TranscodeConfig,
    ) -> Self {
        Self {
            store,
            submitter,
            config,
        }
    }

    /// Load a non-deleted item and check ownership. Owner mismatch is
    /// distinguishable from not-found for caller diagnostics.
    async fn load_and_authorize(
        &self,
        media_id: Uuid,
        owner_id: Uuid,
    ) -> Result<MediaItem, AppError> {
        let item = self
            .store
            .find_active(media_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media item {} not found", media_id)))?;

        if item.owner_id != owner_id {
            return Err(AppError::Ownership { media_id, owner_id });
        }

        Ok(item)
    }

    /// Submit an encode job for an `uploaded` media item.
    ///
    /// Submission failures leave the record untouched (still `uploaded`);
    /// only a successful submission moves it to `transcoding`. Concurrent
    /// triggers for the same item are expected to be serialized by the
    /// caller.
    #[tracing::instrument(skip(self))]
    pub async fn trigger_job(
        &self,
        media_id: Uuid,
        owner_id: Uuid,
        priority: Option<i32>,
    ) -> Result<MediaItem, AppError> {
        let item = self.load_and_authorize(media_id, owner_id).await?;

        if item.status != MediaStatus::Uploaded {
            return Err(AppError::InvalidState {
                current: item.status,
                expected: MediaStatus::Uploaded,
            });
        }

        let Some(input_ref) = item.input_ref.clone() else {
            tracing::warn!(media_id = %media_id, "Uploaded media item has no input ref");
            return Err(AppError::InvalidState {
                current: item.status,
                expected: MediaStatus::Uploaded,
            });
        };

        let request = EncodeJobRequest {
            media_id,
            media_type: item.kind,
            owner_id,
            input_ref,
            callback_url: self.config.callback_url.clone(),
            priority: priority.unwrap_or(item.priority),
        };

        let job_id = self.submitter.submit(&request).await.map_err(AppError::from)?;

        let updated = self
            .store
            .mark_transcoding(media_id, &job_id, priority)
            .await?;

        tracing::info!(
            media_id = %media_id,
            job_id = %job_id,
            priority = updated.priority,
            "Encode job submitted"
        );

        Ok(updated)
    }

    /// Apply a completion callback. The payload has already been
    /// authenticated by the webhook ingress.
    ///
    /// Resolution matches on job id first and falls back to the callback's
    /// media id; the conditional write additionally guards on the job id so
    /// a callback for a superseded job can never overwrite a newer attempt.
    #[tracing::instrument(skip(self, callback), fields(job_id = %callback.job_id))]
    pub async fn handle_callback(
        &self,
        callback: &EncodeCallback,
    ) -> Result<CallbackOutcome, AppError> {
        let item = match self.store.find_active_by_job_id(&callback.job_id).await? {
            Some(item) => item,
            None => {
                let media_id = callback
                    .media_id_hint()
                    .ok_or_else(|| AppError::JobNotFound(callback.job_id.clone()))?;
                self.store
                    .find_active(media_id)
                    .await?
                    .ok_or_else(|| AppError::JobNotFound(callback.job_id.clone()))?
            }
        };

        if item.status != MediaStatus::Transcoding {
            tracing::info!(
                media_id = %item.id,
                status = %item.status,
                "Stale or duplicate callback, ignoring"
            );
            return Ok(CallbackOutcome::Stale);
        }

        match callback.status {
            EncodeCallbackStatus::Completed => {
                let output = callback.output.clone().ok_or_else(|| {
                    AppError::InvalidInput("Completed callback is missing output".to_string())
                })?;
                let outputs = TranscodeOutputs::from(output);

                let applied = self
                    .store
                    .complete_job(item.id, &callback.job_id, &outputs)
                    .await?;
                if !applied {
                    tracing::info!(media_id = %item.id, "Record changed under callback, ignoring");
                    return Ok(CallbackOutcome::Stale);
                }

                tracing::info!(
                    media_id = %item.id,
                    duration_seconds = outputs.duration_seconds,
                    variant_count = outputs.ready_variants.len(),
                    "Media item is ready"
                );
                Ok(CallbackOutcome::Completed)
            }
            EncodeCallbackStatus::Failed => {
                let reason = callback
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown transcoding error".to_string());

                let applied = self
                    .store
                    .fail_job(item.id, &callback.job_id, &reason)
                    .await?;
                if !applied {
                    tracing::info!(media_id = %item.id, "Record changed under callback, ignoring");
                    return Ok(CallbackOutcome::Stale);
                }

                tracing::warn!(media_id = %item.id, error = %reason, "Transcoding failed");
                Ok(CallbackOutcome::Failed)
            }
        }
    }

    /// Move a `failed` item back to `uploaded` and submit a fresh job. The
    /// attempts cap is enforced by the conditional write; a zero-row result
    /// is disambiguated by re-reading the row.
    #[tracing::instrument(skip(self))]
    pub async fn retry_transcoding(
        &self,
        media_id: Uuid,
        owner_id: Uuid,
    ) -> Result<MediaItem, AppError> {
        let item = self.load_and_authorize(media_id, owner_id).await?;

        if item.status != MediaStatus::Failed {
            return Err(AppError::InvalidState {
                current: item.status,
                expected: MediaStatus::Failed,
            });
        }

        match self
            .store
            .reset_for_retry(media_id, self.config.max_attempts)
            .await?
        {
            Some(reset) => {
                tracing::info!(
                    media_id = %media_id,
                    attempt = reset.attempts,
                    "Retrying transcoding"
                );
                self.trigger_job(media_id, owner_id, None).await
            }
            None => {
                // Zero rows: either a concurrent writer moved the status or
                // the attempts cap is reached. Re-read to tell the caller
                // which.
                let current = self.store.find_active(media_id).await?.ok_or_else(|| {
                    AppError::NotFound(format!("Media item {} not found", media_id))
                })?;
                if current.status != MediaStatus::Failed {
                    Err(AppError::InvalidState {
                        current: current.status,
                        expected: MediaStatus::Failed,
                    })
                } else {
                    Err(AppError::MaxRetriesExceeded {
                        attempts: current.attempts,
                    })
                }
            }
        }
    }

    /// Fetch an item the caller owns.
    pub async fn get_media(&self, media_id: Uuid, owner_id: Uuid) -> Result<MediaItem, AppError> {
        self.load_and_authorize(media_id, owner_id).await
    }

    /// Read-only projection of an item's transcoding state.
    #[tracing::instrument(skip(self))]
    pub async fn get_status(
        &self,
        media_id: Uuid,
        owner_id: Uuid,
    ) -> Result<TranscodeStatusResponse, AppError> {
        let item = self.load_and_authorize(media_id, owner_id).await?;
        Ok(item.into())
    }
}
