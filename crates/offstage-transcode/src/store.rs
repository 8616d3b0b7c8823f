//! Abstraction over the media item store.
//!
//! The orchestrator talks to this trait so tests can substitute an in-memory
//! store with the same compare-and-set semantics. Production uses
//! [`SqlMediaStore`], a thin delegate to the Postgres repository.

use async_trait::async_trait;
use uuid::Uuid;

use offstage_core::models::{MediaItem, TranscodeOutputs};
use offstage_core::AppError;
use offstage_db::MediaItemRepository;

/// Store operations the orchestrator needs. The boolean-returning writes are
/// conditional: `false` means the precondition no longer held at write time.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Fetch a non-deleted item by id.
    async fn find_active(&self, media_id: Uuid) -> Result<Option<MediaItem>, AppError>;

    /// Fetch a non-deleted item by job id.
    async fn find_active_by_job_id(&self, job_id: &str) -> Result<Option<MediaItem>, AppError>;

    /// Move an item into `transcoding` under the given job id.
    async fn mark_transcoding(
        &self,
        media_id: Uuid,
        job_id: &str,
        priority: Option<i32>,
    ) -> Result<MediaItem, AppError>;

    /// Conditional: apply success outputs iff still `transcoding` under
    /// `job_id`.
    async fn complete_job(
        &self,
        media_id: Uuid,
        job_id: &str,
        outputs: &TranscodeOutputs,
    ) -> Result<bool, AppError>;

    /// Conditional: mark failed iff still `transcoding` under `job_id`.
    async fn fail_job(&self, media_id: Uuid, job_id: &str, error: &str)
        -> Result<bool, AppError>;

    /// Conditional: failed → uploaded with `attempts + 1`, iff
    /// `status = failed AND attempts < max_attempts`.
    async fn reset_for_retry(
        &self,
        media_id: Uuid,
        max_attempts: i32,
    ) -> Result<Option<MediaItem>, AppError>;
}

/// Production [`MediaStore`] backed by [`MediaItemRepository`].
#[derive(Clone)]
pub struct SqlMediaStore {
    repository: MediaItemRepository,
}

impl SqlMediaStore {
    pub fn new(repository: MediaItemRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl MediaStore for SqlMediaStore {
    async fn find_active(&self, media_id: Uuid) -> Result<Option<MediaItem>, AppError> {
        self.repository.find_active(media_id).await
    }

    async fn find_active_by_job_id(&self, job_id: &str) -> Result<Option<MediaItem>, AppError> {
        self.repository.find_active_by_job_id(job_id).await
    }

    async fn mark_transcoding(
        &self,
        media_id: Uuid,
        job_id: &str,
        priority: Option<i32>,
    ) -> Result<MediaItem, AppError> {
        self.repository
            .mark_transcoding(media_id, job_id, priority)
            .await
    }

    async fn complete_job(
        &self,
        media_id: Uuid,
        job_id: &str,
        outputs: &TranscodeOutputs,
    ) -> Result<bool, AppError> {
        self.repository.complete_job(media_id, job_id, outputs).await
    }

    async fn fail_job(
        &self,
        media_id: Uuid,
        job_id: &str,
        error: &str,
    ) -> Result<bool, AppError> {
        self.repository.fail_job(media_id, job_id, error).await
    }

    async fn reset_for_retry(
        &self,
        media_id: Uuid,
        max_attempts: i32,
    ) -> Result<Option<MediaItem>, AppError> {
        self.repository.reset_for_retry(media_id, max_attempts).await
    }
}
