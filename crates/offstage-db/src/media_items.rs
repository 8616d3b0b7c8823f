use sqlx::PgPool;
use uuid::Uuid;

use offstage_core::models::{MediaItem, MediaKind, TranscodeOutputs};
use offstage_core::AppError;

/// Column list shared by every SELECT/RETURNING on media_items.
const COLUMNS: &str = "id, owner_id, kind, status, job_id, attempts, last_error, priority, \
     input_ref, master_playlist_ref, preview_ref, thumbnail_ref, waveform_ref, \
     waveform_image_ref, mezzanine_ref, duration_seconds, width, height, ready_variants, \
     loudness_integrated, loudness_peak, loudness_range, deleted_at, created_at, updated_at";

/// Repository for media items.
///
/// Soft-deleted rows are excluded from every lookup and mutation; callers
/// never see them. The conditional updates return whether a row matched so
/// the orchestrator can distinguish a stale write from a real one.
#[derive(Clone)]
pub struct MediaItemRepository {
    pool: PgPool,
}

impl MediaItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a media item in the `uploaded` state, ready to transcode.
    /// Called by the upload-completion flow once the original is in blob
    /// storage.
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "insert"))]
    pub async fn create(
        &self,
        owner_id: Uuid,
        kind: MediaKind,
        input_ref: &str,
        priority: i32,
    ) -> Result<MediaItem, AppError> {
        let item = sqlx::query_as::<_, MediaItem>(&format!(
            r#"
            INSERT INTO media_items (id, owner_id, kind, status, input_ref, priority)
            VALUES ($1, $2, $3, 'uploaded', $4, $5)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(kind)
        .bind(input_ref)
        .bind(priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Fetch a non-deleted media item by id.
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "select"))]
    pub async fn find_active(&self, media_id: Uuid) -> Result<Option<MediaItem>, AppError> {
        let item = sqlx::query_as::<_, MediaItem>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM media_items
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        ))
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Fetch a non-deleted media item by the job id of its current or most
    /// recent encode job.
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "select"))]
    pub async fn find_active_by_job_id(
        &self,
        job_id: &str,
    ) -> Result<Option<MediaItem>, AppError> {
        let item = sqlx::query_as::<_, MediaItem>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM media_items
            WHERE job_id = $1 AND deleted_at IS NULL
            "#,
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Move an item into `transcoding` under the given job id. Unconditional:
    /// the orchestrator has already verified the `uploaded` precondition, and
    /// concurrent triggers are serialized by the caller.
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "update"))]
    pub async fn mark_transcoding(
        &self,
        media_id: Uuid,
        job_id: &str,
        priority: Option<i32>,
    ) -> Result<MediaItem, AppError> {
        let item = sqlx::query_as::<_, MediaItem>(&format!(
            r#"
            UPDATE media_items
            SET status = 'transcoding',
                job_id = $2,
                priority = COALESCE($3, priority),
                last_error = NULL,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(media_id)
        .bind(job_id)
        .bind(priority)
        .fetch_optional(&self.pool)
        .await?;

        item.ok_or_else(|| AppError::NotFound(format!("Media item {} not found", media_id)))
    }

    /// Record a completed job: all output fields land in one statement,
    /// guarded on `status = transcoding AND job_id` so a stale or duplicate
    /// callback matches zero rows. Returns whether a row was updated.
    #[tracing::instrument(skip(self, outputs), fields(db.table = "media_items", db.operation = "update"))]
    pub async fn complete_job(
        &self,
        media_id: Uuid,
        job_id: &str,
        outputs: &TranscodeOutputs,
    ) -> Result<bool, AppError> {
        let ready_variants = serde_json::to_value(&outputs.ready_variants)?;

        let result = sqlx::query(
            r#"
            UPDATE media_items
            SET status = 'ready',
                master_playlist_ref = $3,
                preview_ref = $4,
                thumbnail_ref = $5,
                waveform_ref = $6,
                waveform_image_ref = $7,
                mezzanine_ref = $8,
                duration_seconds = $9,
                width = $10,
                height = $11,
                ready_variants = $12,
                loudness_integrated = $13,
                loudness_peak = $14,
                loudness_range = $15,
                last_error = NULL,
                updated_at = NOW()
            WHERE id = $1
              AND job_id = $2
              AND status = 'transcoding'
              AND deleted_at IS NULL
            "#,
        )
        .bind(media_id)
        .bind(job_id)
        .bind(&outputs.master_playlist_ref)
        .bind(&outputs.preview_ref)
        .bind(&outputs.thumbnail_ref)
        .bind(&outputs.waveform_ref)
        .bind(&outputs.waveform_image_ref)
        .bind(&outputs.mezzanine_ref)
        .bind(outputs.duration_seconds)
        .bind(outputs.width)
        .bind(outputs.height)
        .bind(ready_variants)
        .bind(outputs.loudness_integrated)
        .bind(outputs.loudness_peak)
        .bind(outputs.loudness_range)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record a failed job, same compare-and-set guard as `complete_job`.
    /// Returns whether a row was updated.
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "update"))]
    pub async fn fail_job(
        &self,
        media_id: Uuid,
        job_id: &str,
        error: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE media_items
            SET status = 'failed',
                last_error = $3,
                updated_at = NOW()
            WHERE id = $1
              AND job_id = $2
              AND status = 'transcoding'
              AND deleted_at IS NULL
            "#,
        )
        .bind(media_id)
        .bind(job_id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Move a failed item back to `uploaded` for another attempt. The
    /// attempts cap is enforced here, in the WHERE clause, so two concurrent
    /// retries cannot both get through. Returns the updated row, or `None`
    /// when the precondition did not hold.
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "update"))]
    pub async fn reset_for_retry(
        &self,
        media_id: Uuid,
        max_attempts: i32,
    ) -> Result<Option<MediaItem>, AppError> {
        let item = sqlx::query_as::<_, MediaItem>(&format!(
            r#"
            UPDATE media_items
            SET status = 'uploaded',
                attempts = attempts + 1,
                job_id = NULL,
                last_error = NULL,
                updated_at = NOW()
            WHERE id = $1
              AND status = 'failed'
              AND attempts < $2
              AND deleted_at IS NULL
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(media_id)
        .bind(max_attempts)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Soft-delete an item. The row stays for audit continuity but becomes
    /// invisible to every orchestrator operation.
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "update"))]
    pub async fn soft_delete(&self, media_id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE media_items
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(media_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
