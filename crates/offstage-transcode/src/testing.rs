//! Test doubles for the orchestrator: an in-memory store with the same
//! compare-and-set semantics as the SQL repository, and a submitter that
//! records calls instead of reaching the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use offstage_core::models::{
    MediaItem, MediaKind, MediaStatus, TranscodeOutputs, DEFAULT_JOB_PRIORITY,
};
use offstage_core::AppError;
use offstage_encoder::{EncodeError, EncodeJobRequest, JobSubmitter};

use crate::store::MediaStore;

/// Build a media item in the given state, with an input ref present.
pub fn media_item(owner_id: Uuid, kind: MediaKind, status: MediaStatus) -> MediaItem {
    let id = Uuid::new_v4();
    MediaItem {
        id,
        owner_id,
        kind,
        status,
        job_id: None,
        attempts: 0,
        last_error: None,
        priority: DEFAULT_JOB_PRIORITY,
        input_ref: Some(format!("{}/originals/{}/input", owner_id, id)),
        master_playlist_ref: None,
        preview_ref: None,
        thumbnail_ref: None,
        waveform_ref: None,
        waveform_image_ref: None,
        mezzanine_ref: None,
        duration_seconds: None,
        width: None,
        height: None,
        ready_variants: None,
        loudness_integrated: None,
        loudness_peak: None,
        loudness_range: None,
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// In-memory [`MediaStore`]. Mutations mirror the SQL repository exactly,
/// including the WHERE-clause preconditions of the conditional updates.
#[derive(Default)]
pub struct InMemoryMediaStore {
    items: Mutex<HashMap<Uuid, MediaItem>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, item: MediaItem) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    /// Current row, including soft-deleted ones (for assertions).
    pub fn get(&self, media_id: Uuid) -> Option<MediaItem> {
        self.items.lock().unwrap().get(&media_id).cloned()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn find_active(&self, media_id: Uuid) -> Result<Option<MediaItem>, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&media_id)
            .filter(|item| !item.is_deleted())
            .cloned())
    }

    async fn find_active_by_job_id(&self, job_id: &str) -> Result<Option<MediaItem>, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .values()
            .find(|item| item.job_id.as_deref() == Some(job_id) && !item.is_deleted())
            .cloned())
    }

    async fn mark_transcoding(
        &self,
        media_id: Uuid,
        job_id: &str,
        priority: Option<i32>,
    ) -> Result<MediaItem, AppError> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .get_mut(&media_id)
            .filter(|item| !item.is_deleted())
            .ok_or_else(|| AppError::NotFound(format!("Media item {} not found", media_id)))?;
        item.status = MediaStatus::Transcoding;
        item.job_id = Some(job_id.to_string());
        if let Some(priority) = priority {
            item.priority = priority;
        }
        item.last_error = None;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn complete_job(
        &self,
        media_id: Uuid,
        job_id: &str,
        outputs: &TranscodeOutputs,
    ) -> Result<bool, AppError> {
        let mut items = self.items.lock().unwrap();
        let Some(item) = items.get_mut(&media_id).filter(|item| {
            !item.is_deleted()
                && item.status == MediaStatus::Transcoding
                && item.job_id.as_deref() == Some(job_id)
        }) else {
            return Ok(false);
        };
        item.status = MediaStatus::Ready;
        item.master_playlist_ref = Some(outputs.master_playlist_ref.clone());
        item.preview_ref = outputs.preview_ref.clone();
        item.thumbnail_ref = outputs.thumbnail_ref.clone();
        item.waveform_ref = outputs.waveform_ref.clone();
        item.waveform_image_ref = outputs.waveform_image_ref.clone();
        item.mezzanine_ref = outputs.mezzanine_ref.clone();
        item.duration_seconds = Some(outputs.duration_seconds);
        item.width = outputs.width;
        item.height = outputs.height;
        item.ready_variants = Some(serde_json::to_value(&outputs.ready_variants)?);
        item.loudness_integrated = outputs.loudness_integrated;
        item.loudness_peak = outputs.loudness_peak;
        item.loudness_range = outputs.loudness_range;
        item.last_error = None;
        item.updated_at = Utc::now();
        Ok(true)
    }

    async fn fail_job(
        &self,
        media_id: Uuid,
        job_id: &str,
        error: &str,
    ) -> Result<bool, AppError> {
        let mut items = self.items.lock().unwrap();
        let Some(item) = items.get_mut(&media_id).filter(|item| {
            !item.is_deleted()
                && item.status == MediaStatus::Transcoding
                && item.job_id.as_deref() == Some(job_id)
        }) else {
            return Ok(false);
        };
        item.status = MediaStatus::Failed;
        item.last_error = Some(error.to_string());
        item.updated_at = Utc::now();
        Ok(true)
    }

    async fn reset_for_retry(
        &self,
        media_id: Uuid,
        max_attempts: i32,
    ) -> Result<Option<MediaItem>, AppError> {
        let mut items = self.items.lock().unwrap();
        let Some(item) = items.get_mut(&media_id).filter(|item| {
            !item.is_deleted()
                && item.status == MediaStatus::Failed
                && item.attempts < max_attempts
        }) else {
            return Ok(None);
        };
        item.status = MediaStatus::Uploaded;
        item.attempts += 1;
        item.job_id = None;
        item.last_error = None;
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }
}

/// [`JobSubmitter`] that records every request and returns generated job ids,
/// or a configured submission failure.
#[derive(Default)]
pub struct RecordingSubmitter {
    calls: Mutex<Vec<EncodeJobRequest>>,
    counter: AtomicUsize,
    fail_with: Mutex<Option<(Option<u16>, String)>>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next submissions fail with the given status and body.
    pub fn fail_with(&self, status: Option<u16>, body: &str) {
        *self.fail_with.lock().unwrap() = Some((status, body.to_string()));
    }

    /// Back to successful submissions.
    pub fn succeed(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<EncodeJobRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Job id the Nth (zero-based) successful submission returned.
    pub fn job_id(n: usize) -> String {
        format!("job-{}", n)
    }
}

#[async_trait]
impl JobSubmitter for RecordingSubmitter {
    async fn submit(&self, request: &EncodeJobRequest) -> Result<String, EncodeError> {
        if let Some((status, body)) = self.fail_with.lock().unwrap().clone() {
            return Err(EncodeError::Submission { status, body });
        }
        self.calls.lock().unwrap().push(request.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(Self::job_id(n))
    }
}
