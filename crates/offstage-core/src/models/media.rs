use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Hard cap on transcode attempts per media item. The 4th retry is rejected.
pub const MAX_TRANSCODE_ATTEMPTS: i32 = 3;

/// Default encoding job priority. Lower values are more urgent.
pub const DEFAULT_JOB_PRIORITY: i32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, sqlx::Type)]
#[sqlx(type_name = "media_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, sqlx::Type)]
#[sqlx(type_name = "media_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    Uploading,
    Uploaded,
    Transcoding,
    Ready,
    Failed,
}

impl Display for MediaStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaStatus::Uploading => write!(f, "uploading"),
            MediaStatus::Uploaded => write!(f, "uploaded"),
            MediaStatus::Transcoding => write!(f, "transcoding"),
            MediaStatus::Ready => write!(f, "ready"),
            MediaStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One uploaded video or audio asset and its transcoding state.
///
/// Mutated exclusively through `MediaItemRepository`; rows with `deleted_at`
/// set are invisible to every orchestrator operation. `job_id` is set when a
/// job is submitted and kept on the terminal states so redelivered callbacks
/// can still resolve the row; a retry clears it on failed → uploaded.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MediaItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: MediaKind,
    pub status: MediaStatus,
    pub job_id: Option<String>,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub priority: i32,
    pub input_ref: Option<String>,
    pub master_playlist_ref: Option<String>,
    pub preview_ref: Option<String>,
    pub thumbnail_ref: Option<String>,
    pub waveform_ref: Option<String>,
    pub waveform_image_ref: Option<String>,
    pub mezzanine_ref: Option<String>,
    pub duration_seconds: Option<f64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub ready_variants: Option<JsonValue>,
    pub loudness_integrated: Option<f64>,
    pub loudness_peak: Option<f64>,
    pub loudness_range: Option<f64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaItem {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the success outputs are populated. They are written as a unit,
    /// so the master playlist ref stands in for the whole set.
    pub fn has_outputs(&self) -> bool {
        self.master_playlist_ref.is_some()
            && self.duration_seconds.is_some()
            && self.ready_variants.is_some()
    }
}

/// Output references reported by the encoding worker on success.
///
/// Written to the media item as a single atomic update. Video-only and
/// audio-only fields stay `None` for the other kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscodeOutputs {
    pub master_playlist_ref: String,
    pub preview_ref: Option<String>,
    pub thumbnail_ref: Option<String>,
    pub waveform_ref: Option<String>,
    pub waveform_image_ref: Option<String>,
    pub mezzanine_ref: Option<String>,
    pub duration_seconds: f64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub ready_variants: Vec<String>,
    pub loudness_integrated: Option<f64>,
    pub loudness_peak: Option<f64>,
    pub loudness_range: Option<f64>,
}

/// Read-only projection of a media item's transcoding state.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranscodeStatusResponse {
    pub id: Uuid,
    pub status: MediaStatus,
    pub attempts: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<String>>)]
    pub ready_variants: Option<JsonValue>,
}

impl From<MediaItem> for TranscodeStatusResponse {
    fn from(item: MediaItem) -> Self {
        TranscodeStatusResponse {
            id: item.id,
            status: item.status,
            attempts: item.attempts,
            last_error: item.last_error,
            job_id: item.job_id,
            priority: item.priority,
            ready_variants: item.ready_variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded_item() -> MediaItem {
        MediaItem {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            kind: MediaKind::Video,
            status: MediaStatus::Uploaded,
            job_id: None,
            attempts: 0,
            last_error: None,
            priority: DEFAULT_JOB_PRIORITY,
            input_ref: Some("owner/originals/abc/input.mp4".to_string()),
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

    #[test]
    fn test_status_display_matches_db_labels() {
        assert_eq!(MediaStatus::Uploading.to_string(), "uploading");
        assert_eq!(MediaStatus::Uploaded.to_string(), "uploaded");
        assert_eq!(MediaStatus::Transcoding.to_string(), "transcoding");
        assert_eq!(MediaStatus::Ready.to_string(), "ready");
        assert_eq!(MediaStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_kind_serde_roundtrip() {
        let json = serde_json::to_string(&MediaKind::Audio).expect("serialize");
        assert_eq!(json, "\"audio\"");
        let kind: MediaKind = serde_json::from_str("\"video\"").expect("deserialize");
        assert_eq!(kind, MediaKind::Video);
    }

    #[test]
    fn test_has_outputs_requires_the_full_unit() {
        let mut item = uploaded_item();
        assert!(!item.has_outputs());

        item.master_playlist_ref = Some("owner/hls/id/master.m3u8".to_string());
        assert!(!item.has_outputs());

        item.duration_seconds = Some(120.5);
        item.ready_variants = Some(serde_json::json!(["1080p", "720p"]));
        assert!(item.has_outputs());
    }

    #[test]
    fn test_status_response_projection() {
        let mut item = uploaded_item();
        item.status = MediaStatus::Failed;
        item.attempts = 2;
        item.last_error = Some("encode error".to_string());
        item.job_id = Some("job-17".to_string());
        let id = item.id;

        let response = TranscodeStatusResponse::from(item);
        assert_eq!(response.id, id);
        assert_eq!(response.status, MediaStatus::Failed);
        assert_eq!(response.attempts, 2);
        assert_eq!(response.last_error.as_deref(), Some("encode error"));
        assert_eq!(response.job_id.as_deref(), Some("job-17"));
    }
}
