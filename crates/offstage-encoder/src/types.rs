//! Wire types for the encoding worker protocol. Field names are camelCase on
//! the wire to match the worker's JSON contract.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use offstage_core::models::{MediaKind, TranscodeOutputs};

/// Job submission request handed to the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncodeJobRequest {
    pub media_id: Uuid,
    pub media_type: MediaKind,
    pub owner_id: Uuid,
    /// Blob key of the uploaded original.
    pub input_ref: String,
    /// URL the worker posts its signed completion callback to.
    pub callback_url: String,
    /// Lower = more urgent.
    pub priority: i32,
}

/// Submission acknowledgement. The worker queues the job and returns
/// immediately; `status` is always "queued" on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeJobAck {
    pub job_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EncodeCallbackStatus {
    Completed,
    Failed,
}

/// Completion callback posted by the worker. `media_id` is present on both
/// success and failure so redelivered callbacks can be resolved even after
/// the job id no longer matches a live attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeCallback {
    pub job_id: String,
    pub status: EncodeCallbackStatus,
    #[serde(default)]
    pub media_id: Option<Uuid>,
    #[serde(default)]
    pub output: Option<EncodeOutput>,
    #[serde(default)]
    pub error: Option<String>,
}

impl EncodeCallback {
    /// Media id hint carried by the callback, from the top level or the
    /// output block.
    pub fn media_id_hint(&self) -> Option<Uuid> {
        self.media_id
            .or_else(|| self.output.as_ref().map(|o| o.media_id))
    }
}

/// Output references reported on a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOutput {
    pub media_id: Uuid,
    pub master_playlist_ref: String,
    #[serde(default)]
    pub preview_ref: Option<String>,
    #[serde(default)]
    pub thumbnail_ref: Option<String>,
    #[serde(default)]
    pub waveform_ref: Option<String>,
    #[serde(default)]
    pub waveform_image_ref: Option<String>,
    #[serde(default)]
    pub mezzanine_ref: Option<String>,
    pub duration_seconds: f64,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    pub ready_variants: Vec<String>,
    #[serde(default)]
    pub loudness_integrated: Option<f64>,
    #[serde(default)]
    pub loudness_peak: Option<f64>,
    #[serde(default)]
    pub loudness_range: Option<f64>,
}

impl From<EncodeOutput> for TranscodeOutputs {
    fn from(output: EncodeOutput) -> Self {
        TranscodeOutputs {
            master_playlist_ref: output.master_playlist_ref,
            preview_ref: output.preview_ref,
            thumbnail_ref: output.thumbnail_ref,
            waveform_ref: output.waveform_ref,
            waveform_image_ref: output.waveform_image_ref,
            mezzanine_ref: output.mezzanine_ref,
            duration_seconds: output.duration_seconds,
            width: output.width,
            height: output.height,
            ready_variants: output.ready_variants,
            loudness_integrated: output.loudness_integrated,
            loudness_peak: output.loudness_peak,
            loudness_range: output.loudness_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = EncodeJobRequest {
            media_id: Uuid::new_v4(),
            media_type: MediaKind::Video,
            owner_id: Uuid::new_v4(),
            input_ref: "owner/originals/id/input.mp4".to_string(),
            callback_url: "https://api.example.com/api/v0/webhooks/transcoding".to_string(),
            priority: 10,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("mediaId").is_some());
        assert_eq!(
            json.get("mediaType").and_then(|v| v.as_str()),
            Some("video")
        );
        assert!(json.get("inputRef").is_some());
        assert!(json.get("callbackUrl").is_some());
        assert_eq!(json.get("priority").and_then(|v| v.as_i64()), Some(10));
    }

    #[test]
    fn test_completed_callback_deserializes() {
        let media_id = Uuid::new_v4();
        let json = serde_json::json!({
            "jobId": "rp-42",
            "status": "completed",
            "mediaId": media_id,
            "output": {
                "mediaId": media_id,
                "masterPlaylistRef": "owner/hls/id/master.m3u8",
                "previewRef": "owner/hls/id/preview/preview.m3u8",
                "thumbnailRef": "owner/thumbnails/id/auto-generated.jpg",
                "mezzanineRef": "owner/mezzanine/id/mezzanine.mp4",
                "durationSeconds": 93.4,
                "width": 1920,
                "height": 1080,
                "readyVariants": ["1080p", "720p", "480p", "360p"]
            }
        });

        let callback: EncodeCallback = serde_json::from_value(json).expect("deserialize");
        assert_eq!(callback.job_id, "rp-42");
        assert_eq!(callback.status, EncodeCallbackStatus::Completed);
        assert_eq!(callback.media_id_hint(), Some(media_id));
        let output = callback.output.expect("output");
        assert_eq!(output.duration_seconds, 93.4);
        assert_eq!(output.ready_variants.len(), 4);
        assert!(output.waveform_ref.is_none());
    }

    #[test]
    fn test_failed_callback_deserializes_without_output() {
        let media_id = Uuid::new_v4();
        let json = serde_json::json!({
            "jobId": "rp-43",
            "status": "failed",
            "mediaId": media_id,
            "error": "ffmpeg exited with code 1"
        });

        let callback: EncodeCallback = serde_json::from_value(json).expect("deserialize");
        assert_eq!(callback.status, EncodeCallbackStatus::Failed);
        assert!(callback.output.is_none());
        assert_eq!(callback.media_id_hint(), Some(media_id));
        assert_eq!(callback.error.as_deref(), Some("ffmpeg exited with code 1"));
    }

    #[test]
    fn test_audio_output_maps_to_transcode_outputs() {
        let output = EncodeOutput {
            media_id: Uuid::new_v4(),
            master_playlist_ref: "owner/hls/id/master.m3u8".to_string(),
            preview_ref: None,
            thumbnail_ref: None,
            waveform_ref: Some("owner/waveforms/id/waveform.json".to_string()),
            waveform_image_ref: Some("owner/waveforms/id/waveform.png".to_string()),
            mezzanine_ref: None,
            duration_seconds: 212.0,
            width: None,
            height: None,
            ready_variants: vec!["128k".to_string(), "64k".to_string()],
            loudness_integrated: Some(-16.1),
            loudness_peak: Some(-1.4),
            loudness_range: Some(9.8),
        };

        let outputs = TranscodeOutputs::from(output);
        assert_eq!(outputs.master_playlist_ref, "owner/hls/id/master.m3u8");
        assert!(outputs.preview_ref.is_none());
        assert_eq!(outputs.loudness_integrated, Some(-16.1));
        assert_eq!(outputs.ready_variants, vec!["128k", "64k"]);
    }
}
