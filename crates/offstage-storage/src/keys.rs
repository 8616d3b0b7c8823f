//! Shared key derivation for transcode outputs.
//!
//! Key layout: everything lives under the owner's prefix, e.g.
//! `{owner_id}/hls/{media_id}/master.m3u8`. The encoding worker and this
//! backend must agree on this layout; derive keys here, never inline.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use offstage_core::models::MediaKind;

/// Output keys for one media item. Video omits audio-only fields and
/// vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OutputPaths {
    pub master_playlist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waveform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waveform_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mezzanine: Option<String>,
}

/// Derive the canonical output keys for a media item. Deterministic, no I/O.
///
/// Both the orchestrator (to know where outputs should land) and playback URL
/// construction use this; all backends must use this layout for consistency.
pub fn derive_output_paths(owner_id: Uuid, media_id: Uuid, kind: MediaKind) -> OutputPaths {
    let hls_prefix = format!("{}/hls/{}", owner_id, media_id);

    match kind {
        MediaKind::Video => OutputPaths {
            master_playlist: format!("{}/master.m3u8", hls_prefix),
            preview: Some(format!("{}/preview/preview.m3u8", hls_prefix)),
            thumbnail: Some(format!(
                "{}/thumbnails/{}/auto-generated.jpg",
                owner_id, media_id
            )),
            waveform: None,
            waveform_image: None,
            mezzanine: Some(format!("{}/mezzanine/{}/mezzanine.mp4", owner_id, media_id)),
        },
        MediaKind::Audio => OutputPaths {
            master_playlist: format!("{}/master.m3u8", hls_prefix),
            preview: None,
            thumbnail: None,
            waveform: Some(format!("{}/waveforms/{}/waveform.json", owner_id, media_id)),
            waveform_image: Some(format!("{}/waveforms/{}/waveform.png", owner_id, media_id)),
            mezzanine: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_paths() {
        let owner = Uuid::parse_str("6f2c0f3e-26f5-4b8e-9d36-9a34ee1f21aa").unwrap();
        let media = Uuid::parse_str("e5b9350a-9f6f-4d2e-8e3c-f57a4bd52f01").unwrap();

        let paths = derive_output_paths(owner, media, MediaKind::Video);
        assert_eq!(
            paths.master_playlist,
            format!("{}/hls/{}/master.m3u8", owner, media)
        );
        assert_eq!(
            paths.preview.as_deref(),
            Some(format!("{}/hls/{}/preview/preview.m3u8", owner, media).as_str())
        );
        assert_eq!(
            paths.thumbnail.as_deref(),
            Some(format!("{}/thumbnails/{}/auto-generated.jpg", owner, media).as_str())
        );
        assert_eq!(
            paths.mezzanine.as_deref(),
            Some(format!("{}/mezzanine/{}/mezzanine.mp4", owner, media).as_str())
        );
        assert!(paths.waveform.is_none());
        assert!(paths.waveform_image.is_none());
    }

    #[test]
    fn test_audio_paths_omit_video_only_fields() {
        let owner = Uuid::new_v4();
        let media = Uuid::new_v4();

        let paths = derive_output_paths(owner, media, MediaKind::Audio);
        assert_eq!(
            paths.master_playlist,
            format!("{}/hls/{}/master.m3u8", owner, media)
        );
        assert!(paths.preview.is_none());
        assert!(paths.thumbnail.is_none());
        assert!(paths.mezzanine.is_none());
        assert_eq!(
            paths.waveform.as_deref(),
            Some(format!("{}/waveforms/{}/waveform.json", owner, media).as_str())
        );
        assert_eq!(
            paths.waveform_image.as_deref(),
            Some(format!("{}/waveforms/{}/waveform.png", owner, media).as_str())
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let owner = Uuid::new_v4();
        let media = Uuid::new_v4();
        assert_eq!(
            derive_output_paths(owner, media, MediaKind::Video),
            derive_output_paths(owner, media, MediaKind::Video)
        );
    }

    #[test]
    fn test_serialized_paths_skip_absent_fields() {
        let paths = derive_output_paths(Uuid::new_v4(), Uuid::new_v4(), MediaKind::Audio);
        let json = serde_json::to_value(&paths).expect("serialize");
        assert!(json.get("preview").is_none());
        assert!(json.get("waveform").is_some());
    }
}
