mod media;

pub use media::{
    MediaItem, MediaKind, MediaStatus, TranscodeOutputs, TranscodeStatusResponse,
    DEFAULT_JOB_PRIORITY, MAX_TRANSCODE_ATTEMPTS,
};
