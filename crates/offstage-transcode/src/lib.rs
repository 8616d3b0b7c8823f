//! Transcoding orchestration.
//!
//! The orchestrator is stateless between calls; every piece of coordination
//! state lives in the media item row. Races with the external worker
//! (redelivered callbacks, callbacks for superseded jobs) are resolved by
//! compare-and-set writes, never by in-process locking.

mod orchestrator;
mod store;
pub mod testing;

pub use orchestrator::{CallbackOutcome, TranscodeConfig, TranscodeOrchestrator};
pub use store::{MediaStore, SqlMediaStore};
