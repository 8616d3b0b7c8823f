//! Canonical storage key derivation for Offstage media outputs.

pub mod keys;

pub use keys::{derive_output_paths, OutputPaths};
