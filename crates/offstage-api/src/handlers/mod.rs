pub mod health;
pub mod transcode;
pub mod webhook;
