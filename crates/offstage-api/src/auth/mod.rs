//! Request authentication: service bearer key, caller identity, and webhook
//! signature verification.

pub mod owner;
pub mod service_key;
pub mod signature;

pub use owner::OwnerContext;
