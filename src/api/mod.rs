//! HTTP access to the voice-agent platform.
//!
//! [`ApiClient`] is the single configured client; each resource module adds
//! typed methods for one family of endpoints.

mod agents;
mod call_logs;
mod client;
mod error;
mod knowledge;
mod onboarding;
mod phones;
mod tools;
mod user;
mod voices;

pub use client::{ApiClient, ErrorHook};
pub use error::{format_error_message, ApiError};
