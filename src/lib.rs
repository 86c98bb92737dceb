//! voxdesk library
//!
//! Typed client, domain models, validation and the onboarding state machine
//! for a voice-agent platform, plus the terminal console built on them.

pub mod api;
pub mod cli;
pub mod config;
pub mod controls;
pub mod models;
pub mod onboarding;
pub mod runner;
pub mod session;
pub mod validation;

#[cfg(feature = "tui")]
pub mod tui;
