//! TUI (Terminal User Interface) mode for voxdesk
//!
//! Full-screen console with one page per resource, mouse support, modals and
//! toasts. Network requests run on the tokio runtime and report back through
//! the same channel as terminal input.

mod app;
mod context;
mod event;
mod ui;

pub mod hit_test;
pub mod pages;
pub mod theme;
pub mod widgets;

pub use app::TuiApp;

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::session::Session;

/// Run the TUI application
pub async fn run(config: Config, session: Arc<Session>) -> Result<()> {
    let mut app = TuiApp::new(config, session)?;
    app.run().await
}
