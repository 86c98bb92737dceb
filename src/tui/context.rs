//! Per-event context handed to pages

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::event::{ApiEvent, AppEvent, RequestKind};
use super::pages::PageId;
use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::controls::ToastQueue;
use crate::session::Session;

/// What a page may touch while handling input
pub struct Ctx<'a> {
    pub client: &'a ApiClient,
    pub tx: &'a UnboundedSender<AppEvent>,
    pub toasts: &'a mut ToastQueue,
    pub config: &'a Config,
    pub session: &'a Arc<Session>,
    /// Page handling the current event; failures are reported back to it.
    pub page: PageId,
    /// Set by a page to switch pages after the current event.
    pub navigate: &'a mut Option<PageId>,
}

impl Ctx<'_> {
    /// Run a request in the background and report back through the event
    /// channel. Failures were already toasted by the client's error hook, so
    /// only an [`ApiEvent::Failed`] marker is sent.
    pub fn spawn<T, F, M>(&self, request: F, on_ok: M, kind: RequestKind)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        M: FnOnce(T) -> ApiEvent + Send + 'static,
    {
        let tx = self.tx.clone();
        let page = self.page;
        tokio::spawn(async move {
            let event = match request.await {
                Ok(value) => on_ok(value),
                Err(_) => ApiEvent::Failed { page, kind },
            };
            let _ = tx.send(AppEvent::Api(event));
        });
    }
}
