//! Modal dialog state.
//!
//! A modal exists only while open; closing drops its body. Backdrop hits
//! close it unless the config forbids that, and hits inside the body are
//! swallowed so they never count as backdrop hits.

use super::spinner::Spinner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalConfig {
    pub title: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub confirm_icon: Option<String>,
    pub cancel_icon: Option<String>,
    pub close_on_backdrop: bool,
}

impl ModalConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
            confirm_icon: None,
            cancel_icon: None,
            close_on_backdrop: true,
        }
    }

    /// Preset for destructive confirmations.
    pub fn confirm_delete(what: &str) -> Self {
        Self::new(format!("Delete {}?", what)).confirm("Delete", Some("🗑"))
    }

    pub fn confirm(mut self, label: impl Into<String>, icon: Option<&str>) -> Self {
        self.confirm_label = label.into();
        self.confirm_icon = icon.map(str::to_string);
        self
    }

    pub fn cancel(mut self, label: impl Into<String>, icon: Option<&str>) -> Self {
        self.cancel_label = label.into();
        self.cancel_icon = icon.map(str::to_string);
        self
    }

    pub fn sticky(mut self) -> Self {
        self.close_on_backdrop = false;
        self
    }
}

/// Where a pointer landed relative to an open modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalHit {
    Backdrop,
    Body,
    Confirm,
    Cancel,
}

/// What the owner should do in response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    None,
    Close,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone)]
struct OpenModal<T> {
    config: ModalConfig,
    body: T,
    loading: bool,
    spinner: Spinner,
}

/// A modal carrying a caller-defined body `T` (e.g. the item to delete).
#[derive(Debug, Clone)]
pub struct ModalState<T> {
    inner: Option<OpenModal<T>>,
}

impl<T> Default for ModalState<T> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<T> ModalState<T> {
    pub fn open(&mut self, config: ModalConfig, body: T) {
        self.inner = Some(OpenModal {
            config,
            body,
            loading: false,
            spinner: Spinner::new(),
        });
    }

    /// Close and hand back the body.
    pub fn close(&mut self) -> Option<T> {
        self.inner.take().map(|m| m.body)
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    pub fn config(&self) -> Option<&ModalConfig> {
        self.inner.as_ref().map(|m| &m.config)
    }

    pub fn body(&self) -> Option<&T> {
        self.inner.as_ref().map(|m| &m.body)
    }

    pub fn body_mut(&mut self) -> Option<&mut T> {
        self.inner.as_mut().map(|m| &mut m.body)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.as_ref().is_some_and(|m| m.loading)
    }

    pub fn set_loading(&mut self, loading: bool) {
        if let Some(m) = self.inner.as_mut() {
            m.loading = loading;
            m.spinner = Spinner::new();
        }
    }

    pub fn confirm_enabled(&self) -> bool {
        self.is_open() && !self.is_loading()
    }

    /// Confirm button text: icon and label, or a spinner while loading.
    pub fn confirm_text(&self) -> String {
        let Some(m) = self.inner.as_ref() else {
            return String::new();
        };
        if m.loading {
            return m.spinner.frame().to_string();
        }
        with_icon(m.config.confirm_icon.as_deref(), &m.config.confirm_label)
    }

    pub fn cancel_text(&self) -> String {
        match self.inner.as_ref() {
            Some(m) => with_icon(m.config.cancel_icon.as_deref(), &m.config.cancel_label),
            None => String::new(),
        }
    }

    pub fn hit(&self, hit: ModalHit) -> ModalAction {
        let Some(m) = self.inner.as_ref() else {
            return ModalAction::None;
        };
        match hit {
            ModalHit::Body => ModalAction::None,
            ModalHit::Backdrop if m.config.close_on_backdrop => ModalAction::Close,
            ModalHit::Backdrop => ModalAction::None,
            ModalHit::Confirm if m.loading => ModalAction::None,
            ModalHit::Confirm => ModalAction::Confirm,
            ModalHit::Cancel => ModalAction::Cancel,
        }
    }
}

fn with_icon(icon: Option<&str>, label: &str) -> String {
    match icon {
        Some(icon) => format!("{} {}", icon, label),
        None => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::spinner::FRAMES;

    #[test]
    fn test_closed_modal_does_nothing() {
        let modal: ModalState<String> = ModalState::default();
        assert!(!modal.is_open());
        assert_eq!(modal.hit(ModalHit::Confirm), ModalAction::None);
        assert_eq!(modal.confirm_text(), "");
    }

    #[test]
    fn test_body_click_never_closes() {
        let mut modal = ModalState::default();
        modal.open(ModalConfig::new("Edit"), 1u32);
        assert_eq!(modal.hit(ModalHit::Body), ModalAction::None);
        assert_eq!(modal.hit(ModalHit::Backdrop), ModalAction::Close);
    }

    #[test]
    fn test_sticky_modal_ignores_backdrop() {
        let mut modal = ModalState::default();
        modal.open(ModalConfig::new("Import").sticky(), ());
        assert_eq!(modal.hit(ModalHit::Backdrop), ModalAction::None);
        assert_eq!(modal.hit(ModalHit::Cancel), ModalAction::Cancel);
    }

    #[test]
    fn test_loading_disables_confirm_and_shows_spinner() {
        let mut modal = ModalState::default();
        modal.open(ModalConfig::confirm_delete("agent"), "a1".to_string());
        assert_eq!(modal.confirm_text(), "🗑 Delete");
        assert_eq!(modal.hit(ModalHit::Confirm), ModalAction::Confirm);

        modal.set_loading(true);
        assert!(!modal.confirm_enabled());
        assert_eq!(modal.hit(ModalHit::Confirm), ModalAction::None);
        assert!(FRAMES.contains(&modal.confirm_text().as_str()));

        assert_eq!(modal.close().as_deref(), Some("a1"));
        assert!(!modal.is_open());
    }
}
