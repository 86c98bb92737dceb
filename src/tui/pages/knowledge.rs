//! Knowledge base: documents agents can answer from

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::TableState,
    Frame,
};

use super::{upsert, Page, PageId};
use crate::controls::{ModalAction, ModalConfig, ModalState, Spinner};
use crate::models::KnowledgeFile;
use crate::tui::context::Ctx;
use crate::tui::event::{ApiEvent, RequestKind};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;
use crate::tui::widgets::{
    classify, modal_key, render_message, render_modal, table, FormEvent, FormField, FormState,
    ResourceTable,
};

enum KnowledgeModal {
    Upload(FormState),
    Delete(KnowledgeFile),
}

pub struct KnowledgePage {
    files: Vec<KnowledgeFile>,
    table: TableState,
    loading: Option<Spinner>,
    loaded: bool,
    modal: ModalState<KnowledgeModal>,
}

fn upload_form() -> FormState {
    FormState::new(
        "knowledge_upload",
        vec![FormField::text("path", "Local file path", "")],
    )
}

/// Resolve a typed path, expanding a leading `~`.
fn resolve_path(input: &str) -> PathBuf {
    let input = input.trim();
    match input.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(input)),
        None => PathBuf::from(input),
    }
}

impl KnowledgePage {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            table: TableState::default(),
            loading: None,
            loaded: false,
            modal: ModalState::default(),
        }
    }

    fn confirm(&mut self, ctx: &mut Ctx) {
        let client = ctx.client.clone();
        match self.modal.body() {
            Some(KnowledgeModal::Upload(form)) => {
                let Some(input) = form.opt_text("path") else {
                    ctx.toasts.warning("File path is required");
                    return;
                };
                let path = resolve_path(&input);
                if !path.is_file() {
                    ctx.toasts.warning(format!("{} is not a file", path.display()));
                    return;
                }
                ctx.spawn(
                    async move { client.upload_knowledge_file(&path).await },
                    ApiEvent::KnowledgeUploaded,
                    RequestKind::Upload,
                );
            }
            Some(KnowledgeModal::Delete(file)) => {
                let id = file.id.clone();
                ctx.spawn(
                    async move { client.delete_knowledge_file(&id).await.map(|_| id) },
                    ApiEvent::KnowledgeDeleted,
                    RequestKind::Delete,
                );
            }
            None => return,
        }
        self.modal.set_loading(true);
    }

    fn apply_modal(&mut self, action: ModalAction, ctx: &mut Ctx) {
        match action {
            ModalAction::Confirm => self.confirm(ctx),
            ModalAction::Close | ModalAction::Cancel => {
                self.modal.close();
            }
            ModalAction::None => {}
        }
    }
}

impl Default for KnowledgePage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for KnowledgePage {
    fn enter(&mut self, ctx: &mut Ctx) {
        if !self.loaded {
            self.reload(ctx);
        }
    }

    fn reload(&mut self, ctx: &mut Ctx) {
        self.loaded = true;
        self.loading = Some(Spinner::new());
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_knowledge_files().await },
            ApiEvent::KnowledgeFiles,
            RequestKind::Load,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> bool {
        if self.modal.is_open() {
            if let Some(KnowledgeModal::Upload(form)) = self.modal.body_mut() {
                if form.handle_key(key) != FormEvent::Ignored {
                    return true;
                }
            }
            // single field: Enter uploads
            let action = modal_key(&self.modal, key, true);
            self.apply_modal(action, ctx);
            return true;
        }

        if table::navigate(&mut self.table, self.files.len(), key.code) {
            return true;
        }
        match key.code {
            KeyCode::Char('u') | KeyCode::Char('n') => {
                self.modal.open(
                    ModalConfig::new("Upload document")
                        .confirm("Upload", Some("⇪"))
                        .sticky(),
                    KnowledgeModal::Upload(upload_form()),
                );
                true
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let selected = self.table.selected().and_then(|i| self.files.get(i)).cloned();
                if let Some(file) = selected {
                    self.modal.open(
                        ModalConfig::confirm_delete(&file.name),
                        KnowledgeModal::Delete(file),
                    );
                }
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, target: Option<&ClickTarget>, ctx: &mut Ctx) {
        if self.modal.is_open() {
            let hit = classify(target);
            if let Some(KnowledgeModal::Upload(form)) = self.modal.body_mut() {
                form.pointer_down(target);
                if let Some(target) = target {
                    form.handle_click(target);
                }
            }
            let action = self.modal.hit(hit);
            self.apply_modal(action, ctx);
            return;
        }
        if let Some(ClickTarget::Row(idx)) = target {
            self.table.select(Some(*idx));
        }
    }

    fn on_api(&mut self, event: &ApiEvent, ctx: &mut Ctx) {
        match event {
            ApiEvent::KnowledgeFiles(files) => {
                self.files = files.clone();
                self.loading = None;
                table::clamp_selection(&mut self.table, self.files.len());
            }
            ApiEvent::KnowledgeUploaded(file) => {
                upsert(&mut self.files, file.clone(), |f| f.id.as_str());
                table::clamp_selection(&mut self.table, self.files.len());
                if self.modal.is_loading() {
                    self.modal.close();
                    ctx.toasts.success(format!("Uploaded {}", file.name));
                }
            }
            ApiEvent::KnowledgeDeleted(id) => {
                self.files.retain(|f| &f.id != id);
                table::clamp_selection(&mut self.table, self.files.len());
                if self.modal.is_loading() {
                    self.modal.close();
                    ctx.toasts.success("Document deleted");
                }
            }
            ApiEvent::Failed {
                page: PageId::Knowledge,
                kind,
            } => match kind {
                RequestKind::Load => self.loading = None,
                RequestKind::Upload | RequestKind::Delete => self.modal.set_loading(false),
                _ => {}
            },
            _ => {}
        }
    }

    fn is_capturing(&self) -> bool {
        self.modal.is_open()
    }

    fn is_busy(&self) -> bool {
        self.loading.is_some() || self.modal.is_loading()
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self.modal.body() {
            Some(KnowledgeModal::Delete(_)) => &[("Enter", "delete"), ("Esc", "cancel")],
            Some(KnowledgeModal::Upload(_)) => &[("Enter", "upload"), ("Esc", "cancel")],
            None => &[("u", "upload"), ("d", "delete")],
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        hits: &mut HitTestRegistry,
        _mouse_pos: Option<(u16, u16)>,
    ) {
        let rows = self
            .files
            .iter()
            .map(|f| {
                vec![
                    f.name.clone(),
                    f.size_display(),
                    f.status.clone().unwrap_or_else(|| "-".to_string()),
                    f.created_at
                        .map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        ResourceTable::new(
            "Knowledge Base",
            &["NAME", "SIZE", "STATUS", "UPLOADED"],
            &[
                Constraint::Percentage(50),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(12),
            ],
        )
        .rows(rows)
        .empty("No documents: press u to upload one")
        .loading(self.loading.as_ref())
        .render(frame, area, &mut self.table, hits);

        let size = match self.modal.body() {
            Some(KnowledgeModal::Upload(_)) => (64, 9),
            _ => (50, 7),
        };
        let Some(body) = render_modal(frame, &self.modal, size, hits) else {
            return;
        };
        match self.modal.body_mut() {
            Some(KnowledgeModal::Upload(form)) => form.render(frame, body, hits),
            Some(KnowledgeModal::Delete(file)) => {
                let line = Line::from(vec![
                    Span::styled(file.name.clone(), Style::default().fg(Theme::HEADER)),
                    Span::raw(" will be detached from every agent."),
                ]);
                render_message(frame, body, vec![line]);
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_expands_home() {
        assert_eq!(resolve_path(" /tmp/faq.pdf "), PathBuf::from("/tmp/faq.pdf"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_path("~/docs/faq.pdf"), home.join("docs/faq.pdf"));
        }
    }

    #[test]
    fn test_upload_form_starts_empty() {
        let form = upload_form();
        assert_eq!(form.opt_text("path"), None);
    }
}
