//! Tools: webhook functions and app integrations, plus connected calendars

use std::collections::BTreeMap;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, TableState},
    Frame,
};

use super::{pane, select_with, upsert, Page, PageId};
use crate::controls::{
    ModalAction, ModalConfig, ModalState, SelectConfig, SelectOption, Spinner,
};
use crate::models::{Calendar, HttpMethod, Tool, ToolDraft, ToolKind};
use crate::onboarding::TOOL_APPS;
use crate::tui::context::Ctx;
use crate::tui::event::{ApiEvent, RequestKind};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;
use crate::tui::widgets::{
    classify, modal_key, render_message, render_modal, table, FormEvent, FormField, FormState,
    ResourceTable,
};
use crate::validation::{require, validate_tool, ValidationError};

enum ToolModal {
    /// Create (`id` is `None`) or edit a webhook tool
    Webhook { id: Option<String>, form: FormState },
    /// Connect an app or add credentials to a connected one
    App(FormState),
    Delete(Tool),
}

pub struct ToolsPage {
    tools: Vec<Tool>,
    calendars: Vec<Calendar>,
    table: TableState,
    loading: Option<Spinner>,
    loaded: bool,
    modal: ModalState<ToolModal>,
}

/// Parse one `key<sep>value` pair per line; blank lines are skipped.
fn parse_pairs(
    field: &'static str,
    text: &str,
    sep: char,
) -> Result<BTreeMap<String, String>, ValidationError> {
    let mut pairs = BTreeMap::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.split_once(sep) {
            Some((key, value)) if !key.trim().is_empty() => {
                pairs.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => return Err(ValidationError::Required(field)),
        }
    }
    Ok(pairs)
}

fn format_pairs(pairs: &BTreeMap<String, String>, sep: &str) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}{}{}", k, sep, v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn webhook_form(tool: Option<&Tool>) -> FormState {
    let (url, method, headers) = match tool.map(|t| &t.kind) {
        Some(ToolKind::Webhook {
            url,
            method,
            headers,
        }) => (url.as_str(), *method, format_pairs(headers, ": ")),
        _ => ("", HttpMethod::default(), String::new()),
    };
    let methods = HttpMethod::all()
        .iter()
        .map(|m| SelectOption::new(m.as_str(), m.as_str()))
        .collect();
    FormState::new(
        "tool_webhook",
        vec![
            FormField::text("name", "Name", tool.map(|t| t.name.as_str()).unwrap_or("")),
            FormField::text(
                "description",
                "Description (shown to the model)",
                tool.map(|t| t.description.as_str()).unwrap_or(""),
            ),
            FormField::text("url", "URL", url),
            FormField::select(
                "method",
                "Method",
                select_with(
                    SelectConfig::single("Method").overlay(true),
                    methods,
                    &[method.as_str().to_string()],
                ),
            ),
            FormField::multiline("headers", "Headers (Name: value per line)", &headers),
        ],
    )
}

fn webhook_draft(form: &FormState) -> Result<ToolDraft, ValidationError> {
    let method = form
        .selected_value("method")
        .and_then(|m| HttpMethod::all().iter().find(|h| h.as_str() == m).copied())
        .unwrap_or_default();
    let draft = ToolDraft {
        name: form.text("name").trim().to_string(),
        description: form.text("description").trim().to_string(),
        kind: ToolKind::Webhook {
            url: form.text("url").trim().to_string(),
            method,
            headers: parse_pairs("Header name", &form.text("headers"), ':')?,
        },
    };
    validate_tool(&draft)?;
    Ok(draft)
}

fn app_form(app: Option<&str>) -> FormState {
    let options = TOOL_APPS
        .iter()
        .map(|(id, name)| SelectOption::new(*id, *name))
        .collect();
    let selected: Vec<String> = app.map(str::to_string).into_iter().collect();
    FormState::new(
        "tool_app",
        vec![
            FormField::select(
                "app",
                "App",
                select_with(
                    SelectConfig::single("Choose an app").searchable(true).overlay(true),
                    options,
                    &selected,
                ),
            ),
            FormField::text("display_name", "Display name (optional)", ""),
            FormField::multiline("credentials", "Credentials (key=value per line)", ""),
        ],
    )
}

fn app_display_name(app: &str) -> &str {
    TOOL_APPS
        .iter()
        .find(|(id, _)| *id == app)
        .map(|(_, name)| *name)
        .unwrap_or(app)
}

/// `(app, display name, credentials)` from the app form.
fn app_request(form: &FormState) -> Result<(String, String, BTreeMap<String, String>), ValidationError> {
    let app = form.selected_value("app").unwrap_or_default();
    require("App", &app)?;
    let credentials = parse_pairs("Credential key", &form.text("credentials"), '=')?;
    if credentials.is_empty() {
        return Err(ValidationError::Required("Credentials"));
    }
    let name = form
        .opt_text("display_name")
        .unwrap_or_else(|| app_display_name(&app).to_string());
    Ok((app, name, credentials))
}

impl ToolsPage {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            calendars: Vec::new(),
            table: TableState::default(),
            loading: None,
            loaded: false,
            modal: ModalState::default(),
        }
    }

    fn selected(&self) -> Option<&Tool> {
        self.table.selected().and_then(|i| self.tools.get(i))
    }

    fn form_mut(&mut self) -> Option<&mut FormState> {
        match self.modal.body_mut()? {
            ToolModal::Webhook { form, .. } | ToolModal::App(form) => Some(form),
            ToolModal::Delete(_) => None,
        }
    }

    fn open_edit(&mut self) {
        let Some(tool) = self.selected().cloned() else {
            return;
        };
        match &tool.kind {
            ToolKind::Webhook { .. } => self.modal.open(
                ModalConfig::new(format!("Edit {}", tool.name))
                    .confirm("Save", None)
                    .sticky(),
                ToolModal::Webhook {
                    id: Some(tool.id.clone()),
                    form: webhook_form(Some(&tool)),
                },
            ),
            // stored credentials are never shown; editing adds keys
            ToolKind::App { app, .. } => self.modal.open(
                ModalConfig::new(format!("Update {}", app_display_name(app)))
                    .confirm("Save", None)
                    .sticky(),
                ToolModal::App(app_form(Some(app))),
            ),
        }
    }

    fn confirm(&mut self, ctx: &mut Ctx) {
        let client = ctx.client.clone();
        match self.modal.body() {
            Some(ToolModal::Webhook { id, form }) => {
                let draft = match webhook_draft(form) {
                    Ok(draft) => draft,
                    Err(e) => {
                        ctx.toasts.warning(e.to_string());
                        return;
                    }
                };
                let id = id.clone();
                ctx.spawn(
                    async move {
                        match id {
                            Some(id) => client.update_tool(&id, &draft).await,
                            None => client.create_tool(&draft).await,
                        }
                    },
                    ApiEvent::ToolSaved,
                    RequestKind::Save,
                );
            }
            Some(ToolModal::App(form)) => {
                let (app, name, credentials) = match app_request(form) {
                    Ok(request) => request,
                    Err(e) => {
                        ctx.toasts.warning(e.to_string());
                        return;
                    }
                };
                ctx.spawn(
                    async move { client.save_app_credentials(&app, &name, credentials).await },
                    ApiEvent::ToolSaved,
                    RequestKind::Save,
                );
            }
            Some(ToolModal::Delete(tool)) => {
                let id = tool.id.clone();
                ctx.spawn(
                    async move { client.delete_tool(&id).await.map(|_| id) },
                    ApiEvent::ToolDeleted,
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

    fn render_calendars(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = if self.calendars.is_empty() {
            vec![Line::from(Span::styled(
                " No calendars connected",
                Style::default().fg(Theme::MUTED),
            ))]
        } else {
            self.calendars
                .iter()
                .map(|c| {
                    Line::from(vec![
                        Span::styled(" ◷ ", Style::default().fg(Theme::ACCENT)),
                        Span::styled(c.name.clone(), Style::default().fg(Theme::TEXT)),
                        Span::styled(
                            format!("  {}", c.provider),
                            Style::default().fg(Theme::MUTED),
                        ),
                    ])
                })
                .collect()
        };
        frame.render_widget(
            Paragraph::new(lines).block(pane("Calendars", false)),
            area,
        );
    }
}

impl Default for ToolsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for ToolsPage {
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
            async move { client.list_tools().await },
            ApiEvent::Tools,
            RequestKind::Load,
        );
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_calendars().await },
            ApiEvent::Calendars,
            RequestKind::Load,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> bool {
        if self.modal.is_open() {
            let is_delete = matches!(self.modal.body(), Some(ToolModal::Delete(_)));
            if let Some(form) = self.form_mut() {
                if form.handle_key(key) != FormEvent::Ignored {
                    return true;
                }
                if key.code == KeyCode::Enter {
                    form.focus_next();
                    return true;
                }
            }
            let action = modal_key(&self.modal, key, is_delete);
            self.apply_modal(action, ctx);
            return true;
        }

        if table::navigate(&mut self.table, self.tools.len(), key.code) {
            return true;
        }
        match key.code {
            KeyCode::Char('n') => {
                self.modal.open(
                    ModalConfig::new("New webhook tool")
                        .confirm("Create", None)
                        .sticky(),
                    ToolModal::Webhook {
                        id: None,
                        form: webhook_form(None),
                    },
                );
                true
            }
            KeyCode::Char('c') => {
                self.modal.open(
                    ModalConfig::new("Connect app")
                        .confirm("Connect", None)
                        .sticky(),
                    ToolModal::App(app_form(None)),
                );
                true
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                self.open_edit();
                true
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(tool) = self.selected().cloned() {
                    self.modal
                        .open(ModalConfig::confirm_delete(&tool.name), ToolModal::Delete(tool));
                }
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, target: Option<&ClickTarget>, ctx: &mut Ctx) {
        if self.modal.is_open() {
            let hit = classify(target);
            if let Some(form) = self.form_mut() {
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
            ApiEvent::Tools(tools) => {
                self.tools = tools.clone();
                self.loading = None;
                table::clamp_selection(&mut self.table, self.tools.len());
            }
            ApiEvent::Calendars(calendars) => {
                self.calendars = calendars.clone();
            }
            ApiEvent::ToolSaved(tool) => {
                upsert(&mut self.tools, tool.clone(), |t| t.id.as_str());
                table::clamp_selection(&mut self.table, self.tools.len());
                if self.modal.is_loading() {
                    self.modal.close();
                    ctx.toasts.success(format!("Saved {}", tool.name));
                }
            }
            ApiEvent::ToolDeleted(id) => {
                self.tools.retain(|t| &t.id != id);
                table::clamp_selection(&mut self.table, self.tools.len());
                if self.modal.is_loading() {
                    self.modal.close();
                    ctx.toasts.success("Tool deleted");
                }
            }
            ApiEvent::Failed {
                page: PageId::Tools,
                kind,
            } => match kind {
                RequestKind::Load => self.loading = None,
                RequestKind::Save | RequestKind::Delete => self.modal.set_loading(false),
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
            Some(ToolModal::Delete(_)) => &[("Enter", "delete"), ("Esc", "cancel")],
            Some(_) => &[("Tab", "next field"), ("Ctrl+S", "save"), ("Esc", "cancel")],
            None => &[("n", "new webhook"), ("c", "connect app"), ("e", "edit"), ("d", "delete")],
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        hits: &mut HitTestRegistry,
        mouse_pos: Option<(u16, u16)>,
    ) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let rows = self
            .tools
            .iter()
            .map(|t| {
                let target = match &t.kind {
                    ToolKind::Webhook { url, method, .. } => format!("{} {}", method.as_str(), url),
                    ToolKind::App { credentials, .. } => {
                        format!("{} credential(s)", credentials.len())
                    }
                };
                vec![t.name.clone(), t.kind_label().to_string(), target]
            })
            .collect();
        ResourceTable::new(
            "Tools",
            &["NAME", "TYPE", "TARGET"],
            &[
                Constraint::Percentage(30),
                Constraint::Length(16),
                Constraint::Min(10),
            ],
        )
        .rows(rows)
        .empty("No tools yet: n adds a webhook, c connects an app")
        .loading(self.loading.as_ref())
        .render(frame, columns[0], &mut self.table, hits);

        self.render_calendars(frame, columns[1]);

        let size = match self.modal.body() {
            Some(ToolModal::Webhook { .. }) => (64, 27),
            Some(ToolModal::App(_)) => (60, 19),
            _ => (50, 7),
        };
        let Some(body) = render_modal(frame, &self.modal, size, hits) else {
            return;
        };
        match self.modal.body_mut() {
            Some(ToolModal::Webhook { form, .. } | ToolModal::App(form)) => {
                form.render(frame, body, hits);
                form.render_overlay(frame, hits, mouse_pos);
            }
            Some(ToolModal::Delete(tool)) => {
                let line = Line::from(vec![
                    Span::styled(tool.name.clone(), Style::default().fg(Theme::HEADER)),
                    Span::raw(" will be removed from every agent using it."),
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
    fn test_parse_pairs() {
        let headers = parse_pairs("Header name", "Authorization: Bearer x\n\n X-Id : 7 ", ':')
            .unwrap();
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer x"));
        assert_eq!(headers.get("X-Id").map(String::as_str), Some("7"));

        assert_eq!(
            parse_pairs("Credential key", "no separator", '='),
            Err(ValidationError::Required("Credential key"))
        );
    }

    #[test]
    fn test_webhook_form_round_trips_existing_tool() {
        let tool: Tool = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "name": "lookup_order",
            "type": "webhook",
            "url": "https://shop.example.com/orders",
            "method": "GET",
            "headers": { "X-Key": "abc" }
        }))
        .unwrap();

        let form = webhook_form(Some(&tool));
        assert_eq!(form.text("headers"), "X-Key: abc");
        let draft = webhook_draft(&form).unwrap();
        assert_eq!(draft.kind, tool.kind);
    }

    #[test]
    fn test_webhook_draft_requires_url() {
        let mut form = webhook_form(None);
        form.set_text("name", "notify");
        assert!(matches!(
            webhook_draft(&form),
            Err(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_app_request_defaults_display_name() {
        let mut form = app_form(Some("hubspot"));
        form.set_text("credentials", "api_key=abc");
        let (app, name, credentials) = app_request(&form).unwrap();
        assert_eq!(app, "hubspot");
        assert_eq!(name, "HubSpot");
        assert_eq!(credentials.len(), 1);

        let empty = app_form(None);
        assert_eq!(app_request(&empty), Err(ValidationError::Required("App")));
    }
}
