//! Agents: list, detail pane, editor and delete confirmation

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, TableState, Wrap},
    Frame,
};

use super::{detail_line, pane, refresh_options, select_with, upsert, Page, PageId};
use crate::controls::{
    ModalAction, ModalConfig, ModalState, SelectConfig, SelectOption, Spinner,
};
use crate::models::{
    Agent, AgentConfig, AgentDraft, Calendar, CalendarSettings, CallTransferSettings,
    KnowledgeFile, Tool, Voice, VoiceSettings, WebhookSettings,
};
use crate::tui::context::Ctx;
use crate::tui::event::{ApiEvent, RequestKind};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;
use crate::tui::widgets::{
    classify, modal_key, render_message, render_modal, table, FormEvent, FormField, FormState,
    ResourceTable,
};
use crate::validation::{normalize_phone, parse_config_override, validate_agent, ValidationError};

const FORM_ID: &str = "agent";

pub struct AgentsPage {
    agents: Vec<Agent>,
    table: TableState,
    loading: Option<Spinner>,
    loaded: bool,
    editor: Option<Editor>,
    delete: ModalState<Agent>,
    voices: Vec<Voice>,
    tools: Vec<Tool>,
    files: Vec<KnowledgeFile>,
    calendars: Vec<Calendar>,
}

struct Editor {
    /// `None` while creating
    id: Option<String>,
    form: FormState,
    saving: Option<Spinner>,
    /// Config as loaded; blocks the form does not edit pass through
    base: AgentConfig,
}

pub(super) fn voice_value(provider: &str, voice_id: &str) -> String {
    format!("{}/{}", provider, voice_id)
}

pub(super) fn voice_options(voices: &[Voice]) -> Vec<SelectOption> {
    voices
        .iter()
        .map(|v| SelectOption::new(voice_value(&v.provider, &v.id), v.picker_label()))
        .collect()
}

fn tool_options(tools: &[Tool]) -> Vec<SelectOption> {
    tools
        .iter()
        .map(|t| SelectOption::new(t.id.clone(), t.name.clone()))
        .collect()
}

fn file_options(files: &[KnowledgeFile]) -> Vec<SelectOption> {
    files
        .iter()
        .map(|f| SelectOption::new(f.id.clone(), f.name.clone()))
        .collect()
}

fn calendar_options(calendars: &[Calendar]) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", "No calendar"))
        .chain(calendars.iter().map(|c| {
            SelectOption::new(c.id.clone(), format!("{} ({})", c.name, c.provider))
        }))
        .collect()
}

impl Editor {
    fn draft(&self) -> Result<AgentDraft, ValidationError> {
        let form = &self.form;
        let base = &self.base;
        let mut config = base.clone();

        config.prompt = form.text("prompt");
        config.first_message = form.opt_text("first_message");
        config.language = form.text("language").trim().to_string();
        config.voice = form.selected_value("voice").and_then(|value| {
            let (provider, voice_id) = value.split_once('/')?;
            let same = base
                .voice
                .as_ref()
                .filter(|v| v.provider == provider && v.voice_id == voice_id);
            Some(VoiceSettings {
                provider: provider.to_string(),
                voice_id: voice_id.to_string(),
                speed: same.and_then(|v| v.speed),
                stability: same.and_then(|v| v.stability),
            })
        });
        config.tool_ids = form.selected_values("tools");
        config.knowledge_file_ids = form.selected_values("knowledge");
        config.calendar = form
            .selected_value("calendar")
            .filter(|id| !id.is_empty())
            .map(|calendar_id| CalendarSettings {
                calendar_id,
                timezone: base.calendar.as_ref().and_then(|c| c.timezone.clone()),
            });
        config.webhook = form.opt_text("webhook").map(|url| WebhookSettings {
            url,
            events: base
                .webhook
                .as_ref()
                .map(|w| w.events.clone())
                .unwrap_or_default(),
        });
        config.call_transfer = form
            .opt_text("transfer")
            .map(|number| CallTransferSettings {
                phone_number: normalize_phone(&number),
                condition: base.call_transfer.as_ref().and_then(|t| t.condition.clone()),
            });
        config.config_override = parse_config_override(&form.text("override"))?;

        let draft = AgentDraft {
            name: form.text("name").trim().to_string(),
            config,
        };
        validate_agent(&draft)?;
        Ok(draft)
    }
}

impl AgentsPage {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            table: TableState::default(),
            loading: None,
            loaded: false,
            editor: None,
            delete: ModalState::default(),
            voices: Vec::new(),
            tools: Vec::new(),
            files: Vec::new(),
            calendars: Vec::new(),
        }
    }

    fn selected(&self) -> Option<&Agent> {
        self.table.selected().and_then(|i| self.agents.get(i))
    }

    fn open_editor(&mut self, agent: Option<&Agent>) {
        let config = agent.map(|a| a.config.clone()).unwrap_or_default();
        let override_text = config
            .config_override
            .as_ref()
            .and_then(|v| serde_json::to_string_pretty(v).ok())
            .unwrap_or_default();
        let voice_selected: Vec<String> = config
            .voice
            .iter()
            .map(|v| voice_value(&v.provider, &v.voice_id))
            .collect();
        let calendar_selected: Vec<String> =
            config.calendar.iter().map(|c| c.calendar_id.clone()).collect();

        let fields = vec![
            FormField::text("name", "Name", agent.map(|a| a.name.as_str()).unwrap_or("")),
            FormField::multiline("prompt", "Prompt", &config.prompt),
            FormField::text(
                "first_message",
                "First message",
                config.first_message.as_deref().unwrap_or(""),
            ),
            FormField::text("language", "Language", &config.language),
            FormField::select(
                "voice",
                "Voice",
                select_with(
                    SelectConfig::single("Choose a voice")
                        .searchable(true)
                        .overlay(true),
                    voice_options(&self.voices),
                    &voice_selected,
                ),
            ),
            FormField::select(
                "tools",
                "Tools",
                select_with(
                    SelectConfig::multi("No tools").searchable(true).overlay(true),
                    tool_options(&self.tools),
                    &config.tool_ids,
                ),
            ),
            FormField::select(
                "knowledge",
                "Knowledge files",
                select_with(
                    SelectConfig::multi("No files").searchable(true).overlay(true),
                    file_options(&self.files),
                    &config.knowledge_file_ids,
                ),
            ),
            FormField::select(
                "calendar",
                "Booking calendar",
                select_with(
                    SelectConfig::single("No calendar")
                        .searchable(true)
                        .overlay(true),
                    calendar_options(&self.calendars),
                    &calendar_selected,
                ),
            ),
            FormField::text(
                "webhook",
                "Webhook URL",
                config.webhook.as_ref().map(|w| w.url.as_str()).unwrap_or(""),
            ),
            FormField::text(
                "transfer",
                "Transfer to number",
                config
                    .call_transfer
                    .as_ref()
                    .map(|t| t.phone_number.as_str())
                    .unwrap_or(""),
            ),
            FormField::multiline("override", "Config override (JSON)", &override_text),
        ];

        self.editor = Some(Editor {
            id: agent.map(|a| a.id.clone()),
            form: FormState::new(FORM_ID, fields),
            saving: None,
            base: config,
        });
    }

    fn refresh_editor_options(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let form = &mut editor.form;
        if let Some(s) = form.select_mut("voice") {
            refresh_options(s, voice_options(&self.voices));
        }
        if let Some(s) = form.select_mut("tools") {
            refresh_options(s, tool_options(&self.tools));
        }
        if let Some(s) = form.select_mut("knowledge") {
            refresh_options(s, file_options(&self.files));
        }
        if let Some(s) = form.select_mut("calendar") {
            refresh_options(s, calendar_options(&self.calendars));
        }
    }

    fn save(&mut self, ctx: &mut Ctx) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if editor.saving.is_some() {
            return;
        }
        let draft = match editor.draft() {
            Ok(draft) => draft,
            Err(e) => {
                ctx.toasts.warning(e.to_string());
                return;
            }
        };
        editor.saving = Some(Spinner::new());
        let client = ctx.client.clone();
        match editor.id.clone() {
            Some(id) => ctx.spawn(
                async move { client.update_agent(&id, &draft).await },
                ApiEvent::AgentSaved,
                RequestKind::Save,
            ),
            None => ctx.spawn(
                async move { client.create_agent(&draft).await },
                ApiEvent::AgentSaved,
                RequestKind::Save,
            ),
        }
    }

    fn confirm_delete(&mut self, ctx: &mut Ctx) {
        let Some(agent) = self.delete.body() else {
            return;
        };
        let id = agent.id.clone();
        self.delete.set_loading(true);
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.delete_agent(&id).await.map(|_| id) },
            ApiEvent::AgentDeleted,
            RequestKind::Delete,
        );
    }

    fn apply_modal(&mut self, action: ModalAction, ctx: &mut Ctx) {
        match action {
            ModalAction::Confirm => self.confirm_delete(ctx),
            ModalAction::Close | ModalAction::Cancel => {
                self.delete.close();
            }
            ModalAction::None => {}
        }
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = pane("Details", false);
        let Some(agent) = self.selected() else {
            let hint = Paragraph::new(Span::styled(
                " Press n to create an agent",
                Style::default().fg(Theme::MUTED),
            ))
            .block(block);
            frame.render_widget(hint, area);
            return;
        };

        let config = &agent.config;
        let names = |ids: &[String], lookup: &dyn Fn(&str) -> Option<String>| {
            if ids.is_empty() {
                "-".to_string()
            } else {
                ids.iter()
                    .map(|id| lookup(id).unwrap_or_else(|| id.clone()))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        let tool_name = |id: &str| self.tools.iter().find(|t| t.id == id).map(|t| t.name.clone());
        let file_name = |id: &str| self.files.iter().find(|f| f.id == id).map(|f| f.name.clone());

        let mut lines = vec![
            detail_line("Name", agent.name.clone()),
            detail_line("ID", agent.id.clone()),
            detail_line("Language", config.language.clone()),
            detail_line(
                "Voice",
                config
                    .voice
                    .as_ref()
                    .map(|v| format!("{} ({})", v.voice_id, v.provider))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            detail_line(
                "First message",
                config.first_message.clone().unwrap_or_else(|| "-".to_string()),
            ),
            detail_line("Features", {
                let features = config.enabled_features();
                if features.is_empty() {
                    "-".to_string()
                } else {
                    features.join(", ")
                }
            }),
            detail_line("Tools", names(&config.tool_ids, &tool_name)),
            detail_line("Knowledge", names(&config.knowledge_file_ids, &file_name)),
        ];
        if let Some(updated) = agent.updated_at {
            lines.push(detail_line(
                "Updated",
                updated.format("%Y-%m-%d %H:%M").to_string(),
            ));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Prompt",
            Style::default()
                .fg(Theme::MUTED)
                .add_modifier(Modifier::BOLD),
        )));
        lines.extend(
            config
                .prompt
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Theme::TEXT)))),
        );

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}

impl Default for AgentsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for AgentsPage {
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
            async move { client.list_agents().await },
            ApiEvent::Agents,
            RequestKind::Load,
        );
        // lookups for the editor's pickers
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_voices().await },
            ApiEvent::Voices,
            RequestKind::Load,
        );
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_tools().await },
            ApiEvent::Tools,
            RequestKind::Load,
        );
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_knowledge_files().await },
            ApiEvent::KnowledgeFiles,
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
        if self.delete.is_open() {
            let action = modal_key(&self.delete, key, true);
            self.apply_modal(action, ctx);
            return true;
        }

        if let Some(editor) = self.editor.as_mut() {
            if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
                self.save(ctx);
                return true;
            }
            if editor.form.handle_key(key) != FormEvent::Ignored {
                return true;
            }
            if key.code == KeyCode::Esc && editor.saving.is_none() {
                self.editor = None;
                return true;
            }
            return false;
        }

        if table::navigate(&mut self.table, self.agents.len(), key.code) {
            return true;
        }
        match key.code {
            KeyCode::Char('n') => {
                self.open_editor(None);
                true
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(agent) = self.selected().cloned() {
                    self.open_editor(Some(&agent));
                }
                true
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(agent) = self.selected().cloned() {
                    let config = ModalConfig::confirm_delete(&format!("agent \"{}\"", agent.name));
                    self.delete.open(config, agent);
                }
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, target: Option<&ClickTarget>, ctx: &mut Ctx) {
        if self.delete.is_open() {
            let action = self.delete.hit(classify(target));
            self.apply_modal(action, ctx);
            return;
        }
        if let Some(editor) = self.editor.as_mut() {
            editor.form.pointer_down(target);
            if let Some(target) = target {
                editor.form.handle_click(target);
            }
            return;
        }
        if let Some(ClickTarget::Row(idx)) = target {
            self.table.select(Some(*idx));
        }
    }

    fn on_api(&mut self, event: &ApiEvent, ctx: &mut Ctx) {
        match event {
            ApiEvent::Agents(agents) => {
                self.agents = agents.clone();
                self.loading = None;
                table::clamp_selection(&mut self.table, self.agents.len());
            }
            ApiEvent::AgentSaved(agent) => {
                upsert(&mut self.agents, agent.clone(), |a| a.id.as_str());
                if self.editor.as_ref().is_some_and(|e| e.saving.is_some()) {
                    self.editor = None;
                    ctx.toasts.success(format!("Saved agent \"{}\"", agent.name));
                    if let Some(pos) = self.agents.iter().position(|a| a.id == agent.id) {
                        self.table.select(Some(pos));
                    }
                }
            }
            ApiEvent::AgentDeleted(id) => {
                self.agents.retain(|a| &a.id != id);
                table::clamp_selection(&mut self.table, self.agents.len());
                if self.delete.body().is_some_and(|a| &a.id == id) {
                    self.delete.close();
                    ctx.toasts.success("Agent deleted");
                }
            }
            ApiEvent::Voices(voices) => {
                self.voices = voices.clone();
                self.refresh_editor_options();
            }
            ApiEvent::VoiceAdded(voice) => {
                upsert(&mut self.voices, voice.clone(), |v| v.id.as_str());
                self.refresh_editor_options();
            }
            ApiEvent::Tools(tools) => {
                self.tools = tools.clone();
                self.refresh_editor_options();
            }
            ApiEvent::ToolSaved(tool) => {
                upsert(&mut self.tools, tool.clone(), |t| t.id.as_str());
                self.refresh_editor_options();
            }
            ApiEvent::ToolDeleted(id) => {
                self.tools.retain(|t| &t.id != id);
                self.refresh_editor_options();
            }
            ApiEvent::KnowledgeFiles(files) => {
                self.files = files.clone();
                self.refresh_editor_options();
            }
            ApiEvent::KnowledgeUploaded(file) => {
                upsert(&mut self.files, file.clone(), |f| f.id.as_str());
                self.refresh_editor_options();
            }
            ApiEvent::KnowledgeDeleted(id) => {
                self.files.retain(|f| &f.id != id);
                self.refresh_editor_options();
            }
            ApiEvent::Calendars(calendars) => {
                self.calendars = calendars.clone();
                self.refresh_editor_options();
            }
            // onboarding provisions an agent and possibly a number
            ApiEvent::OnboardingDone(_) if self.loaded => self.reload(ctx),
            ApiEvent::Failed {
                page: PageId::Agents,
                kind,
            } => match kind {
                RequestKind::Load => self.loading = None,
                RequestKind::Save => {
                    if let Some(editor) = self.editor.as_mut() {
                        editor.saving = None;
                    }
                }
                RequestKind::Delete => self.delete.set_loading(false),
                _ => {}
            },
            _ => {}
        }
    }

    fn is_capturing(&self) -> bool {
        self.editor.is_some() || self.delete.is_open()
    }

    fn is_busy(&self) -> bool {
        self.loading.is_some()
            || self.delete.is_loading()
            || self.editor.as_ref().is_some_and(|e| e.saving.is_some())
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        if self.delete.is_open() {
            &[("Enter", "delete"), ("Esc", "cancel")]
        } else if self.editor.is_some() {
            &[("Tab", "next field"), ("Ctrl+S", "save"), ("Esc", "discard")]
        } else {
            &[("n", "new"), ("e", "edit"), ("d", "delete")]
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        hits: &mut HitTestRegistry,
        mouse_pos: Option<(u16, u16)>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let rows = self
            .agents
            .iter()
            .map(|a| {
                vec![
                    a.name.clone(),
                    a.config.language.clone(),
                    a.config
                        .voice
                        .as_ref()
                        .map(|v| v.voice_id.clone())
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        ResourceTable::new(
            "Agents",
            &["NAME", "LANGUAGE", "VOICE"],
            &[
                Constraint::Percentage(50),
                Constraint::Length(10),
                Constraint::Percentage(30),
            ],
        )
        .rows(rows)
        .empty("No agents yet")
        .loading(self.loading.as_ref())
        .focused(self.editor.is_none())
        .render(frame, chunks[0], &mut self.table, hits);

        match self.editor.as_mut() {
            Some(editor) => {
                let title = match (&editor.id, &editor.saving) {
                    (_, Some(spinner)) => format!("Saving {}", spinner.frame()),
                    (Some(_), None) => "Edit agent".to_string(),
                    (None, None) => "New agent".to_string(),
                };
                let block = pane(title, true);
                let inner = block.inner(chunks[1]);
                frame.render_widget(block, chunks[1]);
                editor.form.render(frame, inner, hits);
                editor.form.render_overlay(frame, hits, mouse_pos);
            }
            None => self.render_detail(frame, chunks[1]),
        }

        if let Some(body) = render_modal(frame, &self.delete, (56, 8), hits) {
            let name = self.delete.body().map(|a| a.name.clone()).unwrap_or_default();
            render_message(
                frame,
                body,
                vec![
                    Line::from(format!("\"{}\" will be removed permanently.", name)),
                    Line::from(Span::styled(
                        "Numbers routed to it become unassigned.",
                        Style::default().fg(Theme::MUTED),
                    )),
                ],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent() -> Agent {
        serde_json::from_value(json!({
            "id": "ag_1",
            "name": "Front desk",
            "config": {
                "prompt": "Greet callers",
                "language": "en-US",
                "voice": { "provider": "elevenlabs", "voice_id": "rachel", "speed": 1.1 },
                "webhook": { "url": "https://hooks.example.com/a", "events": ["call.ended"] },
                "tool_ids": ["t_missing"],
                "llm": { "provider": "openai", "model": "gpt-4o" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_editor_roundtrips_unedited_agent() {
        let mut page = AgentsPage::new();
        let agent = agent();
        page.open_editor(Some(&agent));

        let draft = page.editor.as_ref().unwrap().draft().unwrap();
        assert_eq!(draft.name, "Front desk");
        // blocks the form does not show survive, as do unknown tool ids
        assert_eq!(draft.config.llm, agent.config.llm);
        assert_eq!(draft.config.tool_ids, vec!["t_missing"]);
        assert_eq!(draft.config.voice.as_ref().unwrap().speed, Some(1.1));
        assert_eq!(draft.config.webhook.as_ref().unwrap().events, vec!["call.ended"]);
        assert!(draft.config.calendar.is_none());
    }

    #[test]
    fn test_blank_webhook_switches_feature_off() {
        let mut page = AgentsPage::new();
        page.open_editor(Some(&agent()));
        let editor = page.editor.as_mut().unwrap();
        editor.form.set_text("webhook", "  ");

        let draft = editor.draft().unwrap();
        assert!(draft.config.webhook.is_none());
    }

    #[test]
    fn test_invalid_override_blocks_save() {
        let mut page = AgentsPage::new();
        page.open_editor(None);
        let editor = page.editor.as_mut().unwrap();
        editor.form.set_text("name", "Sales");
        editor.form.set_text("override", "[1]");
        assert_eq!(editor.draft().unwrap_err(), ValidationError::NotAnObject);

        editor.form.set_text("override", r#"{"temperature": 0.3}"#);
        let draft = editor.draft().unwrap();
        assert_eq!(draft.config.config_override, Some(json!({ "temperature": 0.3 })));
    }

    #[test]
    fn test_new_agent_requires_name() {
        let mut page = AgentsPage::new();
        page.open_editor(None);
        assert_eq!(
            page.editor.as_ref().unwrap().draft().unwrap_err(),
            ValidationError::Required("Agent name")
        );
    }
}
