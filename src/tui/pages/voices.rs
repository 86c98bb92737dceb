//! Voice catalogue: built-in and custom text-to-speech voices

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    widgets::TableState,
    Frame,
};

use super::{select_with, upsert, Page, PageId};
use crate::controls::{
    ModalAction, ModalConfig, ModalState, SelectConfig, SelectOption, Spinner,
};
use crate::models::{CustomVoiceRequest, Voice};
use crate::tui::context::Ctx;
use crate::tui::event::{ApiEvent, RequestKind};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::widgets::{
    classify, modal_key, render_modal, table, FormEvent, FormField, FormState, ResourceTable,
};
use crate::validation::{require, ValidationError};

/// Providers offered for custom voices when the catalogue has none yet.
const VOICE_PROVIDERS: &[&str] = &["elevenlabs", "cartesia", "deepgram", "playht", "azure"];

pub struct VoicesPage {
    voices: Vec<Voice>,
    table: TableState,
    loading: Option<Spinner>,
    loaded: bool,
    modal: ModalState<FormState>,
}

/// Known providers plus any the catalogue uses.
fn provider_options(voices: &[Voice]) -> Vec<SelectOption> {
    let mut providers: Vec<&str> = VOICE_PROVIDERS.to_vec();
    for voice in voices {
        if !providers.contains(&voice.provider.as_str()) {
            providers.push(&voice.provider);
        }
    }
    providers
        .into_iter()
        .map(|p| SelectOption::new(p, p))
        .collect()
}

fn custom_voice_form(voices: &[Voice]) -> FormState {
    FormState::new(
        "voice_custom",
        vec![
            FormField::select(
                "provider",
                "Provider",
                select_with(
                    SelectConfig::single("Provider").searchable(true).overlay(true),
                    provider_options(voices),
                    &[VOICE_PROVIDERS[0].to_string()],
                ),
            ),
            FormField::text("voice_id", "Provider voice ID", ""),
            FormField::text("name", "Display name", ""),
        ],
    )
}

fn custom_voice_request(form: &FormState) -> Result<CustomVoiceRequest, ValidationError> {
    let request = CustomVoiceRequest {
        provider: form.selected_value("provider").unwrap_or_default(),
        voice_id: form.text("voice_id").trim().to_string(),
        name: form.text("name").trim().to_string(),
    };
    require("Provider", &request.provider)?;
    require("Voice ID", &request.voice_id)?;
    require("Display name", &request.name)?;
    Ok(request)
}

impl VoicesPage {
    pub fn new() -> Self {
        Self {
            voices: Vec::new(),
            table: TableState::default(),
            loading: None,
            loaded: false,
            modal: ModalState::default(),
        }
    }

    fn open_preview(&self, ctx: &mut Ctx) {
        let Some(voice) = self.table.selected().and_then(|i| self.voices.get(i)) else {
            return;
        };
        match &voice.preview_url {
            Some(url) => {
                if let Err(e) = webbrowser::open(url) {
                    tracing::warn!(error = %e, "Could not open browser");
                    ctx.toasts.warning(format!("Could not open browser: {}", url));
                }
            }
            None => ctx.toasts.info(format!("{} has no preview", voice.name)),
        }
    }

    fn confirm(&mut self, ctx: &mut Ctx) {
        let Some(form) = self.modal.body() else {
            return;
        };
        let request = match custom_voice_request(form) {
            Ok(request) => request,
            Err(e) => {
                ctx.toasts.warning(e.to_string());
                return;
            }
        };
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.add_custom_voice(&request).await },
            ApiEvent::VoiceAdded,
            RequestKind::Save,
        );
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

impl Default for VoicesPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for VoicesPage {
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
            async move { client.list_voices().await },
            ApiEvent::Voices,
            RequestKind::Load,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> bool {
        if self.modal.is_open() {
            if let Some(form) = self.modal.body_mut() {
                if form.handle_key(key) != FormEvent::Ignored {
                    return true;
                }
                if key.code == KeyCode::Enter {
                    form.focus_next();
                    return true;
                }
            }
            let action = modal_key(&self.modal, key, false);
            self.apply_modal(action, ctx);
            return true;
        }

        if table::navigate(&mut self.table, self.voices.len(), key.code) {
            return true;
        }
        match key.code {
            KeyCode::Char('n') | KeyCode::Char('a') => {
                self.modal.open(
                    ModalConfig::new("Add custom voice")
                        .confirm("Add", None)
                        .sticky(),
                    custom_voice_form(&self.voices),
                );
                true
            }
            KeyCode::Char('o') | KeyCode::Enter => {
                self.open_preview(ctx);
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, target: Option<&ClickTarget>, ctx: &mut Ctx) {
        if self.modal.is_open() {
            let hit = classify(target);
            if let Some(form) = self.modal.body_mut() {
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
            ApiEvent::Voices(voices) => {
                self.voices = voices.clone();
                self.loading = None;
                table::clamp_selection(&mut self.table, self.voices.len());
            }
            ApiEvent::VoiceAdded(voice) => {
                upsert(&mut self.voices, voice.clone(), |v| v.id.as_str());
                table::clamp_selection(&mut self.table, self.voices.len());
                if self.modal.is_loading() {
                    self.modal.close();
                    ctx.toasts.success(format!("Added voice {}", voice.name));
                }
            }
            ApiEvent::Failed {
                page: PageId::Voices,
                kind,
            } => match kind {
                RequestKind::Load => self.loading = None,
                RequestKind::Save => self.modal.set_loading(false),
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
        if self.modal.is_open() {
            &[("Tab", "next field"), ("Ctrl+S", "add"), ("Esc", "cancel")]
        } else {
            &[("n", "add custom voice"), ("o", "open preview")]
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        hits: &mut HitTestRegistry,
        mouse_pos: Option<(u16, u16)>,
    ) {
        let rows = self
            .voices
            .iter()
            .map(|v| {
                vec![
                    v.name.clone(),
                    v.provider.clone(),
                    v.language.clone().unwrap_or_default(),
                    v.gender.clone().unwrap_or_default(),
                    if v.custom { "custom" } else { "built-in" }.to_string(),
                    if v.preview_url.is_some() { "▶" } else { "" }.to_string(),
                ]
            })
            .collect();
        ResourceTable::new(
            "Voices",
            &["NAME", "PROVIDER", "LANGUAGE", "GENDER", "SOURCE", ""],
            &[
                Constraint::Percentage(30),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(9),
                Constraint::Length(2),
            ],
        )
        .rows(rows)
        .empty("No voices available")
        .loading(self.loading.as_ref())
        .render(frame, area, &mut self.table, hits);

        let Some(body) = render_modal(frame, &self.modal, (56, 15), hits) else {
            return;
        };
        if let Some(form) = self.modal.body_mut() {
            form.render(frame, body, hits);
            form.render_overlay(frame, hits, mouse_pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_options_include_catalogue_providers() {
        let voices: Vec<Voice> = serde_json::from_value(serde_json::json!([
            { "id": "v1", "name": "Rachel", "provider": "elevenlabs" },
            { "id": "v2", "name": "Nova", "provider": "openai" }
        ]))
        .unwrap();
        let options = provider_options(&voices);
        assert_eq!(options.len(), VOICE_PROVIDERS.len() + 1);
        assert_eq!(options.last().map(|o| o.value.as_str()), Some("openai"));
    }

    #[test]
    fn test_custom_voice_request_requires_fields() {
        let mut form = custom_voice_form(&[]);
        form.set_text("voice_id", "abc123");
        assert_eq!(
            custom_voice_request(&form),
            Err(ValidationError::Required("Display name"))
        );

        form.set_text("name", "Brand voice");
        let request = custom_voice_request(&form).unwrap();
        assert_eq!(request.provider, "elevenlabs");
        assert_eq!(request.voice_id, "abc123");
    }
}
