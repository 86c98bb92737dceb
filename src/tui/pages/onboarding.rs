//! First-run onboarding wizard page

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Wrap},
    Frame,
};

use super::phones::{country_select, provider_changed, provider_select};
use super::agents::{voice_options, voice_value};
use super::{detail_line, pane, refresh_options, select_with, Page, PageId};
use crate::config::Config;
use crate::controls::{SelectConfig, SelectOption, Spinner};
use crate::models::{TelephonyProvider, User, Voice};
use crate::onboarding::{
    BillingData, OnboardingData, OnboardingResult, OnboardingStep, OnboardingWizard, VoiceChoice,
    WizardTransition, TOOL_APPS,
};
use crate::session::SessionProvider;
use crate::tui::context::Ctx;
use crate::tui::event::{ApiEvent, RequestKind};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;
use crate::tui::widgets::{FormEvent, FormField, FormState};

pub struct OnboardingPage {
    wizard: Option<OnboardingWizard>,
    form: FormState,
    voices: Vec<Voice>,
    submitting: Option<Spinner>,
    done: Option<OnboardingResult>,
}

fn billing_data(user: Option<&User>, config: &Config) -> BillingData {
    BillingData {
        balance: user.map(|u| u.credits).unwrap_or_default(),
        minimum_balance: config.minimum_balance,
        payment_method: user.and_then(|u| u.payment_method.clone()),
        today: Local::now().date_naive(),
    }
}

/// Inputs for one step, filled from what was entered before.
fn step_form(step: OnboardingStep, data: &OnboardingData, voices: &[Voice]) -> FormState {
    match step {
        OnboardingStep::PhoneConnection => {
            let phone = &data.phone;
            let (id_label, secret_label) = phone.provider.credential_labels();
            FormState::new(
                "onboarding_phone",
                vec![
                    FormField::select("provider", "Provider", provider_select(phone.provider)),
                    FormField::text("cred_id", id_label, &phone.credentials.id),
                    FormField::secret("cred_secret", secret_label, &phone.credentials.secret),
                    FormField::text("number", "Phone number (E.164)", &phone.number),
                    FormField::select("country", "Country", country_select(&phone.country_code)),
                ],
            )
        }
        OnboardingStep::VoiceProvider => {
            let selected: Vec<String> = data
                .voice
                .iter()
                .map(|v| voice_value(&v.provider, &v.voice_id))
                .collect();
            FormState::new(
                "onboarding_voice",
                vec![FormField::select(
                    "voice",
                    "Voice",
                    select_with(
                        SelectConfig::single("Choose a voice")
                            .searchable(true)
                            .overlay(true),
                        voice_options(voices),
                        &selected,
                    ),
                )],
            )
        }
        OnboardingStep::Billing => FormState::new("onboarding_billing", Vec::new()),
        OnboardingStep::Industry => FormState::new(
            "onboarding_industry",
            vec![FormField::text(
                "industry",
                "Industry (e.g. Dental clinic, Real estate)",
                &data.industry,
            )],
        ),
        OnboardingStep::AgentIdentity => FormState::new(
            "onboarding_identity",
            vec![
                FormField::text("agent_name", "Agent name", &data.agent_name),
                FormField::text("language", "Language", &data.language),
            ],
        ),
        OnboardingStep::Tools => {
            let options = TOOL_APPS
                .iter()
                .map(|(id, name)| SelectOption::new(*id, *name))
                .collect();
            FormState::new(
                "onboarding_tools",
                vec![FormField::select(
                    "apps",
                    "Apps",
                    select_with(
                        SelectConfig::multi("Pick apps to connect later")
                            .searchable(true)
                            .overlay(true),
                        options,
                        &data.tool_apps,
                    ),
                )],
            )
        }
    }
}

/// Copy a step's inputs into the wizard data.
fn read_form(step: OnboardingStep, form: &FormState, data: &mut OnboardingData) {
    match step {
        OnboardingStep::PhoneConnection => {
            if let Some(provider) = form
                .selected_value("provider")
                .and_then(|p| TelephonyProvider::from_str_opt(&p))
            {
                data.phone.provider = provider;
            }
            data.phone.credentials.id = form.text("cred_id").trim().to_string();
            data.phone.credentials.secret = form.text("cred_secret").trim().to_string();
            data.phone.number = form.text("number").trim().to_string();
            data.phone.country_code = form.selected_value("country").unwrap_or_default();
        }
        OnboardingStep::VoiceProvider => {
            data.voice = form.selected_value("voice").and_then(|value| {
                let (provider, voice_id) = value.split_once('/')?;
                Some(VoiceChoice {
                    provider: provider.to_string(),
                    voice_id: voice_id.to_string(),
                })
            });
        }
        OnboardingStep::Billing => {}
        OnboardingStep::Industry => data.industry = form.text("industry"),
        OnboardingStep::AgentIdentity => {
            data.agent_name = form.text("agent_name");
            data.language = form.text("language").trim().to_string();
        }
        OnboardingStep::Tools => data.tool_apps = form.selected_values("apps"),
    }
}

impl OnboardingPage {
    pub fn new() -> Self {
        Self {
            wizard: None,
            form: FormState::new("onboarding", Vec::new()),
            voices: Vec::new(),
            submitting: None,
            done: None,
        }
    }

    fn rebuild_form(&mut self) {
        if let Some(wizard) = &self.wizard {
            self.form = step_form(wizard.step(), &wizard.data, &self.voices);
        }
    }

    /// Apply a navigation request after syncing the current step's inputs.
    fn navigate(&mut self, ctx: &mut Ctx, go: fn(&mut OnboardingWizard) -> WizardTransition) {
        if self.submitting.is_some() {
            return;
        }
        let Some(wizard) = self.wizard.as_mut() else {
            return;
        };
        read_form(wizard.step(), &self.form, &mut wizard.data);
        match go(wizard) {
            WizardTransition::Moved(_) => self.rebuild_form(),
            WizardTransition::Exit => *ctx.navigate = Some(PageId::Agents),
            WizardTransition::Blocked(e) => ctx.toasts.warning(e.to_string()),
            WizardTransition::Complete(config) => {
                self.submitting = Some(Spinner::new());
                let client = ctx.client.clone();
                ctx.spawn(
                    async move { client.complete_onboarding(&config).await },
                    ApiEvent::OnboardingDone,
                    RequestKind::Onboarding,
                );
            }
        }
    }

    fn open_billing(&self, ctx: &mut Ctx) {
        let Some(url) = ctx.config.billing_url.clone() else {
            ctx.toasts.info("No billing page configured");
            return;
        };
        if let Err(e) = webbrowser::open(&url) {
            tracing::warn!(error = %e, "Could not open browser");
            ctx.toasts.warning(format!("Open {} to add a payment method", url));
        } else {
            ctx.toasts.info("Finish in the browser, then press Ctrl+R");
        }
    }

    fn render_billing(&self, frame: &mut Frame, area: Rect, billing: &BillingData) {
        let (status, color) = if billing.is_satisfied() {
            ("Ready", Theme::GREEN)
        } else {
            ("Payment method required", Theme::YELLOW)
        };
        let mut lines = vec![
            detail_line("Balance", format!("{:.2}", billing.balance)),
            detail_line("Minimum", format!("{:.2}", billing.minimum_balance)),
            detail_line(
                "Card",
                billing
                    .payment_method
                    .as_ref()
                    .map(|pm| pm.summary())
                    .unwrap_or_else(|| "none on file".to_string()),
            ),
            Line::from(""),
            Line::from(Span::styled(
                status,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ];
        if !billing.is_satisfied() {
            lines.push(Line::from(Span::styled(
                "Ctrl+O opens the billing page; Ctrl+R reloads your account afterwards.",
                Style::default().fg(Theme::MUTED),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }

    fn render_done(&self, frame: &mut Frame, area: Rect, result: &OnboardingResult) {
        let mut lines = vec![
            Line::from(Span::styled(
                "You're all set",
                Style::default()
                    .fg(Theme::GREEN)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        if let Some(agent) = &result.agent_id {
            lines.push(detail_line("Agent", agent.clone()));
        }
        if let Some(phone) = &result.phone_id {
            lines.push(detail_line("Phone", phone.clone()));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press 1 to open your agents.",
            Style::default().fg(Theme::MUTED),
        )));
        frame.render_widget(
            Paragraph::new(lines).block(pane("Onboarding", false)),
            area,
        );
    }
}

impl Default for OnboardingPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for OnboardingPage {
    fn enter(&mut self, ctx: &mut Ctx) {
        if self.wizard.is_none() {
            let user = ctx.session.current_user();
            let billing = billing_data(user.as_ref(), ctx.config);
            self.wizard = Some(OnboardingWizard::new(OnboardingData::new(billing)));
            self.rebuild_form();
            self.reload(ctx);
        }
    }

    fn reload(&mut self, ctx: &mut Ctx) {
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_voices().await },
            ApiEvent::Voices,
            RequestKind::Load,
        );
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.refresh_current_user().await },
            ApiEvent::User,
            RequestKind::Load,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> bool {
        if self.done.is_some() || self.wizard.is_none() {
            return false;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => self.navigate(ctx, OnboardingWizard::next),
                KeyCode::Char('p') => self.navigate(ctx, OnboardingWizard::back),
                KeyCode::Char('k') => self.navigate(ctx, OnboardingWizard::skip),
                KeyCode::Char('o') => self.open_billing(ctx),
                _ => return false,
            }
            return true;
        }

        match self.form.handle_key(key) {
            FormEvent::SelectChanged("provider") => {
                if let (Some(provider), Some(wizard)) =
                    (provider_changed(&mut self.form), self.wizard.as_mut())
                {
                    wizard.set_provider(provider);
                }
                true
            }
            FormEvent::Ignored => match key.code {
                KeyCode::Enter => {
                    self.form.focus_next();
                    true
                }
                _ => false,
            },
            _ => true,
        }
    }

    fn handle_click(&mut self, target: Option<&ClickTarget>, _ctx: &mut Ctx) {
        self.form.pointer_down(target);
        let Some(target) = target else {
            return;
        };
        if self.form.handle_click(target) == FormEvent::SelectChanged("provider") {
            if let (Some(provider), Some(wizard)) =
                (provider_changed(&mut self.form), self.wizard.as_mut())
            {
                wizard.set_provider(provider);
            }
        }
    }

    fn on_api(&mut self, event: &ApiEvent, ctx: &mut Ctx) {
        match event {
            ApiEvent::Voices(voices) => {
                self.voices = voices.clone();
                if let Some(select) = self.form.select_mut("voice") {
                    refresh_options(select, voice_options(&self.voices));
                }
            }
            ApiEvent::VoiceAdded(voice) => {
                super::upsert(&mut self.voices, voice.clone(), |v| v.id.as_str());
                if let Some(select) = self.form.select_mut("voice") {
                    refresh_options(select, voice_options(&self.voices));
                }
            }
            ApiEvent::User(user) => {
                if let Some(wizard) = self.wizard.as_mut() {
                    wizard.data.billing = billing_data(Some(user), ctx.config);
                }
            }
            ApiEvent::OnboardingDone(result) if self.submitting.is_some() => {
                self.submitting = None;
                self.done = Some(result.clone());
                ctx.toasts.success("Onboarding complete");
                let client = ctx.client.clone();
                ctx.spawn(
                    async move { client.refresh_current_user().await },
                    ApiEvent::User,
                    RequestKind::Load,
                );
            }
            ApiEvent::Failed {
                page: PageId::Onboarding,
                kind: RequestKind::Onboarding,
            } => self.submitting = None,
            _ => {}
        }
    }

    fn is_capturing(&self) -> bool {
        self.done.is_none() && self.form.focused_key().is_some()
    }

    fn is_busy(&self) -> bool {
        self.submitting.is_some()
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self.wizard.as_ref().map(|w| w.step()) {
            _ if self.done.is_some() => &[("1", "agents")],
            Some(OnboardingStep::Billing) => &[
                ("Ctrl+N", "next"),
                ("Ctrl+P", "back"),
                ("Ctrl+O", "add payment method"),
            ],
            Some(step) if step.can_skip() => {
                &[("Ctrl+N", "next"), ("Ctrl+P", "back"), ("Ctrl+K", "skip")]
            }
            _ => &[("Tab", "next field"), ("Ctrl+N", "next"), ("Ctrl+P", "back")],
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        hits: &mut HitTestRegistry,
        mouse_pos: Option<(u16, u16)>,
    ) {
        if let Some(result) = &self.done {
            self.render_done(frame, area, result);
            return;
        }
        let Some(wizard) = &self.wizard else {
            return;
        };
        let step = wizard.step();

        let title = match &self.submitting {
            Some(spinner) => format!("{} {}", step.title(), spinner.frame()),
            None => step.title().to_string(),
        };
        let block = pane(title, true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let ratio = step.number() as f64 / OnboardingStep::count() as f64;
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Theme::ACCENT).bg(Theme::PANEL_BG))
            .ratio(ratio)
            .label(format!("Step {} of {}", step.number(), OnboardingStep::count()));
        frame.render_widget(gauge, rows[0]);

        if step == OnboardingStep::Billing {
            self.render_billing(frame, rows[2], &wizard.data.billing);
        } else {
            self.form.render(frame, rows[2], hits);
            self.form.render_overlay(frame, hits, mouse_pos);
        }
    }
}
