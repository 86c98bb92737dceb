//! Phone numbers: import from a telephony provider, route to an agent, delete

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::TableState,
    Frame,
};

use super::{agent_options, refresh_options, select_with, upsert, Page, PageId};
use crate::controls::{
    ModalAction, ModalConfig, ModalState, SelectConfig, SelectOption, SelectState, Spinner,
};
use crate::models::{Agent, PhoneImport, PhoneNumber, ProviderCredentials, TelephonyProvider};
use crate::tui::context::Ctx;
use crate::tui::event::{ApiEvent, RequestKind};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;
use crate::tui::widgets::{
    classify, modal_key, render_message, render_modal, table, FormEvent, FormField, FormState,
    ResourceTable,
};
use crate::validation::{countries, normalize_phone, validate_phone_import};

enum PhoneModal {
    Import(FormState),
    Assign { phone: PhoneNumber, form: FormState },
    Delete(PhoneNumber),
}

pub struct PhonesPage {
    phones: Vec<PhoneNumber>,
    agents: Vec<Agent>,
    table: TableState,
    loading: Option<Spinner>,
    loaded: bool,
    modal: ModalState<PhoneModal>,
}

pub(super) fn provider_select(selected: TelephonyProvider) -> SelectState {
    let options = TelephonyProvider::all()
        .iter()
        .map(|p| SelectOption::new(p.as_str(), p.display_name()))
        .collect();
    select_with(
        SelectConfig::single("Provider").overlay(true),
        options,
        &[selected.as_str().to_string()],
    )
}

pub(super) fn country_select(selected: &str) -> SelectState {
    let options = countries().map(|c| SelectOption::new(c, c)).collect();
    select_with(
        SelectConfig::single("Country").searchable(true).overlay(true),
        options,
        &[selected.to_string()],
    )
}

fn import_form() -> FormState {
    let provider = TelephonyProvider::default();
    let (id_label, secret_label) = provider.credential_labels();
    FormState::new(
        "phone_import",
        vec![
            FormField::select("provider", "Provider", provider_select(provider)),
            FormField::text("cred_id", id_label, ""),
            FormField::secret("cred_secret", secret_label, ""),
            FormField::text("number", "Phone number (E.164)", ""),
            FormField::select("country", "Country", country_select("US")),
            FormField::text("label", "Label (optional)", ""),
        ],
    )
}

/// Credentials belong to one provider: relabel and clear them on change.
pub(super) fn provider_changed(form: &mut FormState) -> Option<TelephonyProvider> {
    let provider = form
        .selected_value("provider")
        .and_then(|p| TelephonyProvider::from_str_opt(&p))?;
    let (id_label, secret_label) = provider.credential_labels();
    form.set_label("cred_id", id_label);
    form.set_label("cred_secret", secret_label);
    form.set_text("cred_id", "");
    form.set_text("cred_secret", "");
    Some(provider)
}

fn import_request(form: &FormState) -> PhoneImport {
    PhoneImport {
        number: form.text("number").trim().to_string(),
        provider: form
            .selected_value("provider")
            .and_then(|p| TelephonyProvider::from_str_opt(&p))
            .unwrap_or_default(),
        country_code: form
            .selected_value("country")
            .unwrap_or_default()
            .to_uppercase(),
        credentials: ProviderCredentials {
            id: form.text("cred_id").trim().to_string(),
            secret: form.text("cred_secret").trim().to_string(),
        },
        label: form.opt_text("label"),
    }
}

fn assign_form(agents: &[Agent], current: Option<&str>) -> FormState {
    let mut options = vec![SelectOption::new("", "Unassigned")];
    options.extend(agent_options(agents));
    let selected: Vec<String> = vec![current.unwrap_or("").to_string()];
    FormState::new(
        "phone_assign",
        vec![FormField::select(
            "agent",
            "Agent",
            select_with(
                SelectConfig::single("Unassigned").searchable(true).overlay(true),
                options,
                &selected,
            ),
        )],
    )
}

impl PhonesPage {
    pub fn new() -> Self {
        Self {
            phones: Vec::new(),
            agents: Vec::new(),
            table: TableState::default(),
            loading: None,
            loaded: false,
            modal: ModalState::default(),
        }
    }

    fn selected(&self) -> Option<&PhoneNumber> {
        self.table.selected().and_then(|i| self.phones.get(i))
    }

    fn agent_name(&self, id: &str) -> String {
        self.agents
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn form_mut(&mut self) -> Option<&mut FormState> {
        match self.modal.body_mut()? {
            PhoneModal::Import(form) | PhoneModal::Assign { form, .. } => Some(form),
            PhoneModal::Delete(_) => None,
        }
    }

    fn confirm(&mut self, ctx: &mut Ctx) {
        let client = ctx.client.clone();
        match self.modal.body() {
            Some(PhoneModal::Import(form)) => {
                let mut request = import_request(form);
                if let Err(e) = validate_phone_import(&request) {
                    ctx.toasts.warning(e.to_string());
                    return;
                }
                request.number = normalize_phone(&request.number);
                ctx.spawn(
                    async move { client.import_phone(&request).await },
                    ApiEvent::PhoneSaved,
                    RequestKind::Save,
                );
            }
            Some(PhoneModal::Assign { phone, form }) => {
                let id = phone.id.clone();
                let agent = form.selected_value("agent").filter(|a| !a.is_empty());
                ctx.spawn(
                    async move { client.assign_phone_agent(&id, agent.as_deref()).await },
                    ApiEvent::PhoneSaved,
                    RequestKind::Save,
                );
            }
            Some(PhoneModal::Delete(phone)) => {
                let id = phone.id.clone();
                ctx.spawn(
                    async move { client.delete_phone(&id).await.map(|_| id) },
                    ApiEvent::PhoneDeleted,
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

impl Default for PhonesPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for PhonesPage {
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
            async move { client.list_phones().await },
            ApiEvent::Phones,
            RequestKind::Load,
        );
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_agents().await },
            ApiEvent::Agents,
            RequestKind::Load,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> bool {
        if self.modal.is_open() {
            let is_delete = matches!(self.modal.body(), Some(PhoneModal::Delete(_)));
            if let Some(form) = self.form_mut() {
                match form.handle_key(key) {
                    FormEvent::SelectChanged("provider") => {
                        provider_changed(form);
                        return true;
                    }
                    FormEvent::Ignored => {}
                    _ => return true,
                }
                // Enter in a form moves on; Ctrl+S submits
                if key.code == KeyCode::Enter {
                    form.focus_next();
                    return true;
                }
            }
            let action = modal_key(&self.modal, key, is_delete);
            self.apply_modal(action, ctx);
            return true;
        }

        if table::navigate(&mut self.table, self.phones.len(), key.code) {
            return true;
        }
        match key.code {
            KeyCode::Char('i') | KeyCode::Char('n') => {
                self.modal.open(
                    ModalConfig::new("Import phone number")
                        .confirm("Import", Some("☎"))
                        .sticky(),
                    PhoneModal::Import(import_form()),
                );
                true
            }
            KeyCode::Char('a') | KeyCode::Enter => {
                if let Some(phone) = self.selected().cloned() {
                    let form = assign_form(&self.agents, phone.agent_id.as_deref());
                    self.modal.open(
                        ModalConfig::new(format!("Route {}", phone.number)).confirm("Save", None),
                        PhoneModal::Assign { phone, form },
                    );
                }
                true
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(phone) = self.selected().cloned() {
                    self.modal.open(
                        ModalConfig::confirm_delete(&phone.number),
                        PhoneModal::Delete(phone),
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
            if let Some(form) = self.form_mut() {
                form.pointer_down(target);
                if let Some(target) = target {
                    if form.handle_click(target) == FormEvent::SelectChanged("provider") {
                        provider_changed(form);
                    }
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
            ApiEvent::Phones(phones) => {
                self.phones = phones.clone();
                self.loading = None;
                table::clamp_selection(&mut self.table, self.phones.len());
            }
            ApiEvent::PhoneSaved(phone) => {
                let imported = !self.phones.iter().any(|p| p.id == phone.id);
                upsert(&mut self.phones, phone.clone(), |p| p.id.as_str());
                table::clamp_selection(&mut self.table, self.phones.len());
                if self.modal.is_loading() {
                    self.modal.close();
                    if imported {
                        ctx.toasts.success(format!("Imported {}", phone.number));
                    } else {
                        let message = match &phone.agent_id {
                            Some(agent) => {
                                format!("{} now routes to {}", phone.number, self.agent_name(agent))
                            }
                            None => format!("{} is unassigned", phone.number),
                        };
                        ctx.toasts.success(message);
                    }
                }
            }
            ApiEvent::PhoneDeleted(id) => {
                self.phones.retain(|p| &p.id != id);
                table::clamp_selection(&mut self.table, self.phones.len());
                if self.modal.is_loading() {
                    self.modal.close();
                    ctx.toasts.success("Phone number deleted");
                }
            }
            ApiEvent::Agents(agents) => {
                self.agents = agents.clone();
                let mut options = vec![SelectOption::new("", "Unassigned")];
                options.extend(agent_options(&self.agents));
                if let Some(PhoneModal::Assign { form, .. }) = self.modal.body_mut() {
                    if let Some(select) = form.select_mut("agent") {
                        refresh_options(select, options);
                    }
                }
            }
            ApiEvent::AgentSaved(agent) => {
                upsert(&mut self.agents, agent.clone(), |a| a.id.as_str());
            }
            ApiEvent::AgentDeleted(id) => {
                self.agents.retain(|a| &a.id != id);
                // the platform unroutes numbers of deleted agents
                for phone in &mut self.phones {
                    if phone.agent_id.as_ref() == Some(id) {
                        phone.agent_id = None;
                    }
                }
            }
            // onboarding provisions an agent and possibly a number
            ApiEvent::OnboardingDone(_) if self.loaded => self.reload(ctx),
            ApiEvent::Failed {
                page: PageId::Phones,
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
            Some(PhoneModal::Delete(_)) => &[("Enter", "delete"), ("Esc", "cancel")],
            Some(_) => &[("Tab", "next field"), ("Ctrl+S", "save"), ("Esc", "cancel")],
            None => &[("i", "import"), ("a", "assign agent"), ("d", "delete")],
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
            .phones
            .iter()
            .map(|p| {
                vec![
                    p.number.clone(),
                    p.provider.display_name().to_string(),
                    p.country_code.clone().unwrap_or_default(),
                    p.label.clone().unwrap_or_default(),
                    p.agent_id
                        .as_deref()
                        .map(|id| self.agent_name(id))
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        ResourceTable::new(
            "Phone Numbers",
            &["NUMBER", "PROVIDER", "COUNTRY", "LABEL", "AGENT"],
            &[
                Constraint::Length(18),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Percentage(30),
                Constraint::Percentage(40),
            ],
        )
        .rows(rows)
        .empty("No numbers yet: press i to import one")
        .loading(self.loading.as_ref())
        .render(frame, area, &mut self.table, hits);

        let size = match self.modal.body() {
            Some(PhoneModal::Import(_)) => (60, 22),
            Some(PhoneModal::Assign { .. }) => (56, 14),
            _ => (50, 7),
        };
        let Some(body) = render_modal(frame, &self.modal, size, hits) else {
            return;
        };
        match self.modal.body_mut() {
            Some(PhoneModal::Import(form) | PhoneModal::Assign { form, .. }) => {
                form.render(frame, body, hits);
                form.render_overlay(frame, hits, mouse_pos);
            }
            Some(PhoneModal::Delete(phone)) => {
                let line = Line::from(vec![
                    Span::raw(format!("{} will be released from ", phone.number)),
                    Span::styled(
                        phone.provider.display_name(),
                        Style::default().fg(Theme::HEADER),
                    ),
                    Span::raw("."),
                ]);
                render_message(frame, body, vec![line]);
            }
            None => {}
        }
    }
}
