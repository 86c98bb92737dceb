//! Page containers
//!
//! Each page owns its slice of server state: it fetches on first visit,
//! mutates through the API and reconciles when completions come back. Every
//! completion is offered to every page so lookups (agents for the phone page,
//! voices for the agent editor) stay current wherever they are shown.

mod agents;
mod call_logs;
mod knowledge;
mod onboarding;
mod phones;
mod tools;
mod voices;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
    Frame,
};

use super::context::Ctx;
use super::event::ApiEvent;
use super::hit_test::{ClickTarget, HitTestRegistry};
use super::theme::Theme;
use crate::config::Config;
use crate::controls::{SelectConfig, SelectOption, SelectState};
use crate::models::Agent;

pub use agents::AgentsPage;
pub use call_logs::CallLogsPage;
pub use knowledge::KnowledgePage;
pub use onboarding::OnboardingPage;
pub use phones::PhonesPage;
pub use tools::ToolsPage;
pub use voices::VoicesPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageId {
    #[default]
    Agents,
    Phones,
    Calls,
    Tools,
    Knowledge,
    Voices,
    Onboarding,
}

impl PageId {
    pub fn all() -> &'static [PageId] {
        &[
            PageId::Agents,
            PageId::Phones,
            PageId::Calls,
            PageId::Tools,
            PageId::Knowledge,
            PageId::Voices,
            PageId::Onboarding,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            PageId::Agents => "Agents",
            PageId::Phones => "Phone Numbers",
            PageId::Calls => "Call Logs",
            PageId::Tools => "Tools",
            PageId::Knowledge => "Knowledge",
            PageId::Voices => "Voices",
            PageId::Onboarding => "Onboarding",
        }
    }

    /// Page for a number key, `'1'` being the first tab.
    pub fn from_digit(c: char) -> Option<Self> {
        let idx = c.to_digit(10)?.checked_sub(1)? as usize;
        Self::all().get(idx).copied()
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|p| p == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|p| p == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// Behaviour shared by every page
pub trait Page {
    /// Called whenever the page becomes active; loads once.
    fn enter(&mut self, ctx: &mut Ctx);

    /// Fetch everything the page shows again.
    fn reload(&mut self, ctx: &mut Ctx);

    /// Returns true when the key was used.
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> bool;

    /// Pointer-down anywhere on screen; `target` is the topmost hit, if any.
    fn handle_click(&mut self, target: Option<&ClickTarget>, ctx: &mut Ctx);

    fn handle_scroll(&mut self, _down: bool, _ctx: &mut Ctx) {}

    fn on_api(&mut self, event: &ApiEvent, ctx: &mut Ctx);

    /// Whether typed characters belong to the page (an editor or modal is
    /// open), so global single-key shortcuts must not fire.
    fn is_capturing(&self) -> bool;

    /// Whether a request started by this page is outstanding.
    fn is_busy(&self) -> bool {
        false
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)];

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        hits: &mut HitTestRegistry,
        mouse_pos: Option<(u16, u16)>,
    );
}

pub struct Pages {
    agents: AgentsPage,
    phones: PhonesPage,
    calls: CallLogsPage,
    tools: ToolsPage,
    knowledge: KnowledgePage,
    voices: VoicesPage,
    onboarding: OnboardingPage,
}

impl Pages {
    pub fn new(config: &Config) -> Self {
        Self {
            agents: AgentsPage::new(),
            phones: PhonesPage::new(),
            calls: CallLogsPage::new(config.call_log_page_size),
            tools: ToolsPage::new(),
            knowledge: KnowledgePage::new(),
            voices: VoicesPage::new(),
            onboarding: OnboardingPage::new(),
        }
    }

    pub fn get(&self, id: PageId) -> &dyn Page {
        match id {
            PageId::Agents => &self.agents,
            PageId::Phones => &self.phones,
            PageId::Calls => &self.calls,
            PageId::Tools => &self.tools,
            PageId::Knowledge => &self.knowledge,
            PageId::Voices => &self.voices,
            PageId::Onboarding => &self.onboarding,
        }
    }

    pub fn get_mut(&mut self, id: PageId) -> &mut dyn Page {
        match id {
            PageId::Agents => &mut self.agents,
            PageId::Phones => &mut self.phones,
            PageId::Calls => &mut self.calls,
            PageId::Tools => &mut self.tools,
            PageId::Knowledge => &mut self.knowledge,
            PageId::Voices => &mut self.voices,
            PageId::Onboarding => &mut self.onboarding,
        }
    }

    /// Offer a completion to every page. Requests a page starts from here
    /// report failures back to that page.
    pub fn broadcast(&mut self, event: &ApiEvent, ctx: &mut Ctx) {
        let active = ctx.page;
        for id in PageId::all() {
            ctx.page = *id;
            self.get_mut(*id).on_api(event, ctx);
        }
        ctx.page = active;
    }
}

/// Options for an agent picker.
fn agent_options(agents: &[Agent]) -> Vec<SelectOption> {
    agents
        .iter()
        .map(|a| SelectOption::new(a.id.clone(), a.name.clone()))
        .collect()
}

/// Build a select with `selected` values chosen. Values missing from
/// `options` (lookups not loaded yet) get a stand-in option so saving never
/// drops them.
fn select_with(
    config: SelectConfig,
    options: Vec<SelectOption>,
    selected: &[String],
) -> SelectState {
    let mut select = SelectState::new(config, with_missing(options, selected));
    select.set_selected_values(selected);
    select
}

/// Swap in fresh options, keeping the current selection.
fn refresh_options(select: &mut SelectState, options: Vec<SelectOption>) {
    let selected = select.selection().values();
    select.set_options(with_missing(options, &selected));
    select.set_selected_values(&selected);
}

fn with_missing(mut options: Vec<SelectOption>, selected: &[String]) -> Vec<SelectOption> {
    for value in selected {
        if !options.iter().any(|o| &o.value == value) {
            options.push(SelectOption::new(value.clone(), value.clone()));
        }
    }
    options
}

/// `label: value` row of a detail pane.
fn detail_line(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), Style::default().fg(Theme::MUTED)),
        Span::styled(value.into(), Style::default().fg(Theme::TEXT)),
    ])
}

/// Bordered pane with a bold title.
fn pane(title: impl Into<String>, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", title.into()),
            Style::default()
                .fg(Theme::HEADER)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(if focused {
            Theme::ACCENT
        } else {
            Theme::BORDER
        }))
}

/// Insert or replace by id, keeping list order.
fn upsert<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &str) {
    let key = id(&item).to_string();
    match items.iter().position(|existing| id(existing) == key) {
        Some(pos) => items[pos] = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_shortcuts() {
        assert_eq!(PageId::from_digit('1'), Some(PageId::Agents));
        assert_eq!(PageId::from_digit('7'), Some(PageId::Onboarding));
        assert_eq!(PageId::from_digit('0'), None);
        assert_eq!(PageId::from_digit('8'), None);
        assert_eq!(PageId::Onboarding.next(), PageId::Agents);
        assert_eq!(PageId::Agents.prev(), PageId::Onboarding);
    }

    #[test]
    fn test_unknown_selected_values_survive() {
        let options = vec![SelectOption::new("t1", "Lookup")];
        let mut select = select_with(
            SelectConfig::multi("Tools"),
            options,
            &["t1".to_string(), "t9".to_string()],
        );
        assert_eq!(select.selection().values(), vec!["t1", "t9"]);

        refresh_options(
            &mut select,
            vec![
                SelectOption::new("t1", "Lookup"),
                SelectOption::new("t9", "Booking"),
            ],
        );
        assert_eq!(select.options().len(), 2);
        assert_eq!(select.selection().values(), vec!["t1", "t9"]);
        assert_eq!(select.display_text(), "Lookup, Booking");
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut items = vec![("a", 1), ("b", 2)];
        upsert(&mut items, ("b", 3), |i| i.0);
        upsert(&mut items, ("c", 4), |i| i.0);
        assert_eq!(items, vec![("a", 1), ("b", 3), ("c", 4)]);
    }
}
