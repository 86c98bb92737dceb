//! Call logs: paginated history with an agent filter and a transcript pane

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, TableState, Wrap},
    Frame,
};

use super::{agent_options, detail_line, pane, refresh_options, Page, PageId};
use crate::controls::{Pager, SelectConfig, SelectOption, SelectState, Spinner};
use crate::models::{CallLog, CallLogQuery};
use crate::tui::context::Ctx;
use crate::tui::event::{ApiEvent, RequestKind};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;
use crate::tui::widgets::{table, FormEvent, FormField, FormState, ResourceTable};

const ALL_AGENTS: &str = "All agents";

pub struct CallLogsPage {
    pager: Pager<CallLog>,
    table: TableState,
    /// Agent the listed calls are filtered by
    agent_filter: Option<String>,
    filter: FormState,
    detail: Option<CallLog>,
    detail_loading: Option<Spinner>,
    spinner: Spinner,
    loaded: bool,
    /// Height of the table as last drawn, for load-more decisions
    table_height: u16,
}

fn filter_form() -> FormState {
    FormState::new(
        "call_filter",
        vec![FormField::select(
            "agent",
            "Agent",
            SelectState::new(
                SelectConfig::single(ALL_AGENTS).searchable(true).overlay(true),
                vec![SelectOption::new("", ALL_AGENTS)],
            ),
        )],
    )
}

impl CallLogsPage {
    pub fn new(page_size: usize) -> Self {
        Self {
            pager: Pager::new(page_size),
            table: TableState::default(),
            agent_filter: None,
            filter: filter_form(),
            detail: None,
            detail_loading: None,
            spinner: Spinner::new(),
            loaded: false,
            table_height: 0,
        }
    }

    /// Request the next page unless one is outstanding or the end was reached.
    fn fetch_next(&mut self, ctx: &mut Ctx) {
        let Some(request) = self.pager.begin_fetch() else {
            return;
        };
        self.spinner = Spinner::new();
        let query = CallLogQuery {
            page: request.page,
            page_size: self.pager.page_size(),
            agent_id: self.agent_filter.clone(),
        };
        tracing::debug!(page = request.page, agent = ?query.agent_id, "Fetching call logs");
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_call_logs(&query).await },
            move |logs| ApiEvent::CallPage { request, logs },
            RequestKind::CallPage(request),
        );
    }

    fn restart(&mut self, ctx: &mut Ctx) {
        self.pager.reset();
        self.table.select(None);
        self.detail = None;
        self.fetch_next(ctx);
    }

    fn maybe_load_more(&mut self, ctx: &mut Ctx) {
        let end = table::visible_end(&self.table, self.table_height, self.pager.items().len());
        let at_bottom = self
            .table
            .selected()
            .is_some_and(|i| i + 1 >= self.pager.items().len());
        if at_bottom && self.pager.should_fetch_on_scroll(end.max(self.pager.items().len())) {
            self.fetch_next(ctx);
        }
    }

    fn open_detail(&mut self, ctx: &mut Ctx) {
        let Some(log) = self.table.selected().and_then(|i| self.pager.items().get(i)) else {
            return;
        };
        // list rows may omit the transcript; fetch the full record
        self.detail = Some(log.clone());
        self.detail_loading = Some(Spinner::new());
        let id = log.id.clone();
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.get_call_log(&id).await },
            ApiEvent::CallDetail,
            RequestKind::Load,
        );
    }

    fn filter_changed(&mut self, ctx: &mut Ctx) {
        let agent = self.filter.selected_value("agent").filter(|a| !a.is_empty());
        if agent != self.agent_filter {
            self.agent_filter = agent;
            self.restart(ctx);
        }
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let title = match &self.detail_loading {
            Some(spinner) => format!("Call {}", spinner.frame()),
            None => "Call".to_string(),
        };
        let block = pane(title, false);
        let Some(log) = &self.detail else {
            let hint = Paragraph::new(Span::styled(
                " Select a call and press Enter",
                Style::default().fg(Theme::MUTED),
            ))
            .block(block);
            frame.render_widget(hint, area);
            return;
        };

        let mut lines = vec![
            detail_line("ID", log.id.clone()),
            detail_line(
                "Agent",
                log.agent_name
                    .clone()
                    .or_else(|| log.agent_id.clone())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            detail_line("Direction", log.direction.to_string()),
            detail_line("From", log.from_number.clone().unwrap_or_default()),
            detail_line("To", log.to_number.clone().unwrap_or_default()),
            detail_line("Status", log.status.clone()),
            detail_line("Duration", log.duration_display()),
            detail_line(
                "Cost",
                log.cost.map(|c| format!("{:.2}", c)).unwrap_or_else(|| "-".to_string()),
            ),
        ];
        if let Some(url) = &log.recording_url {
            lines.push(detail_line("Recording", url.clone()));
        }
        if let Some(summary) = &log.summary {
            lines.push(Line::from(""));
            lines.push(section("Summary"));
            lines.push(Line::from(summary.clone()));
        }
        lines.push(Line::from(""));
        lines.push(section("Transcript"));
        match &log.transcript {
            Some(transcript) => lines.extend(transcript.lines().map(transcript_line)),
            None => lines.push(Line::from(Span::styled(
                "No transcript",
                Style::default()
                    .fg(Theme::MUTED)
                    .add_modifier(Modifier::ITALIC),
            ))),
        }

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Theme::MUTED)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Color the speaker prefix of `Speaker: text` lines.
fn transcript_line(line: &str) -> Line<'static> {
    match line.split_once(':') {
        Some((speaker, text)) if !speaker.is_empty() && speaker.len() <= 16 => {
            let color = if speaker.eq_ignore_ascii_case("agent")
                || speaker.eq_ignore_ascii_case("assistant")
            {
                Theme::ACCENT
            } else {
                Theme::GREEN
            };
            Line::from(vec![
                Span::styled(
                    format!("{}:", speaker),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(text.to_string(), Style::default().fg(Theme::TEXT)),
            ])
        }
        _ => Line::from(Span::styled(line.to_string(), Style::default().fg(Theme::TEXT))),
    }
}

impl Page for CallLogsPage {
    fn enter(&mut self, ctx: &mut Ctx) {
        if !self.loaded {
            self.reload(ctx);
        }
    }

    fn reload(&mut self, ctx: &mut Ctx) {
        self.loaded = true;
        self.restart(ctx);
        let client = ctx.client.clone();
        ctx.spawn(
            async move { client.list_agents().await },
            ApiEvent::Agents,
            RequestKind::Load,
        );
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Ctx) -> bool {
        if self.filter.has_open_select() {
            if self.filter.handle_key(key) == FormEvent::SelectChanged("agent") {
                self.filter_changed(ctx);
            }
            return true;
        }

        if table::navigate(&mut self.table, self.pager.items().len(), key.code) {
            self.maybe_load_more(ctx);
            return true;
        }
        match key.code {
            KeyCode::Char('f') => {
                self.filter.open_select("agent");
                true
            }
            KeyCode::Enter => {
                self.open_detail(ctx);
                true
            }
            KeyCode::Esc if self.detail.is_some() => {
                self.detail = None;
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, target: Option<&ClickTarget>, ctx: &mut Ctx) {
        self.filter.pointer_down(target);
        match target {
            Some(ClickTarget::Row(idx)) => {
                self.table.select(Some(*idx));
                self.open_detail(ctx);
            }
            Some(target) => {
                if self.filter.handle_click(target) == FormEvent::SelectChanged("agent") {
                    self.filter_changed(ctx);
                }
            }
            None => {}
        }
    }

    fn handle_scroll(&mut self, down: bool, ctx: &mut Ctx) {
        let code = if down { KeyCode::Down } else { KeyCode::Up };
        if table::navigate(&mut self.table, self.pager.items().len(), code) && down {
            self.maybe_load_more(ctx);
        }
    }

    fn on_api(&mut self, event: &ApiEvent, _ctx: &mut Ctx) {
        match event {
            ApiEvent::CallPage { request, logs } => {
                // replies to requests made before a reload or filter change are stale
                if !self.pager.finish(*request, logs.clone()) {
                    tracing::debug!(page = request.page, "Dropping stale call-log page");
                    return;
                }
                table::clamp_selection(&mut self.table, self.pager.items().len());
            }
            ApiEvent::CallDetail(log) => {
                if self.detail.as_ref().is_some_and(|d| d.id == log.id) {
                    self.detail = Some(log.clone());
                }
                self.detail_loading = None;
            }
            ApiEvent::Agents(agents) => {
                let mut options = vec![SelectOption::new("", ALL_AGENTS)];
                options.extend(agent_options(agents));
                if let Some(select) = self.filter.select_mut("agent") {
                    refresh_options(select, options);
                }
            }
            ApiEvent::Failed {
                page: PageId::Calls,
                kind,
            } => match kind {
                RequestKind::CallPage(request) => {
                    self.pager.fail(*request);
                }
                RequestKind::Load => self.detail_loading = None,
                _ => {}
            },
            _ => {}
        }
    }

    fn is_capturing(&self) -> bool {
        self.filter.has_open_select()
    }

    fn is_busy(&self) -> bool {
        self.pager.is_loading() || self.detail_loading.is_some()
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        if self.filter.has_open_select() {
            &[("↑/↓", "highlight"), ("Enter", "choose"), ("Esc", "close")]
        } else {
            &[("f", "filter by agent"), ("Enter", "details"), ("↓", "load more")]
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
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(columns[0]);

        self.filter.render(frame, left[0], hits);

        let rows = self
            .pager
            .items()
            .iter()
            .map(|c| {
                vec![
                    c.started_at
                        .map(|t| t.format("%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                    c.direction.to_string(),
                    c.counterpart().to_string(),
                    c.duration_display(),
                    c.status.clone(),
                ]
            })
            .collect();
        let footer = if self.pager.enable_next() { "" } else { " (end)" };
        let title = format!("Calls{}", footer);
        ResourceTable::new(
            &title,
            &["STARTED", "DIR", "NUMBER", "TIME", "STATUS"],
            &[
                Constraint::Length(11),
                Constraint::Length(8),
                Constraint::Length(16),
                Constraint::Length(6),
                Constraint::Min(8),
            ],
        )
        .rows(rows)
        .empty("No calls")
        .loading(self.pager.is_loading().then_some(&self.spinner))
        .render(frame, left[1], &mut self.table, hits);
        self.table_height = left[1].height;

        self.render_detail(frame, columns[1]);
        self.filter.render_overlay(frame, hits, mouse_pos);
    }
}
