//! Main UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::hit_test::{ClickTarget, HitTestRegistry};
use super::pages::{PageId, Pages};
use super::theme::Theme;
use super::widgets::{StatusBar, ToastStack};
use crate::controls::ToastQueue;
use crate::models::User;

const BRAND: &str = " ☎ voxdesk ";

/// Everything one frame draws
pub struct View<'a> {
    pub pages: &'a mut Pages,
    pub active: PageId,
    pub toasts: &'a ToastQueue,
    pub user: Option<User>,
    pub hits: &'a mut HitTestRegistry,
    pub mouse_pos: Option<(u16, u16)>,
}

/// Render the entire UI
pub fn render(frame: &mut Frame, view: View) {
    view.hits.clear();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Tabs
            Constraint::Min(0),    // Page
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    render_tabs(frame, view.active, chunks[0], view.hits);

    let page = view.pages.get_mut(view.active);
    page.render(frame, chunks[1], view.hits, view.mouse_pos);

    let account = view
        .user
        .as_ref()
        .map(|u| format!("{} · {:.2} credits", u.display_name(), u.credits));
    let status = StatusBar::new(view.active.title(), page.hints())
        .account(account)
        .busy(page.is_busy());
    frame.render_widget(status, chunks[2]);

    frame.render_widget(ToastStack::new(view.toasts.visible()), chunks[1]);
}

/// Header tabs; each label is clickable.
fn render_tabs(frame: &mut Frame, active: PageId, area: Rect, hits: &mut HitTestRegistry) {
    let mut spans = vec![Span::styled(
        BRAND,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    let mut x = area.x + BRAND.width() as u16;

    for (i, page) in PageId::all().iter().enumerate() {
        let label = format!(" {} {} ", i + 1, page.title());
        let width = label.width() as u16;
        let style = if *page == active {
            Style::default()
                .fg(Color::Black)
                .bg(Theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::MUTED)
        };
        spans.push(Span::raw(" "));
        x += 1;
        if x + width <= area.right() {
            hits.register(Rect::new(x, area.y, width, 1), ClickTarget::Tab(*page));
        }
        spans.push(Span::styled(label, style));
        x += width;
    }

    let tabs = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Theme::BORDER)),
    );
    frame.render_widget(tabs, area);
}
