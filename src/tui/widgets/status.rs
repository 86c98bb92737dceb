//! Status bar widget
//!
//! Displays the page name, its keybind hints and the signed-in account.
//! Format: ` PAGE  │ hints... │ user · credits`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::tui::theme::Theme;

/// Status bar widget with page hints and account info
pub struct StatusBar<'a> {
    page: &'a str,
    hints: &'a [(&'a str, &'a str)],
    account: Option<String>,
    busy: bool,
}

impl<'a> StatusBar<'a> {
    pub fn new(page: &'a str, hints: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            page,
            hints,
            account: None,
            busy: false,
        }
    }

    /// Right-aligned account summary
    pub fn account(mut self, account: Option<String>) -> Self {
        self.account = account;
        self
    }

    /// Paint the page pill yellow while a request is outstanding
    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(Theme::BG));

        let separator_style = Style::default().fg(Theme::MUTED);
        let hint_style = Style::default().fg(Theme::MUTED);
        let pill = if self.busy { Theme::YELLOW } else { Theme::GREEN };

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.page.to_uppercase()),
                Style::default()
                    .fg(Color::Black)
                    .bg(pill)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", separator_style),
        ];

        let global = [("Ctrl+R", "reload"), ("Ctrl+Q", "quit")];
        for (i, (key, action)) in self.hints.iter().chain(global.iter()).enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", separator_style));
            }
            spans.push(Span::styled(format!("{}: {}", key, action), hint_style));
        }

        if let Some(account) = self.account {
            let left_width: usize = spans.iter().map(|s| s.content.width()).sum();
            let right = format!("{} ", account);
            let padding = (area.width as usize).saturating_sub(left_width + right.width());
            if padding > 0 {
                spans.push(Span::raw(" ".repeat(padding)));
                spans.push(Span::styled(right, Style::default().fg(Theme::HEADER)));
            }
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
