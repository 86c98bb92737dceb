//! Toast stack in the top-right corner

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::controls::{Toast, ToastLevel};
use crate::tui::theme::Theme;

const MAX_WIDTH: u16 = 48;

pub struct ToastStack<'a> {
    toasts: &'a [Toast],
}

impl<'a> ToastStack<'a> {
    pub fn new(toasts: &'a [Toast]) -> Self {
        Self { toasts }
    }
}

fn level_color(level: ToastLevel) -> Color {
    match level {
        ToastLevel::Success => Theme::GREEN,
        ToastLevel::Info => Theme::ACCENT,
        ToastLevel::Warning => Theme::YELLOW,
        ToastLevel::Error => Theme::ERROR,
    }
}

impl Widget for ToastStack<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = MAX_WIDTH.min(area.width);
        let text_width = width.saturating_sub(4).max(1) as usize;
        let mut y = area.y + 1;

        // newest on top
        for toast in self.toasts.iter().rev() {
            let text = format!("{} {}", toast.level.icon(), toast.message);
            let lines = (text.width() / text_width + 1) as u16;
            let height = lines.min(4) + 2;
            if y + height > area.bottom() {
                break;
            }
            let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, height);
            let color = level_color(toast.level);

            Clear.render(rect, buf);
            Paragraph::new(Line::from(Span::styled(text, Style::default().fg(Theme::TEXT))))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color))
                        .style(Style::default().bg(Theme::PANEL_BG)),
                )
                .render(rect, buf);
            y += height;
        }
    }
}
