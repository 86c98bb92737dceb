//! Select control and its dropdown menu
//!
//! The closed control shows the placeholder, the chosen label, or one chip
//! per chosen option with a `×` remove target. The menu is drawn last, on top
//! of everything, at the position the select computed when it opened.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::controls::select::{ControlDisplay, SelectState, NO_OPTIONS};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;

/// Most rows a menu shows before scrolling.
const MAX_MENU_ROWS: u16 = 8;

/// The closed, single-line part of a select
pub struct SelectControl<'a> {
    select: &'a SelectState,
    form: &'static str,
    field: usize,
}

impl<'a> SelectControl<'a> {
    pub fn new(select: &'a SelectState, form: &'static str, field: usize) -> Self {
        Self {
            select,
            form,
            field,
        }
    }

    pub fn render(self, area: Rect, buf: &mut Buffer, hits: &mut HitTestRegistry) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let arrow = if self.select.is_open() { "▴" } else { "▾" };
        let text_width = area.width.saturating_sub(2);

        match self.select.display() {
            ControlDisplay::Placeholder(text) => {
                buf.set_stringn(
                    area.x,
                    area.y,
                    text,
                    text_width as usize,
                    Style::default().fg(Theme::MUTED),
                );
            }
            ControlDisplay::Single(option) => {
                buf.set_stringn(
                    area.x,
                    area.y,
                    option.display(),
                    text_width as usize,
                    Style::default().fg(Theme::TEXT),
                );
            }
            ControlDisplay::Chips(options) => {
                let mut x = area.x;
                let right = area.x + text_width;
                for option in options {
                    let label = format!(" {} ", option.display());
                    let width = label.width() as u16 + 2;
                    if x + width > right {
                        buf.set_string(x, area.y, "…", Style::default().fg(Theme::MUTED));
                        break;
                    }
                    let chip = Style::default().fg(Theme::TEXT).bg(Theme::SELECTION);
                    buf.set_string(x, area.y, &label, chip);
                    let close_x = x + label.width() as u16;
                    buf.set_string(close_x, area.y, "× ", chip.fg(Theme::YELLOW));
                    hits.register(
                        Rect::new(close_x, area.y, 1, 1),
                        ClickTarget::ChipRemove {
                            form: self.form,
                            field: self.field,
                            value: option.value.clone(),
                        },
                    );
                    x += width + 1;
                }
            }
        }

        buf.set_string(
            area.x + area.width.saturating_sub(1),
            area.y,
            arrow,
            Style::default().fg(Theme::ACCENT),
        );
    }
}

/// Floating menu for an open select
pub struct DropdownWidget<'a> {
    select: &'a SelectState,
    form: &'static str,
    field: usize,
    mouse_pos: Option<(u16, u16)>,
}

impl<'a> DropdownWidget<'a> {
    pub fn new(select: &'a SelectState, form: &'static str, field: usize) -> Self {
        Self {
            select,
            form,
            field,
            mouse_pos: None,
        }
    }

    pub fn mouse_pos(mut self, pos: Option<(u16, u16)>) -> Self {
        self.mouse_pos = pos;
        self
    }

    /// Rows needed: options (or the empty row), search line, borders.
    pub fn height(&self) -> u16 {
        let rows = (self.select.filtered().len() as u16).clamp(1, MAX_MENU_ROWS);
        let search = u16::from(self.select.config().is_searchable);
        rows + search + 2
    }

    pub fn render(self, area: Rect, buf: &mut Buffer, hits: &mut HitTestRegistry) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::ACCENT))
            .style(Style::default().bg(Theme::PANEL_BG));
        let inner = block.inner(area);
        block.render(area, buf);

        hits.register(
            area,
            ClickTarget::SelectMenu {
                form: self.form,
                field: self.field,
            },
        );

        let mut y = inner.y;
        if self.select.config().is_searchable && inner.height > 0 {
            let line = Line::from(vec![
                Span::styled("🔍 ", Style::default().fg(Theme::MUTED)),
                Span::styled(self.select.search(), Style::default().fg(Theme::TEXT)),
                Span::styled("▏", Style::default().fg(Theme::ACCENT)),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
            y += 1;
        }

        let filtered = self.select.filtered();
        if filtered.is_empty() {
            if y < inner.bottom() {
                buf.set_string(
                    inner.x + 1,
                    y,
                    NO_OPTIONS,
                    Style::default()
                        .fg(Theme::MUTED)
                        .add_modifier(Modifier::ITALIC),
                );
            }
            return;
        }

        let visible = inner.bottom().saturating_sub(y) as usize;
        // keep the highlighted row on screen
        let start = match self.select.highlight() {
            Some(h) if h >= visible => h + 1 - visible,
            _ => 0,
        };

        for (idx, option) in filtered.iter().enumerate().skip(start).take(visible) {
            let row = Rect::new(inner.x, y, inner.width, 1);
            let highlighted = self.select.highlight() == Some(idx);
            let hovered = self
                .mouse_pos
                .is_some_and(|(mx, my)| my == y && mx >= row.x && mx < row.right());
            let chosen = self.select.selection().contains(&option.value);

            let prefix = if highlighted {
                "▶ "
            } else if chosen {
                "✓ "
            } else {
                "  "
            };
            let mut style = Style::default().fg(if chosen { Theme::GREEN } else { Theme::TEXT });
            if highlighted || hovered {
                style = style.bg(Theme::SELECTION);
            }

            buf.set_style(row, style);
            buf.set_stringn(
                row.x,
                y,
                format!("{}{}", prefix, option.display()),
                row.width as usize,
                style,
            );
            hits.register(
                row,
                ClickTarget::SelectOption {
                    form: self.form,
                    field: self.field,
                    value: option.value.clone(),
                },
            );
            y += 1;
        }
    }
}
