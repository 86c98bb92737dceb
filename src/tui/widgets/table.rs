//! Bordered resource table with clickable rows

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::controls::Spinner;
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;

pub struct ResourceTable<'a> {
    title: &'a str,
    header: &'a [&'a str],
    widths: &'a [Constraint],
    rows: Vec<Vec<String>>,
    empty: &'a str,
    loading: Option<&'a Spinner>,
    focused: bool,
}

impl<'a> ResourceTable<'a> {
    pub fn new(title: &'a str, header: &'a [&'a str], widths: &'a [Constraint]) -> Self {
        Self {
            title,
            header,
            widths,
            rows: Vec::new(),
            empty: "Nothing here yet",
            loading: None,
            focused: true,
        }
    }

    pub fn rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn empty(mut self, text: &'a str) -> Self {
        self.empty = text;
        self
    }

    /// Show a spinner in the title while a fetch is outstanding.
    pub fn loading(mut self, spinner: Option<&'a Spinner>) -> Self {
        self.loading = spinner;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn render(
        self,
        frame: &mut Frame,
        area: Rect,
        state: &mut TableState,
        hits: &mut HitTestRegistry,
    ) {
        let title = match self.loading {
            Some(spinner) => format!(" {} {} ", self.title, spinner.frame()),
            None => format!(" {} ({}) ", self.title, self.rows.len()),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                title,
                Style::default()
                    .fg(Theme::HEADER)
                    .add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(if self.focused {
                Theme::ACCENT
            } else {
                Theme::BORDER
            }));

        if self.rows.is_empty() {
            let text = if self.loading.is_some() { "Loading…" } else { self.empty };
            let empty = Paragraph::new(Span::styled(
                format!(" {}", text),
                Style::default()
                    .fg(Theme::MUTED)
                    .add_modifier(Modifier::ITALIC),
            ))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let row_count = self.rows.len();
        let header = Row::new(self.header.iter().map(|h| Cell::from(*h)))
            .style(Style::default().fg(Theme::MUTED).add_modifier(Modifier::BOLD));
        let rows = self
            .rows
            .into_iter()
            .map(|cells| Row::new(cells).style(Style::default().fg(Theme::TEXT)));

        let table = Table::new(rows, self.widths.to_vec())
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default()
                    .bg(Theme::SELECTION)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, state);

        // border + header line
        let first_row_y = area.y + 2;
        let visible = area.height.saturating_sub(3) as usize;
        for (i, idx) in (state.offset()..row_count).take(visible).enumerate() {
            hits.register(
                Rect::new(area.x + 1, first_row_y + i as u16, area.width.saturating_sub(2), 1),
                ClickTarget::Row(idx),
            );
        }
    }
}

/// Row index just past the last one on screen.
pub fn visible_end(state: &TableState, area_height: u16, len: usize) -> usize {
    (state.offset() + area_height.saturating_sub(3) as usize).min(len)
}

/// Arrow-key navigation. Returns true when the key moved the cursor.
pub fn navigate(state: &mut TableState, len: usize, code: KeyCode) -> bool {
    if len == 0 {
        state.select(None);
        return false;
    }
    let current = state.selected().unwrap_or(0).min(len - 1);
    let next = match code {
        KeyCode::Up | KeyCode::Char('k') => current.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => (current + 1).min(len - 1),
        KeyCode::PageUp => current.saturating_sub(10),
        KeyCode::PageDown => (current + 10).min(len - 1),
        KeyCode::Home => 0,
        KeyCode::End => len - 1,
        _ => return false,
    };
    state.select(Some(next));
    true
}

/// Keep the selection inside `0..len` after the list changed.
pub fn clamp_selection(state: &mut TableState, len: usize) {
    match (state.selected(), len) {
        (_, 0) => state.select(None),
        (None, _) => state.select(Some(0)),
        (Some(i), len) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_clamps() {
        let mut state = TableState::default();
        assert!(navigate(&mut state, 3, KeyCode::Down));
        assert_eq!(state.selected(), Some(1));
        navigate(&mut state, 3, KeyCode::End);
        navigate(&mut state, 3, KeyCode::Down);
        assert_eq!(state.selected(), Some(2));
        navigate(&mut state, 3, KeyCode::PageUp);
        assert_eq!(state.selected(), Some(0));
        assert!(!navigate(&mut state, 3, KeyCode::Char('x')));
    }

    #[test]
    fn test_clamp_after_removal() {
        let mut state = TableState::default().with_selected(Some(4));
        clamp_selection(&mut state, 2);
        assert_eq!(state.selected(), Some(1));
        clamp_selection(&mut state, 0);
        assert_eq!(state.selected(), None);
        clamp_selection(&mut state, 5);
        assert_eq!(state.selected(), Some(0));
    }
}
