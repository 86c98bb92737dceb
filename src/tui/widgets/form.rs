//! Vertical forms made of text inputs and selects
//!
//! A form owns the selection of each of its selects: when a select reports a
//! change, the form adopts it and tells the page which field changed.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders},
    Frame,
};
use tui_textarea::{CursorMove, Input, TextArea};

use super::dropdown::{DropdownWidget, SelectControl};
use crate::controls::{
    menu_position, KeyResult, ScrollOffset, SelectKey, SelectState, Selection,
};
use crate::tui::hit_test::{to_bounds, ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;

pub enum FieldKind {
    Text(TextArea<'static>),
    /// Masked single-line input
    Secret(TextArea<'static>),
    Multiline(TextArea<'static>),
    Select(SelectState),
}

pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    area: Rect,
}

impl FormField {
    pub fn text(key: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(key, label, FieldKind::Text(build_input(value)))
    }

    pub fn secret(key: &'static str, label: &'static str, value: &str) -> Self {
        let mut input = build_input(value);
        input.set_mask_char('•');
        Self::new(key, label, FieldKind::Secret(input))
    }

    pub fn multiline(key: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(key, label, FieldKind::Multiline(build_input(value)))
    }

    pub fn select(key: &'static str, label: &'static str, select: SelectState) -> Self {
        Self::new(key, label, FieldKind::Select(select))
    }

    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            area: Rect::default(),
        }
    }

    fn height(&self) -> u16 {
        match self.kind {
            FieldKind::Multiline(_) => 7,
            _ => 3,
        }
    }
}

fn build_input(value: &str) -> TextArea<'static> {
    let lines: Vec<String> = if value.is_empty() {
        vec![String::new()]
    } else {
        value.lines().map(str::to_string).collect()
    };
    let mut input = TextArea::new(lines);
    input.set_cursor_line_style(Style::default());
    input.set_style(Style::default().fg(Theme::TEXT));
    input.move_cursor(CursorMove::Bottom);
    input.move_cursor(CursorMove::End);
    input
}

/// Result of routing input to a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Ignored,
    Consumed,
    /// A select adopted a new selection
    SelectChanged(&'static str),
}

pub struct FormState {
    pub id: &'static str,
    fields: Vec<FormField>,
    focus: usize,
}

impl FormState {
    pub fn new(id: &'static str, fields: Vec<FormField>) -> Self {
        Self {
            id,
            fields,
            focus: 0,
        }
    }

    fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.key == key)
    }

    /// Current text of an input, lines joined with `\n`.
    pub fn text(&self, key: &str) -> String {
        match self.field(key).map(|f| &f.kind) {
            Some(FieldKind::Text(t) | FieldKind::Secret(t) | FieldKind::Multiline(t)) => {
                t.lines().join("\n")
            }
            _ => String::new(),
        }
    }

    /// Trimmed text, `None` when blank.
    pub fn opt_text(&self, key: &str) -> Option<String> {
        let text = self.text(key);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn set_text(&mut self, key: &str, value: &str) {
        if let Some(field) = self.field_mut(key) {
            match &mut field.kind {
                FieldKind::Text(t) | FieldKind::Multiline(t) => *t = build_input(value),
                FieldKind::Secret(t) => {
                    *t = build_input(value);
                    t.set_mask_char('•');
                }
                FieldKind::Select(_) => {}
            }
        }
    }

    pub fn select(&self, key: &str) -> Option<&SelectState> {
        match self.field(key).map(|f| &f.kind) {
            Some(FieldKind::Select(s)) => Some(s),
            _ => None,
        }
    }

    pub fn select_mut(&mut self, key: &str) -> Option<&mut SelectState> {
        match self.field_mut(key).map(|f| &mut f.kind) {
            Some(FieldKind::Select(s)) => Some(s),
            _ => None,
        }
    }

    /// First selected value of a select.
    pub fn selected_value(&self, key: &str) -> Option<String> {
        self.select(key)
            .and_then(|s| s.selection().first_value().map(str::to_string))
    }

    pub fn selected_values(&self, key: &str) -> Vec<String> {
        self.select(key)
            .map(|s| s.selection().values())
            .unwrap_or_default()
    }

    pub fn set_label(&mut self, key: &str, label: &'static str) {
        if let Some(field) = self.field_mut(key) {
            field.label = label;
        }
    }

    /// Focus a select and open its menu.
    pub fn open_select(&mut self, key: &str) {
        self.focus_key(key);
        if let Some(idx) = self.fields.iter().position(|f| f.key == key) {
            self.toggle_select(idx);
        }
    }

    pub fn focused_key(&self) -> Option<&'static str> {
        self.fields.get(self.focus).map(|f| f.key)
    }

    pub fn focus_key(&mut self, key: &str) {
        if let Some(idx) = self.fields.iter().position(|f| f.key == key) {
            self.close_selects();
            self.focus = idx;
        }
    }

    pub fn focus_next(&mut self) {
        self.close_selects();
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        self.close_selects();
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    fn open_index(&self) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| matches!(&f.kind, FieldKind::Select(s) if s.is_open()))
    }

    pub fn has_open_select(&self) -> bool {
        self.open_index().is_some()
    }

    pub fn close_selects(&mut self) {
        for field in &mut self.fields {
            if let FieldKind::Select(s) = &mut field.kind {
                s.close();
            }
        }
    }

    fn toggle_select(&mut self, index: usize) {
        if let Some(field) = self.fields.get_mut(index) {
            let anchor = to_bounds(field.area);
            if let FieldKind::Select(s) = &mut field.kind {
                s.toggle_open(anchor, ScrollOffset::default());
            }
        }
    }

    fn adopt(&mut self, index: usize, selection: Option<Selection>) -> FormEvent {
        let Some(field) = self.fields.get_mut(index) else {
            return FormEvent::Consumed;
        };
        match (&mut field.kind, selection) {
            (FieldKind::Select(s), Some(selection)) => {
                s.set_selection(selection);
                FormEvent::SelectChanged(field.key)
            }
            _ => FormEvent::Consumed,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input routing
    // ─────────────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        if let Some(idx) = self.open_index() {
            let select_key = match key.code {
                KeyCode::Up => Some(SelectKey::Up),
                KeyCode::Down => Some(SelectKey::Down),
                KeyCode::Enter => Some(SelectKey::Enter),
                KeyCode::Esc => Some(SelectKey::Escape),
                KeyCode::Backspace => Some(SelectKey::Backspace),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(SelectKey::Char(c))
                }
                _ => None,
            };
            if let FieldKind::Select(s) = &mut self.fields[idx].kind {
                match select_key.map(|k| s.handle_key(k)) {
                    Some(KeyResult::Changed(selection)) => return self.adopt(idx, Some(selection)),
                    Some(KeyResult::Consumed) => return FormEvent::Consumed,
                    _ => {}
                }
            }
        }

        match key.code {
            KeyCode::Tab => {
                self.focus_next();
                return FormEvent::Consumed;
            }
            KeyCode::BackTab => {
                self.focus_prev();
                return FormEvent::Consumed;
            }
            _ => {}
        }

        let focus = self.focus;
        let Some(field) = self.fields.get_mut(focus) else {
            return FormEvent::Ignored;
        };
        match &mut field.kind {
            FieldKind::Select(s) => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down => {
                    self.toggle_select(focus);
                    FormEvent::Consumed
                }
                KeyCode::Backspace | KeyCode::Delete => {
                    let next = match s.selection() {
                        Selection::Multi(items) => items
                            .last()
                            .and_then(|last| s.remove_chip(&last.value)),
                        Selection::Single(Some(_)) => Some(Selection::Single(None)),
                        Selection::Single(None) => None,
                    };
                    self.adopt(focus, next)
                }
                _ => FormEvent::Ignored,
            },
            FieldKind::Text(t) | FieldKind::Secret(t) => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Up | KeyCode::Down => FormEvent::Ignored,
                _ if key.modifiers.contains(KeyModifiers::CONTROL) => FormEvent::Ignored,
                _ => {
                    t.input(Input::from(key));
                    FormEvent::Consumed
                }
            },
            FieldKind::Multiline(t) => match key.code {
                KeyCode::Esc => FormEvent::Ignored,
                _ if key.modifiers.contains(KeyModifiers::CONTROL) => FormEvent::Ignored,
                _ => {
                    t.input(Input::from(key));
                    FormEvent::Consumed
                }
            },
        }
    }

    /// Close an open select when the pointer went down outside of it.
    pub fn pointer_down(&mut self, target: Option<&ClickTarget>) {
        let Some(idx) = self.open_index() else {
            return;
        };
        let inside = match target {
            Some(ClickTarget::Field { form, index }) => *form == self.id && *index == idx,
            Some(
                ClickTarget::SelectOption { form, field, .. }
                | ClickTarget::SelectMenu { form, field }
                | ClickTarget::ChipRemove { form, field, .. },
            ) => *form == self.id && *field == idx,
            _ => false,
        };
        if !inside {
            if let FieldKind::Select(s) = &mut self.fields[idx].kind {
                s.pointer_down_outside();
            }
        }
    }

    pub fn handle_click(&mut self, target: &ClickTarget) -> FormEvent {
        match target {
            ClickTarget::Field { form, index } if *form == self.id => {
                if *index < self.fields.len() {
                    if self.focus != *index {
                        self.close_selects();
                    }
                    self.focus = *index;
                    if matches!(self.fields[*index].kind, FieldKind::Select(_)) {
                        self.toggle_select(*index);
                    }
                }
                FormEvent::Consumed
            }
            ClickTarget::SelectOption { form, field, value } if *form == self.id => {
                let next = match self.fields.get_mut(*field).map(|f| &mut f.kind) {
                    Some(FieldKind::Select(s)) => s.choose_value(value),
                    _ => None,
                };
                self.adopt(*field, next)
            }
            ClickTarget::ChipRemove { form, field, value } if *form == self.id => {
                let next = match self.fields.get(*field).map(|f| &f.kind) {
                    Some(FieldKind::Select(s)) => s.remove_chip(value),
                    _ => None,
                };
                self.adopt(*field, next)
            }
            ClickTarget::SelectMenu { form, .. } if *form == self.id => FormEvent::Consumed,
            _ => FormEvent::Ignored,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    pub fn render(&mut self, frame: &mut Frame, area: Rect, hits: &mut HitTestRegistry) {
        // first field index so the focused field is visible
        let mut start = 0;
        while start < self.focus {
            let needed: u16 = self.fields[start..=self.focus]
                .iter()
                .map(FormField::height)
                .sum();
            if needed <= area.height {
                break;
            }
            start += 1;
        }

        let mut y = area.y;
        for (idx, field) in self.fields.iter_mut().enumerate() {
            if idx < start || y + field.height() > area.bottom() {
                field.area = Rect::default();
                continue;
            }
            let rect = Rect::new(area.x, y, area.width, field.height());
            y += field.height();
            field.area = rect;

            let focused = idx == self.focus;
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", field.label))
                .title_style(if focused {
                    Style::default().fg(Theme::ACCENT).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Theme::MUTED)
                })
                .border_style(Style::default().fg(if focused {
                    Theme::ACCENT
                } else {
                    Theme::BORDER
                }));
            let inner = block.inner(rect);
            frame.render_widget(block, rect);
            hits.register(
                rect,
                ClickTarget::Field {
                    form: self.id,
                    index: idx,
                },
            );

            match &mut field.kind {
                FieldKind::Text(t) | FieldKind::Secret(t) | FieldKind::Multiline(t) => {
                    t.set_cursor_style(if focused {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    });
                    frame.render_widget(&*t, inner);
                }
                FieldKind::Select(s) => {
                    SelectControl::new(s, self.id, idx).render(inner, frame.buffer_mut(), hits);
                }
            }
        }
    }

    /// Draw the open menu, if any. Call after everything else.
    pub fn render_overlay(
        &self,
        frame: &mut Frame,
        hits: &mut HitTestRegistry,
        mouse_pos: Option<(u16, u16)>,
    ) {
        let Some(idx) = self.open_index() else {
            return;
        };
        let field = &self.fields[idx];
        let FieldKind::Select(select) = &field.kind else {
            return;
        };

        let pos = select
            .menu_position()
            .unwrap_or_else(|| menu_position(to_bounds(field.area), ScrollOffset::default()));
        let widget = DropdownWidget::new(select, self.id, idx).mouse_pos(mouse_pos);

        let screen = frame.area();
        let height = widget.height();
        let mut top = pos.top.max(0) as u16;
        if top + height > screen.bottom() {
            // no room below: open upwards
            top = field.area.y.saturating_sub(height);
        }
        let left = (pos.left.max(0) as u16).min(screen.right().saturating_sub(1));
        let width = (pos.width.max(10) as u16).min(screen.right() - left);
        let area = Rect::new(left, top, width, height).intersection(screen);

        widget.render(area, frame.buffer_mut(), hits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{SelectConfig, SelectOption};
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn form() -> FormState {
        let select = SelectState::new(
            SelectConfig::multi("Tools"),
            vec![
                SelectOption::new("t1", "Lookup"),
                SelectOption::new("t2", "Booking"),
            ],
        );
        FormState::new(
            "test",
            vec![
                FormField::text("name", "Name", "Front"),
                FormField::select("tools", "Tools", select),
            ],
        )
    }

    #[test]
    fn test_typing_into_text_field() {
        let mut form = form();
        assert_eq!(form.handle_key(key(KeyCode::Char('!'))), FormEvent::Consumed);
        assert_eq!(form.text("name"), "Front!");
        assert_eq!(form.opt_text("missing"), None);
    }

    #[test]
    fn test_select_opens_and_adopts_choice() {
        let mut form = form();
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focused_key(), Some("tools"));

        form.handle_key(key(KeyCode::Enter));
        assert!(form.has_open_select());
        form.handle_key(key(KeyCode::Down));
        assert_eq!(
            form.handle_key(key(KeyCode::Enter)),
            FormEvent::SelectChanged("tools")
        );
        assert_eq!(form.selected_values("tools"), vec!["t1"]);
        assert!(form.has_open_select());

        form.handle_key(key(KeyCode::Esc));
        assert!(!form.has_open_select());

        assert_eq!(
            form.handle_key(key(KeyCode::Backspace)),
            FormEvent::SelectChanged("tools")
        );
        assert!(form.selected_values("tools").is_empty());
    }

    #[test]
    fn test_click_outside_closes_menu() {
        let mut form = form();
        form.handle_click(&ClickTarget::Field {
            form: "test",
            index: 1,
        });
        assert!(form.has_open_select());

        form.pointer_down(Some(&ClickTarget::SelectMenu {
            form: "test",
            field: 1,
        }));
        assert!(form.has_open_select());

        form.pointer_down(None);
        assert!(!form.has_open_select());
    }

    #[test]
    fn test_chip_click_removes_without_opening() {
        let mut form = form();
        form.select_mut("tools")
            .unwrap()
            .set_selected_values(&["t1", "t2"]);
        let event = form.handle_click(&ClickTarget::ChipRemove {
            form: "test",
            field: 1,
            value: "t1".to_string(),
        });
        assert_eq!(event, FormEvent::SelectChanged("tools"));
        assert_eq!(form.selected_values("tools"), vec!["t2"]);
        assert!(!form.has_open_select());
    }
}
