//! Modal dialog frame
//!
//! Covers the screen with a backdrop target, draws the dialog box with its
//! confirm/cancel buttons and hands back the body area for the caller to fill.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::controls::{ModalAction, ModalHit, ModalState};
use crate::tui::hit_test::{ClickTarget, HitTestRegistry};
use crate::tui::theme::Theme;

/// Draw an open modal and return its body area. `None` when closed.
pub fn render_modal<T>(
    frame: &mut Frame,
    modal: &ModalState<T>,
    size: (u16, u16),
    hits: &mut HitTestRegistry,
) -> Option<Rect> {
    let config = modal.config()?;
    let screen = frame.area();
    hits.register(screen, ClickTarget::ModalBackdrop);

    // dim everything behind the dialog
    frame
        .buffer_mut()
        .set_style(screen, Style::default().fg(Theme::DIMMED));

    let area = centered_fixed(size.0, size.1, screen);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", config.title),
            Style::default()
                .fg(Theme::HEADER)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(Theme::ACCENT))
        .style(Style::default().bg(Theme::PANEL_BG));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    hits.register(area, ClickTarget::ModalBody);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    // Buttons, right aligned: [ confirm ]  [ cancel ]
    let confirm = format!("[ {} ]", modal.confirm_text());
    let cancel = format!("[ {} ]", modal.cancel_text());
    let confirm_w = confirm.width() as u16;
    let cancel_w = cancel.width() as u16;
    let row = chunks[1];
    let cancel_x = row.right().saturating_sub(cancel_w + 1);
    let confirm_x = cancel_x.saturating_sub(confirm_w + 2);

    let confirm_style = if modal.confirm_enabled() {
        Style::default()
            .fg(Theme::ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Theme::MUTED)
    };
    let buf = frame.buffer_mut();
    buf.set_string(confirm_x, row.y, &confirm, confirm_style);
    buf.set_string(cancel_x, row.y, &cancel, Style::default().fg(Theme::TEXT));
    hits.register(
        Rect::new(confirm_x, row.y, confirm_w, 1),
        ClickTarget::ModalConfirm,
    );
    hits.register(
        Rect::new(cancel_x, row.y, cancel_w, 1),
        ClickTarget::ModalCancel,
    );

    Some(chunks[0])
}

/// Plain text body, e.g. a delete confirmation.
pub fn render_message(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(Theme::TEXT))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Map a click while a modal is open onto the modal's regions.
pub fn classify(target: Option<&ClickTarget>) -> ModalHit {
    match target {
        Some(ClickTarget::ModalConfirm) => ModalHit::Confirm,
        Some(ClickTarget::ModalCancel) => ModalHit::Cancel,
        Some(ClickTarget::ModalBackdrop | ClickTarget::Tab(_) | ClickTarget::Row(_)) | None => {
            ModalHit::Backdrop
        }
        Some(_) => ModalHit::Body,
    }
}

/// Keyboard shortcuts of an open modal: Ctrl+S (or Enter when
/// `enter_confirms`) confirms, Esc cancels.
pub fn modal_key<T>(modal: &ModalState<T>, key: KeyEvent, enter_confirms: bool) -> ModalAction {
    match key.code {
        KeyCode::Esc => modal.hit(ModalHit::Cancel),
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            modal.hit(ModalHit::Confirm)
        }
        KeyCode::Enter if enter_confirms => modal.hit(ModalHit::Confirm),
        _ => ModalAction::None,
    }
}

/// Rect of `width` x `height` centered in `r`, shrunk to fit.
pub fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ModalConfig;
    use crate::tui::pages::PageId;

    #[test]
    fn test_classify_clicks() {
        assert_eq!(classify(None), ModalHit::Backdrop);
        assert_eq!(
            classify(Some(&ClickTarget::Tab(PageId::Agents))),
            ModalHit::Backdrop
        );
        assert_eq!(classify(Some(&ClickTarget::ModalBody)), ModalHit::Body);
        assert_eq!(
            classify(Some(&ClickTarget::Field {
                form: "import",
                index: 0
            })),
            ModalHit::Body
        );
        assert_eq!(classify(Some(&ClickTarget::ModalCancel)), ModalHit::Cancel);
    }

    #[test]
    fn test_enter_confirms_only_when_asked() {
        let mut modal = ModalState::default();
        modal.open(ModalConfig::confirm_delete("agent"), ());
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(modal_key(&modal, enter, true), ModalAction::Confirm);
        assert_eq!(modal_key(&modal, enter, false), ModalAction::None);

        modal.set_loading(true);
        assert_eq!(modal_key(&modal, enter, true), ModalAction::None);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(modal_key(&modal, esc, true), ModalAction::Cancel);
    }

    #[test]
    fn test_centered_fixed_fits() {
        let r = centered_fixed(40, 10, Rect::new(0, 0, 100, 30));
        assert_eq!(r, Rect::new(30, 10, 40, 10));
        let small = centered_fixed(40, 10, Rect::new(0, 0, 20, 5));
        assert_eq!(small, Rect::new(0, 0, 20, 5));
    }
}
