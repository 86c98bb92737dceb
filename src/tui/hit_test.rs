//! Hit testing for clickable TUI elements
//!
//! Tracks rendered widget bounds and maps mouse coordinates to actions

use ratatui::layout::Rect;

use super::pages::PageId;
use crate::controls::Bounds;

/// Identifies a clickable element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClickTarget {
    /// Navigation tab in the header
    Tab(PageId),
    /// Row of the active page's table
    Row(usize),
    /// Form field (focus it; activates a select)
    Field { form: &'static str, index: usize },
    /// Row of an open select menu
    SelectOption {
        form: &'static str,
        field: usize,
        value: String,
    },
    /// The `×` on a multi-select chip
    ChipRemove {
        form: &'static str,
        field: usize,
        value: String,
    },
    /// Whole open select menu (keeps clicks on padding from closing it)
    SelectMenu { form: &'static str, field: usize },
    /// Everything behind an open modal
    ModalBackdrop,
    /// Modal dialog body
    ModalBody,
    ModalConfirm,
    ModalCancel,
}

/// Tracks clickable regions for hit testing
#[derive(Debug, Default)]
pub struct HitTestRegistry {
    /// Later registrations are on top
    regions: Vec<(Rect, ClickTarget)>,
}

impl HitTestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn register(&mut self, rect: Rect, target: ClickTarget) {
        self.regions.push((rect, target));
    }

    pub fn hit_test(&self, x: u16, y: u16) -> Option<&ClickTarget> {
        self.regions
            .iter()
            .rev()
            .find(|(rect, _)| to_bounds(*rect).contains(x as i32, y as i32))
            .map(|(_, target)| target)
    }
}

pub fn to_bounds(rect: Rect) -> Bounds {
    Bounds::new(
        rect.x as i32,
        rect.y as i32,
        rect.width as i32,
        rect.height as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topmost_region_wins() {
        let mut hits = HitTestRegistry::new();
        hits.register(Rect::new(0, 0, 40, 20), ClickTarget::ModalBody);
        hits.register(Rect::new(5, 5, 10, 1), ClickTarget::ModalConfirm);

        assert_eq!(hits.hit_test(6, 5), Some(&ClickTarget::ModalConfirm));
        assert_eq!(hits.hit_test(6, 6), Some(&ClickTarget::ModalBody));
        assert_eq!(hits.hit_test(40, 0), None);
    }
}
