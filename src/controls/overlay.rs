//! Overlay menu positioning.
//!
//! A menu rendered on the top layer is placed from the bounds of the control
//! that opened it, so it stays anchored no matter how deeply that control is
//! nested.

/// Axis-aligned rectangle in cell (or pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Half-open containment test.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Scroll position of the surface the anchor lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOffset {
    pub x: i32,
    pub y: i32,
}

/// Where an overlay menu goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuPosition {
    pub top: i32,
    pub left: i32,
    pub width: i32,
}

impl MenuPosition {
    /// Bounds of the menu for a given rendered height.
    pub fn bounds(&self, height: i32) -> Bounds {
        Bounds::new(self.left, self.top, self.width, height)
    }
}

/// Place a menu directly under `anchor`, matching its width.
pub fn menu_position(anchor: Bounds, scroll: ScrollOffset) -> MenuPosition {
    MenuPosition {
        top: anchor.bottom() + scroll.y,
        left: anchor.x + scroll.x,
        width: anchor.width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_sits_under_anchor() {
        let anchor = Bounds::new(10, 4, 30, 3);
        let pos = menu_position(anchor, ScrollOffset::default());
        assert_eq!(
            pos,
            MenuPosition {
                top: 7,
                left: 10,
                width: 30
            }
        );
    }

    #[test]
    fn test_scroll_offsets_are_added() {
        let anchor = Bounds::new(2, 5, 12, 1);
        let pos = menu_position(anchor, ScrollOffset { x: 3, y: 40 });
        assert_eq!(pos.top, 46);
        assert_eq!(pos.left, 5);
        assert_eq!(pos.width, 12);
    }

    #[test]
    fn test_contains_is_half_open() {
        let b = Bounds::new(0, 0, 4, 2);
        assert!(b.contains(0, 0));
        assert!(b.contains(3, 1));
        assert!(!b.contains(4, 1));
        assert!(!b.contains(3, 2));
        assert!(!b.contains(-1, 0));
    }
}
