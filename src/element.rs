//! Presentation state for a floating element.
//!
//! `FloatingElement` is the terminal counterpart of a positioned overlay node:
//! it carries the laid-out rectangle, optional inline `left`/`top` overrides,
//! a stacking value and the pointer affordances the drag behavior toggles.

use ratatui::layout::Rect;

use crate::layout::FloatRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    /// Placed by the host layout; inline offsets are ignored.
    #[default]
    Static,
    /// Placed by its inline `left`/`top` offsets.
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Grab,
    Grabbing,
}

/// Anything that can receive a stacking value.
pub trait Stacked {
    fn z_index(&self) -> i64;
    fn set_z_index(&mut self, z: i64);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingElement {
    layout_rect: Rect,
    positioning: Positioning,
    left: Option<i32>,
    top: Option<i32>,
    z_index: i64,
    cursor: Cursor,
    pointer_captured: bool,
    data_priority: Option<i32>,
    handle: Option<Rect>,
}

impl FloatingElement {
    pub fn new(layout_rect: Rect) -> Self {
        Self {
            layout_rect,
            positioning: Positioning::Static,
            left: None,
            top: None,
            z_index: 0,
            cursor: Cursor::Default,
            pointer_captured: false,
            data_priority: None,
            handle: None,
        }
    }

    /// Attach a priority attribute, consulted when no explicit drag priority
    /// is configured.
    pub fn with_data_priority(mut self, priority: i32) -> Self {
        self.data_priority = Some(priority);
        self
    }

    pub fn data_priority(&self) -> Option<i32> {
        self.data_priority
    }

    pub fn layout_rect(&self) -> Rect {
        self.layout_rect
    }

    /// Update the rectangle the host layout assigned to this element.
    pub fn set_layout_rect(&mut self, rect: Rect) {
        self.layout_rect = rect;
    }

    pub fn positioning(&self) -> Positioning {
        self.positioning
    }

    pub fn set_positioning(&mut self, positioning: Positioning) {
        self.positioning = positioning;
    }

    pub fn left(&self) -> Option<i32> {
        self.left
    }

    pub fn top(&self) -> Option<i32> {
        self.top
    }

    pub fn set_left(&mut self, left: Option<i32>) {
        self.left = left;
    }

    pub fn set_top(&mut self, top: Option<i32>) {
        self.top = top;
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    pub fn set_pointer_capture(&mut self, captured: bool) {
        self.pointer_captured = captured;
    }

    /// Restrict drag initiation to a sub-rectangle (e.g. a header row).
    pub fn set_handle(&mut self, handle: Option<Rect>) {
        self.handle = handle;
    }

    pub fn handle(&self) -> Option<Rect> {
        self.handle
    }

    /// The rectangle the element currently occupies, honoring inline offsets
    /// when absolutely positioned.
    pub fn effective_rect(&self) -> FloatRect {
        let rect = self.layout_rect;
        let (x, y) = match self.positioning {
            Positioning::Absolute => (
                self.left.unwrap_or(rect.x as i32),
                self.top.unwrap_or(rect.y as i32),
            ),
            Positioning::Static => (rect.x as i32, rect.y as i32),
        };
        FloatRect {
            x,
            y,
            width: rect.width,
            height: rect.height,
        }
    }

    /// Visible portion of the element, clamped to non-negative coordinates.
    pub fn visible_rect(&self) -> Rect {
        let fr = self.effective_rect();
        Rect {
            x: fr.x.max(0) as u16,
            y: fr.y.max(0) as u16,
            width: fr.width,
            height: fr.height,
        }
    }
}

impl Stacked for FloatingElement {
    fn z_index(&self) -> i64 {
        self.z_index
    }

    fn set_z_index(&mut self, z: i64) {
        self.z_index = z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_element_ignores_inline_offsets() {
        let mut el = FloatingElement::new(Rect::new(3, 4, 10, 2));
        el.set_left(Some(20));
        el.set_top(Some(1));
        assert_eq!(el.effective_rect().x, 3);
        el.set_positioning(Positioning::Absolute);
        assert_eq!(el.effective_rect().x, 20);
        assert_eq!(el.effective_rect().y, 1);
    }

    #[test]
    fn visible_rect_clamps_negative_origin() {
        let mut el = FloatingElement::new(Rect::new(0, 0, 8, 3));
        el.set_positioning(Positioning::Absolute);
        el.set_left(Some(-4));
        el.set_top(Some(2));
        assert_eq!(el.visible_rect(), Rect::new(0, 2, 8, 3));
    }
}
