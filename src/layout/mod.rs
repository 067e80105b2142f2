pub mod corner;

pub use corner::{Corner, CornerRegistry};

use ratatui::prelude::Rect;

/// Signed floating rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }
}

impl From<Rect> for FloatRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x as i32,
            y: rect.y as i32,
            width: rect.width,
            height: rect.height,
        }
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

/// Topmost hit among `(id, rect, z)` triples; higher `z` wins.
pub fn hit_test_topmost<T: Copy>(
    column: u16,
    row: u16,
    candidates: impl IntoIterator<Item = (T, Rect, i64)>,
) -> Option<T> {
    candidates
        .into_iter()
        .filter(|(_, rect, _)| rect_contains(*rect, column, row))
        .max_by_key(|(_, _, z)| *z)
        .map(|(id, _, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_edge_cases() {
        let r = Rect {
            x: 0,
            y: 0,
            width: 0,
            height: 5,
        };
        assert!(!rect_contains(r, 0, 0));
        let r2 = Rect {
            x: 1,
            y: 1,
            width: 3,
            height: 3,
        };
        assert!(rect_contains(r2, 1, 1));
        assert!(!rect_contains(r2, 4, 1));
    }

    #[test]
    fn hit_test_prefers_highest_z() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(hit_test_topmost(6, 6, [(1u8, a, 5), (2u8, b, 3)]), Some(1));
        assert_eq!(hit_test_topmost(6, 6, [(1u8, a, 2), (2u8, b, 3)]), Some(2));
        assert_eq!(hit_test_topmost(1, 1, [(1u8, a, 2), (2u8, b, 3)]), Some(1));
        assert_eq!(hit_test_topmost(40, 40, [(1u8, a, 2)]), None);
    }

    #[test]
    fn float_rect_center_from_rect() {
        let fr = FloatRect::from(Rect::new(2, 4, 10, 6));
        assert_eq!(fr.center(), (7, 7));
    }
}
