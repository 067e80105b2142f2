//! Free-drag pointer handling for floating elements.
//!
//! A `Draggable` is bound to one `FloatingElement` for its whole life. While a
//! drag is active it consumes every mouse event, wherever the pointer is, so a
//! fast pointer leaving the element does not drop the drag.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::constants::DRAG_CLICK_SLOP;
use crate::element::{Cursor, FloatingElement, Positioning};
use crate::layout::rect_contains;
use crate::zorder::ZOrderArbiter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragOptions {
    /// Explicit z-order priority. Falls back to the element's data priority,
    /// then 0.
    pub priority: Option<i32>,
    /// Only start drags from the element's handle rectangle.
    pub use_handle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Ignored,
    Started,
    Moved { dx: i32, dy: i32 },
    /// The drag finished. `moved` is false when the pointer never travelled
    /// past the click slop, i.e. the interaction was a click.
    Ended { moved: bool },
}

impl DragOutcome {
    pub fn handled(self) -> bool {
        !matches!(self, DragOutcome::Ignored)
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    last_column: u16,
    last_row: u16,
    travelled: u32,
}

#[derive(Debug, Clone)]
pub struct Draggable {
    priority: i32,
    use_handle: bool,
    bound: bool,
    state: Option<DragState>,
}

impl Draggable {
    /// Bind drag behavior to `element`.
    ///
    /// A statically positioned element is switched to absolute positioning at
    /// its current laid-out location, and the element is raised once so the
    /// initial stacking order is deterministic.
    pub fn bind(
        element: &mut FloatingElement,
        options: DragOptions,
        arbiter: &mut ZOrderArbiter,
    ) -> Self {
        let priority = options
            .priority
            .or(element.data_priority())
            .unwrap_or(0);
        if element.positioning() == Positioning::Static {
            let rect = element.layout_rect();
            element.set_positioning(Positioning::Absolute);
            element.set_left(Some(rect.x as i32));
            element.set_top(Some(rect.y as i32));
        }
        element.set_cursor(Cursor::Grab);
        arbiter.bring_to_front(Some(element), priority);
        Self {
            priority,
            use_handle: options.use_handle,
            bound: true,
            state: None,
        }
    }

    /// Tear down the behavior. Any drag in flight is abandoned and later
    /// events are ignored.
    pub fn unbind(&mut self, element: &mut FloatingElement) {
        if self.state.take().is_some() {
            element.set_pointer_capture(false);
        }
        element.set_cursor(Cursor::Default);
        self.bound = false;
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn handle_mouse(
        &mut self,
        mouse: &MouseEvent,
        element: &mut FloatingElement,
        arbiter: &mut ZOrderArbiter,
    ) -> DragOutcome {
        if !self.bound {
            return DragOutcome::Ignored;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.hits_handle(element, mouse.column, mouse.row) {
                    return DragOutcome::Ignored;
                }
                arbiter.bring_to_front(Some(&mut *element), self.priority);
                element.set_pointer_capture(true);
                element.set_cursor(Cursor::Grabbing);
                self.state = Some(DragState {
                    last_column: mouse.column,
                    last_row: mouse.row,
                    travelled: 0,
                });
                DragOutcome::Started
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                let Some(state) = self.state.as_mut() else {
                    return DragOutcome::Ignored;
                };
                let dx = mouse.column as i32 - state.last_column as i32;
                let dy = mouse.row as i32 - state.last_row as i32;
                state.last_column = mouse.column;
                state.last_row = mouse.row;
                state.travelled = state
                    .travelled
                    .saturating_add(dx.unsigned_abs() + dy.unsigned_abs());
                let current = element.effective_rect();
                let left = element.left().unwrap_or(current.x);
                let top = element.top().unwrap_or(current.y);
                element.set_positioning(Positioning::Absolute);
                element.set_left(Some(left + dx));
                element.set_top(Some(top + dy));
                DragOutcome::Moved { dx, dy }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(state) = self.state.take() else {
                    return DragOutcome::Ignored;
                };
                element.set_pointer_capture(false);
                element.set_cursor(Cursor::Grab);
                DragOutcome::Ended {
                    moved: state.travelled > DRAG_CLICK_SLOP as u32,
                }
            }
            _ => {
                if self.state.is_some() {
                    DragOutcome::Moved { dx: 0, dy: 0 }
                } else {
                    DragOutcome::Ignored
                }
            }
        }
    }

    fn hits_handle(&self, element: &FloatingElement, column: u16, row: u16) -> bool {
        let target = if self.use_handle {
            match element.handle() {
                Some(handle) => handle,
                None => return false,
            }
        } else {
            element.visible_rect()
        };
        rect_contains(target, column, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Stacked;
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn bind_forces_absolute_and_raises_once() {
        let mut arbiter = ZOrderArbiter::new();
        let mut el = FloatingElement::new(Rect::new(5, 6, 10, 2));
        let drag = Draggable::bind(&mut el, DragOptions::default(), &mut arbiter);
        assert_eq!(el.positioning(), Positioning::Absolute);
        assert_eq!((el.left(), el.top()), (Some(5), Some(6)));
        assert_eq!(el.cursor(), Cursor::Grab);
        assert_eq!(arbiter.counter(), 1);
        assert_eq!(drag.priority(), 0);
    }

    #[test]
    fn priority_resolution_order() {
        let mut arbiter = ZOrderArbiter::new();
        let mut el = FloatingElement::new(Rect::new(0, 0, 4, 1)).with_data_priority(2);
        let from_attr = Draggable::bind(&mut el, DragOptions::default(), &mut arbiter);
        assert_eq!(from_attr.priority(), 2);
        let explicit = Draggable::bind(
            &mut el,
            DragOptions {
                priority: Some(7),
                use_handle: false,
            },
            &mut arbiter,
        );
        assert_eq!(explicit.priority(), 7);
    }

    #[test]
    fn drag_moves_by_pointer_delta() {
        let mut arbiter = ZOrderArbiter::new();
        let mut el = FloatingElement::new(Rect::new(10, 10, 8, 2));
        let mut drag = Draggable::bind(&mut el, DragOptions::default(), &mut arbiter);

        let started = drag.handle_mouse(
            &mouse(MouseEventKind::Down(MouseButton::Left), 12, 10),
            &mut el,
            &mut arbiter,
        );
        assert_eq!(started, DragOutcome::Started);
        assert!(el.pointer_captured());
        assert_eq!(el.cursor(), Cursor::Grabbing);

        drag.handle_mouse(
            &mouse(MouseEventKind::Drag(MouseButton::Left), 15, 8),
            &mut el,
            &mut arbiter,
        );
        // Far outside the element: still tracked.
        drag.handle_mouse(
            &mouse(MouseEventKind::Drag(MouseButton::Left), 40, 20),
            &mut el,
            &mut arbiter,
        );
        assert_eq!((el.left(), el.top()), (Some(38), Some(20)));

        let ended = drag.handle_mouse(
            &mouse(MouseEventKind::Up(MouseButton::Left), 40, 20),
            &mut el,
            &mut arbiter,
        );
        assert_eq!(ended, DragOutcome::Ended { moved: true });
        assert!(!el.pointer_captured());
        assert_eq!(el.cursor(), Cursor::Grab);
    }

    #[test]
    fn press_without_travel_is_a_click() {
        let mut arbiter = ZOrderArbiter::new();
        let mut el = FloatingElement::new(Rect::new(0, 0, 8, 2));
        let mut drag = Draggable::bind(&mut el, DragOptions::default(), &mut arbiter);
        drag.handle_mouse(
            &mouse(MouseEventKind::Down(MouseButton::Left), 1, 1),
            &mut el,
            &mut arbiter,
        );
        let ended = drag.handle_mouse(
            &mouse(MouseEventKind::Up(MouseButton::Left), 1, 1),
            &mut el,
            &mut arbiter,
        );
        assert_eq!(ended, DragOutcome::Ended { moved: false });
    }

    #[test]
    fn handle_restricts_where_drags_start() {
        let mut arbiter = ZOrderArbiter::new();
        let mut el = FloatingElement::new(Rect::new(0, 0, 10, 5));
        el.set_handle(Some(Rect::new(0, 0, 10, 1)));
        let mut drag = Draggable::bind(
            &mut el,
            DragOptions {
                priority: None,
                use_handle: true,
            },
            &mut arbiter,
        );
        let body = drag.handle_mouse(
            &mouse(MouseEventKind::Down(MouseButton::Left), 3, 3),
            &mut el,
            &mut arbiter,
        );
        assert_eq!(body, DragOutcome::Ignored);
        let header = drag.handle_mouse(
            &mouse(MouseEventKind::Down(MouseButton::Left), 3, 0),
            &mut el,
            &mut arbiter,
        );
        assert_eq!(header, DragOutcome::Started);
    }

    #[test]
    fn pointer_down_brings_to_front() {
        let mut arbiter = ZOrderArbiter::new();
        let mut a = FloatingElement::new(Rect::new(0, 0, 4, 1));
        let mut b = FloatingElement::new(Rect::new(0, 0, 4, 1));
        let mut drag_a = Draggable::bind(&mut a, DragOptions::default(), &mut arbiter);
        let _drag_b = Draggable::bind(&mut b, DragOptions::default(), &mut arbiter);
        assert!(b.z_index() > a.z_index());
        drag_a.handle_mouse(
            &mouse(MouseEventKind::Down(MouseButton::Left), 0, 0),
            &mut a,
            &mut arbiter,
        );
        assert!(a.z_index() > b.z_index());
    }

    #[test]
    fn unbind_mid_drag_stops_processing() {
        let mut arbiter = ZOrderArbiter::new();
        let mut el = FloatingElement::new(Rect::new(0, 0, 8, 2));
        let mut drag = Draggable::bind(&mut el, DragOptions::default(), &mut arbiter);
        drag.handle_mouse(
            &mouse(MouseEventKind::Down(MouseButton::Left), 1, 1),
            &mut el,
            &mut arbiter,
        );
        drag.unbind(&mut el);
        assert!(!el.pointer_captured());
        let outcome = drag.handle_mouse(
            &mouse(MouseEventKind::Drag(MouseButton::Left), 9, 9),
            &mut el,
            &mut arbiter,
        );
        assert_eq!(outcome, DragOutcome::Ignored);
        assert_eq!((el.left(), el.top()), (Some(0), Some(0)));
    }
}
