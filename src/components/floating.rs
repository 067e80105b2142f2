//! Corner-docked, draggable widget host.
//!
//! A `FloatingWidget` ties one piece of content to the shared corner registry
//! and z-order arbiter: it reports its height to the registry, follows the
//! stack offset the registry publishes, and snaps to the nearest corner when a
//! drag ends.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crossterm::event::MouseEvent;
use ratatui::layout::Rect;

use super::Component;
use crate::drag::{DragOptions, DragOutcome, Draggable};
use crate::element::{FloatingElement, Stacked};
use crate::layout::{Corner, CornerRegistry};
use crate::ui::UiFrame;
use crate::zorder::ZOrderArbiter;

pub trait FloatingContent: Component {
    /// Width and height the content wants inside `bounds`.
    fn size(&self, bounds: Rect) -> (u16, u16);

    /// Called for a press-and-release without drag travel.
    fn on_click(&mut self) {}
}

pub struct FloatingWidget<K: Copy + Eq + Ord + fmt::Debug, C> {
    id: K,
    content: C,
    element: FloatingElement,
    drag: Draggable,
    corner: Corner,
    offset: Rc<Cell<u16>>,
}

impl<K: Copy + Eq + Ord + fmt::Debug, C: FloatingContent> FloatingWidget<K, C> {
    pub fn mount(
        id: K,
        content: C,
        corner: Corner,
        priority: i32,
        registry: &mut CornerRegistry<K>,
        arbiter: &mut ZOrderArbiter,
        bounds: Rect,
    ) -> Self {
        let (width, height) = content.size(bounds);
        let mut element = FloatingElement::new(corner.anchor(width, height, bounds, 0))
            .with_data_priority(priority);
        let drag = Draggable::bind(&mut element, DragOptions::default(), arbiter);
        registry.register(id, corner, priority);
        registry.observe_height(id, height);
        let offset = Rc::new(Cell::new(0));
        let sink = offset.clone();
        registry.subscribe(id, move |value| sink.set(value));
        let mut widget = Self {
            id,
            content,
            element,
            drag,
            corner,
            offset,
        };
        widget.sync(registry, bounds);
        widget
    }

    /// Detach from the registry and drop the drag behavior.
    pub fn unmount(&mut self, registry: &mut CornerRegistry<K>) {
        self.drag.unbind(&mut self.element);
        registry.unregister(self.id);
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn offset(&self) -> u16 {
        self.offset.get()
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    pub fn z_index(&self) -> i64 {
        self.element.z_index()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn rect(&self) -> Rect {
        self.element.visible_rect()
    }

    /// Report the current size to the registry and, unless a drag is in
    /// progress, dock at the published stack offset.
    pub fn sync(&mut self, registry: &mut CornerRegistry<K>, bounds: Rect) {
        let (width, height) = self.content.size(bounds);
        registry.observe_height(self.id, height);
        if self.drag.is_dragging() {
            let current = self.element.layout_rect();
            self.element.set_layout_rect(Rect {
                width,
                height,
                ..current
            });
            return;
        }
        let rect = self
            .corner
            .anchor(width, height, bounds, self.offset.get());
        self.element.set_layout_rect(rect);
        self.element.set_left(Some(rect.x as i32));
        self.element.set_top(Some(rect.y as i32));
    }

    pub fn handle_mouse(
        &mut self,
        mouse: &MouseEvent,
        registry: &mut CornerRegistry<K>,
        arbiter: &mut ZOrderArbiter,
        bounds: Rect,
    ) -> DragOutcome {
        let outcome = self.drag.handle_mouse(mouse, &mut self.element, arbiter);
        match outcome {
            DragOutcome::Ended { moved: true } => {
                let corner = Corner::nearest(self.element.effective_rect(), bounds);
                if corner != self.corner {
                    registry.update_corner(self.id, corner);
                    self.corner = corner;
                }
                self.sync(registry, bounds);
            }
            DragOutcome::Ended { moved: false } => {
                self.content.on_click();
                self.sync(registry, bounds);
            }
            _ => {}
        }
        outcome
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let rect = self.rect();
        let grabbed = self.drag.is_dragging();
        self.content.render(frame, rect, grabbed);
    }
}
