//! Corner stacking for floating widgets.
//!
//! Widgets anchored to the same viewport corner are stacked away from the
//! corner so they never overlap. Each corner keeps its own ordered list; the
//! lowest priority sits flush with the corner (offset 0) and every following
//! entry is pushed out by the height of its predecessors plus a fixed gap.
//!
//! Heights are not measured by the registry. Widgets report them through
//! [`CornerRegistry::observe_height`] once they know how tall they render, and
//! a changed height re-lays-out the corner straight away. Viewport resizes go
//! through [`CornerRegistry::viewport_resized`].

use std::collections::BTreeMap;
use std::fmt;

use ratatui::prelude::Rect;

use crate::constants::{FLOATING_EDGE_INSET, FLOATING_STACK_GAP};
use crate::layout::FloatRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }

    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    /// Corner whose quadrant of `bounds` holds the centre of `rect`.
    pub fn nearest(rect: FloatRect, bounds: Rect) -> Corner {
        let (cx, cy) = rect.center();
        let mid_x = bounds.x as i32 + bounds.width as i32 / 2;
        let mid_y = bounds.y as i32 + bounds.height as i32 / 2;
        match (cy < mid_y, cx < mid_x) {
            (true, true) => Corner::TopLeft,
            (true, false) => Corner::TopRight,
            (false, true) => Corner::BottomLeft,
            (false, false) => Corner::BottomRight,
        }
    }

    /// Place a `width` x `height` widget in this corner of `bounds`, pushed
    /// `offset` rows away from the corner's horizontal edge.
    pub fn anchor(self, width: u16, height: u16, bounds: Rect, offset: u16) -> Rect {
        let width = width.min(bounds.width);
        let height = height.min(bounds.height);
        let right = bounds.x.saturating_add(bounds.width);
        let bottom = bounds.y.saturating_add(bounds.height);
        let x = if self.is_left() {
            bounds.x.saturating_add(FLOATING_EDGE_INSET)
        } else {
            right
                .saturating_sub(width)
                .saturating_sub(FLOATING_EDGE_INSET)
                .max(bounds.x)
        };
        let y = if self.is_top() {
            bounds
                .y
                .saturating_add(FLOATING_EDGE_INSET)
                .saturating_add(offset)
        } else {
            bottom
                .saturating_sub(height)
                .saturating_sub(FLOATING_EDGE_INSET)
                .saturating_sub(offset)
                .max(bounds.y)
        };
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        };
        write!(f, "{}", s)
    }
}

pub type OffsetCallback = Box<dyn FnMut(u16)>;

#[derive(Debug, Clone, Copy)]
struct StackEntry<K> {
    id: K,
    priority: i32,
}

pub struct CornerRegistry<K: Copy + Eq + Ord + fmt::Debug> {
    corners: [Vec<StackEntry<K>>; 4],
    offsets: BTreeMap<K, u16>,
    heights: BTreeMap<K, u16>,
    subscribers: BTreeMap<K, OffsetCallback>,
    gap: u16,
}

impl<K: Copy + Eq + Ord + fmt::Debug> Default for CornerRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Ord + fmt::Debug> fmt::Debug for CornerRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CornerRegistry")
            .field("corners", &self.corners)
            .field("offsets", &self.offsets)
            .field("heights", &self.heights)
            .field("subscribers", &self.subscribers.keys().collect::<Vec<_>>())
            .field("gap", &self.gap)
            .finish()
    }
}

impl<K: Copy + Eq + Ord + fmt::Debug> CornerRegistry<K> {
    pub fn new() -> Self {
        Self::with_gap(FLOATING_STACK_GAP)
    }

    pub fn with_gap(gap: u16) -> Self {
        Self {
            corners: Default::default(),
            offsets: BTreeMap::new(),
            heights: BTreeMap::new(),
            subscribers: BTreeMap::new(),
            gap,
        }
    }

    pub fn gap(&self) -> u16 {
        self.gap
    }

    /// Add `id` to `corner`. Registering an id already present in that
    /// corner is a no-op; an id registered elsewhere is moved.
    pub fn register(&mut self, id: K, corner: Corner, priority: i32) {
        if let Some(current) = self.corner_of(id) {
            if current == corner {
                return;
            }
            if let Some(entry) = self.corners[current.index()]
                .iter_mut()
                .find(|entry| entry.id == id)
            {
                entry.priority = priority;
            }
            self.update_corner(id, corner);
            return;
        }
        self.corners[corner.index()].push(StackEntry { id, priority });
        tracing::debug!(?id, %corner, priority, "floating widget registered");
        self.layout_corner(corner);
    }

    /// Remove `id` from whichever corner holds it. Its subscriber receives a
    /// final offset of 0 and is then dropped.
    pub fn unregister(&mut self, id: K) {
        let Some(corner) = self.corner_of(id) else {
            return;
        };
        self.corners[corner.index()].retain(|entry| entry.id != id);
        self.offsets.remove(&id);
        self.heights.remove(&id);
        if let Some(mut callback) = self.subscribers.remove(&id) {
            callback(0);
        }
        tracing::debug!(?id, %corner, "floating widget unregistered");
        self.layout_corner(corner);
    }

    /// Move `id` to `new_corner`, re-laying-out both the origin and the
    /// destination corner.
    pub fn update_corner(&mut self, id: K, new_corner: Corner) {
        let Some(origin) = self.corner_of(id) else {
            return;
        };
        let list = &mut self.corners[origin.index()];
        let Some(pos) = list.iter().position(|entry| entry.id == id) else {
            return;
        };
        let entry = list.remove(pos);
        self.corners[new_corner.index()].push(entry);
        tracing::debug!(?id, from = %origin, to = %new_corner, "floating widget moved");
        self.layout_corner(origin);
        if origin != new_corner {
            self.layout_corner(new_corner);
        }
    }

    /// Size observer entry point: record the rendered height of `id` and
    /// re-lay-out its corner when it changed.
    pub fn observe_height(&mut self, id: K, height: u16) {
        let previous = self.heights.insert(id, height);
        if previous == Some(height) {
            return;
        }
        if let Some(corner) = self.corner_of(id) {
            self.layout_corner(corner);
        }
    }

    pub fn height_of(&self, id: K) -> u16 {
        self.heights.get(&id).copied().unwrap_or(0)
    }

    /// Last computed offset for `id`, or 0 when unknown.
    pub fn offset_for(&self, id: K) -> u16 {
        self.offsets.get(&id).copied().unwrap_or(0)
    }

    /// Register an offset listener for `id`; it is invoked right away with
    /// the currently known offset.
    pub fn subscribe<F>(&mut self, id: K, callback: F)
    where
        F: FnMut(u16) + 'static,
    {
        let mut callback: OffsetCallback = Box::new(callback);
        callback(self.offset_for(id));
        self.subscribers.insert(id, callback);
    }

    pub fn unsubscribe(&mut self, id: K) {
        self.subscribers.remove(&id);
    }

    pub fn corner_of(&self, id: K) -> Option<Corner> {
        Corner::ALL
            .into_iter()
            .find(|corner| self.corners[corner.index()].iter().any(|e| e.id == id))
    }

    /// Ids in `corner`, in stacking order (closest to the corner first).
    pub fn stack(&self, corner: Corner) -> Vec<K> {
        let mut entries = self.corners[corner.index()].clone();
        entries.sort_by_key(|entry| entry.priority);
        entries.into_iter().map(|entry| entry.id).collect()
    }

    /// Recompute a single corner on demand, e.g. after content changed size
    /// without going through `observe_height`.
    pub fn trigger_relayout(&mut self, corner: Corner) {
        self.layout_corner(corner);
    }

    pub fn relayout_all(&mut self) {
        for corner in Corner::ALL {
            self.layout_corner(corner);
        }
    }

    /// The viewport changed size; every corner is recomputed.
    pub fn viewport_resized(&mut self) {
        self.relayout_all();
    }

    fn layout_corner(&mut self, corner: Corner) {
        let list = &mut self.corners[corner.index()];
        // Stable: equal priorities keep registration order.
        list.sort_by_key(|entry| entry.priority);
        let mut running: u16 = 0;
        for entry in list.iter() {
            let offset = running;
            self.offsets.insert(entry.id, offset);
            if let Some(callback) = self.subscribers.get_mut(&entry.id) {
                callback(offset);
            }
            let height = self.heights.get(&entry.id).copied().unwrap_or(0);
            running = running.saturating_add(height).saturating_add(self.gap);
        }
        tracing::trace!(%corner, extent = running, "corner laid out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn offsets_accumulate_height_and_gap_by_priority() {
        let mut reg = CornerRegistry::with_gap(2);
        reg.register("chat", Corner::BottomRight, 5);
        reg.register("countdown", Corner::BottomRight, 1);
        reg.observe_height("chat", 4);
        reg.observe_height("countdown", 3);
        assert_eq!(reg.stack(Corner::BottomRight), vec!["countdown", "chat"]);
        assert_eq!(reg.offset_for("countdown"), 0);
        assert_eq!(reg.offset_for("chat"), 3 + 2);
    }

    #[test]
    fn unknown_id_has_zero_offset() {
        let reg: CornerRegistry<&str> = CornerRegistry::new();
        assert_eq!(reg.offset_for("nobody"), 0);
    }

    #[test]
    fn duplicate_register_in_same_corner_is_ignored() {
        let mut reg = CornerRegistry::new();
        reg.register("a", Corner::TopLeft, 0);
        reg.register("a", Corner::TopLeft, 9);
        assert_eq!(reg.stack(Corner::TopLeft), vec!["a"]);
    }

    #[test]
    fn register_elsewhere_moves_the_entry() {
        let mut reg = CornerRegistry::new();
        reg.register("a", Corner::TopLeft, 0);
        reg.register("a", Corner::BottomLeft, 0);
        assert!(reg.stack(Corner::TopLeft).is_empty());
        assert_eq!(reg.corner_of("a"), Some(Corner::BottomLeft));
    }

    #[test]
    fn equal_priorities_keep_registration_order() {
        let mut reg = CornerRegistry::with_gap(1);
        reg.register("first", Corner::TopRight, 0);
        reg.register("second", Corner::TopRight, 0);
        reg.observe_height("first", 2);
        assert_eq!(reg.offset_for("first"), 0);
        assert_eq!(reg.offset_for("second"), 3);
    }

    #[test]
    fn subscribe_fires_immediately_and_on_layout() {
        let mut reg = CornerRegistry::with_gap(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        reg.register("low", Corner::BottomLeft, 0);
        reg.register("high", Corner::BottomLeft, 1);
        let sink = seen.clone();
        reg.subscribe("high", move |offset| sink.borrow_mut().push(offset));
        assert_eq!(*seen.borrow(), vec![1]);
        reg.observe_height("low", 4);
        assert_eq!(seen.borrow().last().copied(), Some(5));
    }

    #[test]
    fn unregister_notifies_zero_then_goes_silent() {
        let mut reg = CornerRegistry::with_gap(1);
        let last = Rc::new(Cell::new(u16::MAX));
        let calls = Rc::new(Cell::new(0u32));
        reg.register("base", Corner::TopLeft, 0);
        reg.register("w", Corner::TopLeft, 1);
        reg.observe_height("base", 3);
        let (l, c) = (last.clone(), calls.clone());
        reg.subscribe("w", move |offset| {
            l.set(offset);
            c.set(c.get() + 1);
        });
        assert_eq!(last.get(), 4);
        reg.unregister("w");
        assert_eq!(last.get(), 0);
        assert_eq!(reg.offset_for("w"), 0);
        let calls_after = calls.get();
        reg.observe_height("base", 7);
        reg.relayout_all();
        assert_eq!(calls.get(), calls_after);
    }

    #[test]
    fn trigger_relayout_renotifies_subscribers() {
        let mut reg = CornerRegistry::new();
        let calls = Rc::new(Cell::new(0u32));
        reg.register("a", Corner::BottomRight, 0);
        reg.register("b", Corner::TopLeft, 0);
        let c = calls.clone();
        reg.subscribe("a", move |_| c.set(c.get() + 1));
        assert_eq!(calls.get(), 1);
        reg.trigger_relayout(Corner::BottomRight);
        assert_eq!(calls.get(), 2);
        reg.trigger_relayout(Corner::TopLeft);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn unsubscribed_entry_keeps_its_offset_current() {
        let mut reg = CornerRegistry::with_gap(1);
        let calls = Rc::new(Cell::new(0u32));
        reg.register("base", Corner::TopRight, 0);
        reg.register("w", Corner::TopRight, 1);
        let c = calls.clone();
        reg.subscribe("w", move |_| c.set(c.get() + 1));
        reg.unsubscribe("w");
        let before = calls.get();
        reg.observe_height("base", 5);
        reg.trigger_relayout(Corner::TopRight);
        assert_eq!(reg.offset_for("w"), 6);
        assert_eq!(calls.get(), before);
    }

    #[test]
    fn unchanged_height_does_not_relayout() {
        let mut reg = CornerRegistry::new();
        let calls = Rc::new(Cell::new(0u32));
        reg.register("a", Corner::TopLeft, 0);
        reg.observe_height("a", 2);
        let c = calls.clone();
        reg.subscribe("a", move |_| c.set(c.get() + 1));
        assert_eq!(calls.get(), 1);
        reg.observe_height("a", 2);
        assert_eq!(calls.get(), 1);
        reg.observe_height("a", 3);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn corner_switch_releases_old_stack() {
        let mut reg = CornerRegistry::with_gap(1);
        reg.register("a", Corner::BottomRight, 0);
        reg.register("b", Corner::BottomRight, 1);
        reg.register("c", Corner::TopLeft, 0);
        reg.observe_height("a", 2);
        reg.observe_height("c", 5);
        assert_eq!(reg.offset_for("b"), 3);

        reg.update_corner("a", Corner::TopLeft);
        assert_eq!(reg.offset_for("b"), 0);
        assert_eq!(reg.stack(Corner::TopLeft), vec!["c", "a"]);
        assert_eq!(reg.offset_for("a"), 6);
    }

    #[test]
    fn nearest_corner_by_quadrant() {
        let bounds = Rect::new(0, 0, 80, 24);
        let at = |x, y| FloatRect {
            x,
            y,
            width: 10,
            height: 2,
        };
        assert_eq!(Corner::nearest(at(1, 1), bounds), Corner::TopLeft);
        assert_eq!(Corner::nearest(at(60, 2), bounds), Corner::TopRight);
        assert_eq!(Corner::nearest(at(3, 20), bounds), Corner::BottomLeft);
        assert_eq!(Corner::nearest(at(70, 22), bounds), Corner::BottomRight);
    }

    #[test]
    fn anchor_pushes_away_from_corner_edge() {
        let bounds = Rect::new(0, 0, 80, 24);
        let top = Corner::TopRight.anchor(10, 2, bounds, 3);
        assert_eq!(top, Rect::new(69, 4, 10, 2));
        let bottom = Corner::BottomLeft.anchor(10, 2, bounds, 3);
        assert_eq!(bottom, Rect::new(1, 18, 10, 2));
    }
}
