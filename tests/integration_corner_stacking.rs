use std::cell::RefCell;
use std::rc::Rc;

use eventurer::element::{FloatingElement, Stacked};
use eventurer::layout::{Corner, CornerRegistry};
use eventurer::zorder::ZOrderArbiter;
use ratatui::layout::Rect;

#[test]
fn offsets_follow_priority_regardless_of_registration_order() {
    let mut reg: CornerRegistry<u8> = CornerRegistry::with_gap(1);
    // Registered out of order on purpose.
    for (id, priority, height) in [(3u8, 30, 2), (1, 10, 3), (2, 20, 4)] {
        reg.register(id, Corner::BottomLeft, priority);
        reg.observe_height(id, height);
    }
    assert_eq!(reg.stack(Corner::BottomLeft), vec![1, 2, 3]);
    assert_eq!(reg.offset_for(1), 0);
    assert_eq!(reg.offset_for(2), 3 + 1);
    assert_eq!(reg.offset_for(3), 3 + 1 + 4 + 1);
    assert_eq!(reg.offset_for(99), 0);
}

#[test]
fn corner_switch_moves_contribution() {
    let mut reg: CornerRegistry<&'static str> = CornerRegistry::with_gap(1);
    reg.register("a", Corner::BottomRight, 0);
    reg.observe_height("a", 3);
    reg.register("b", Corner::BottomRight, 5);
    reg.observe_height("b", 2);
    reg.register("c", Corner::TopLeft, 1);
    reg.observe_height("c", 4);
    assert_eq!(reg.offset_for("b"), 4);

    reg.update_corner("a", Corner::TopLeft);

    assert_eq!(reg.stack(Corner::BottomRight), vec!["b"]);
    assert_eq!(reg.offset_for("b"), 0);
    assert_eq!(reg.stack(Corner::TopLeft), vec!["a", "c"]);
    assert_eq!(reg.offset_for("a"), 0);
    assert_eq!(reg.offset_for("c"), 3 + 1);
}

#[test]
fn unregistered_subscriber_is_silenced() {
    let mut reg: CornerRegistry<u8> = CornerRegistry::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    reg.register(1, Corner::TopRight, 0);
    reg.observe_height(1, 2);
    reg.register(2, Corner::TopRight, 1);
    let sink = seen.clone();
    reg.subscribe(2, move |offset| sink.borrow_mut().push(offset));
    let before = seen.borrow().len();
    assert!(before >= 1);

    reg.unregister(2);
    assert_eq!(reg.offset_for(2), 0);
    let after_unregister = seen.borrow().len();

    reg.observe_height(1, 6);
    reg.viewport_resized();
    assert_eq!(seen.borrow().len(), after_unregister);
}

#[test]
fn higher_priority_band_always_on_top() {
    let mut arbiter = ZOrderArbiter::new();
    let mut low = FloatingElement::new(Rect::new(0, 0, 4, 2));
    let mut high = FloatingElement::new(Rect::new(0, 0, 4, 2));
    arbiter.bring_to_front(Some(&mut high), 2);
    for _ in 0..1_000 {
        arbiter.bring_to_front(Some(&mut low), 1);
    }
    assert!(high.z_index() > low.z_index());
    let previous = high.z_index();
    arbiter.bring_to_front(Some(&mut high), 2);
    assert!(high.z_index() > previous);
}

#[test]
fn anchored_rects_in_one_corner_never_overlap() {
    let bounds = Rect::new(0, 0, 60, 20);
    let mut reg: CornerRegistry<u8> = CornerRegistry::with_gap(1);
    let heights = [3u16, 1, 5];
    for (id, height) in heights.iter().enumerate() {
        reg.register(id as u8, Corner::TopRight, id as i32);
        reg.observe_height(id as u8, *height);
    }
    let rects: Vec<Rect> = heights
        .iter()
        .enumerate()
        .map(|(id, h)| Corner::TopRight.anchor(8, *h, bounds, reg.offset_for(id as u8)))
        .collect();
    for (i, a) in rects.iter().enumerate() {
        for b in rects.iter().skip(i + 1) {
            assert!(a.intersection(*b).is_empty(), "{a:?} overlaps {b:?}");
        }
    }
}
