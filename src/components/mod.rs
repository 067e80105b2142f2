use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod countdown;
pub mod faq_bubble;
pub mod floating;
pub mod forum_panel;

pub use countdown::CountdownPill;
pub use faq_bubble::FaqBubble;
pub use floating::{FloatingContent, FloatingWidget};
pub use forum_panel::{ForumAction, ForumPanel};

pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool);

    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }
}
