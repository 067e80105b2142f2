use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::{Component, FloatingContent};
use crate::faq::FaqIndex;
use crate::theme;
use crate::ui::{UiFrame, wrap_text};

const COLLAPSED_LABEL: &str = "? Ask us";
const EXPANDED_WIDTH: u16 = 46;
const MAX_SUGGESTIONS: usize = 3;

/// Help bubble: a one-line chip that opens into a small FAQ search panel.
#[derive(Debug, Clone)]
pub struct FaqBubble {
    index: FaqIndex,
    expanded: bool,
    query: String,
}

impl FaqBubble {
    pub fn new(index: FaqIndex) -> Self {
        Self {
            index,
            expanded: false,
            query: String::new(),
        }
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
        if !expanded {
            self.query.clear();
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Body lines for the expanded panel at the given inner width.
    fn body_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(format!("> {}_", self.query)),
            Line::from(""),
        ];
        if self.query.trim().is_empty() {
            lines.push(Line::from(Span::styled(
                "Type a question, Esc to close",
                Style::default().fg(theme::meta_fg()),
            )));
            return lines;
        }
        let matches = self.index.search(&self.query);
        let Some(best) = matches.first() else {
            lines.extend(
                wrap_text("No answer found. Try words like rsvp, refund or forum.", width)
                    .into_iter()
                    .map(Line::from),
            );
            return lines;
        };
        for row in wrap_text(&best.entry.question, width) {
            lines.push(Line::from(Span::styled(
                row,
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
        lines.extend(
            wrap_text(&best.entry.answer, width)
                .into_iter()
                .map(Line::from),
        );
        for other in matches.iter().skip(1).take(MAX_SUGGESTIONS - 1) {
            let label = format!("Also: {}", other.entry.question);
            lines.extend(
                wrap_text(&label, width)
                    .into_iter()
                    .map(|row| Line::from(Span::styled(row, Style::default().fg(theme::meta_fg())))),
            );
        }
        lines
    }
}

impl Component for FaqBubble {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        let border = if focused {
            theme::widget_border_grabbed()
        } else {
            theme::widget_border()
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(theme::widget_bg()));
        frame.render_widget(Clear, area);
        if !self.expanded {
            frame.render_widget(Paragraph::new(COLLAPSED_LABEL).block(block), area);
            return;
        }
        block = block.title(" FAQ ");
        let inner = block.inner(area);
        let lines = self.body_lines(inner.width as usize);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    /// Keys edit the query while the panel is open.
    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.expanded {
            return false;
        }
        let Event::Key(key) = event else {
            return false;
        };
        match key.code {
            KeyCode::Esc => {
                self.set_expanded(false);
                true
            }
            KeyCode::Backspace => {
                self.query.pop();
                true
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.push(c);
                true
            }
            _ => false,
        }
    }
}

impl FloatingContent for FaqBubble {
    fn size(&self, bounds: Rect) -> (u16, u16) {
        if !self.expanded {
            let width = (COLLAPSED_LABEL.chars().count() as u16).saturating_add(2);
            return (width.min(bounds.width), 3);
        }
        let width = EXPANDED_WIDTH.min(bounds.width);
        let inner = width.saturating_sub(2) as usize;
        let body = self.body_lines(inner).len() as u16;
        let height = body.saturating_add(2).min(bounds.height.max(3));
        (width, height)
    }

    fn on_click(&mut self) {
        let open = !self.expanded;
        self.set_expanded(open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn click_toggles_and_closing_clears_query() {
        let mut bubble = FaqBubble::new(FaqIndex::default_entries());
        assert!(!bubble.handle_event(&key(KeyCode::Char('x'))));
        bubble.on_click();
        assert!(bubble.expanded());
        for c in "rsvp".chars() {
            assert!(bubble.handle_event(&key(KeyCode::Char(c))));
        }
        bubble.handle_event(&key(KeyCode::Backspace));
        assert_eq!(bubble.query(), "rsv");
        bubble.handle_event(&key(KeyCode::Esc));
        assert!(!bubble.expanded());
        assert_eq!(bubble.query(), "");
    }

    #[test]
    fn height_grows_with_answer() {
        let bounds = Rect::new(0, 0, 100, 40);
        let mut bubble = FaqBubble::new(FaqIndex::default_entries());
        assert_eq!(bubble.size(bounds).1, 3);
        bubble.on_click();
        let empty = bubble.size(bounds).1;
        for c in "refund".chars() {
            bubble.handle_event(&key(KeyCode::Char(c)));
        }
        assert!(bubble.size(bounds).1 > empty);
    }
}
