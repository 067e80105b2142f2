use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::{Component, FloatingContent};
use crate::theme;
use crate::ui::{UiFrame, truncate_to_width};

/// Countdown to the next bookmarked event.
#[derive(Debug, Clone)]
pub struct CountdownPill {
    title: String,
    start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
}

impl CountdownPill {
    pub fn new(title: impl Into<String>, start: Option<DateTime<Utc>>) -> Self {
        Self {
            title: title.into(),
            start,
            now: Utc::now(),
        }
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn label(&self) -> String {
        let Some(start) = self.start else {
            return "No bookmarked events".to_string();
        };
        if start <= self.now {
            return format!("{}: event started", self.title);
        }
        let secs = (start - self.now).num_seconds();
        let (days, rem) = (secs / 86_400, secs % 86_400);
        let (hours, rem) = (rem / 3_600, rem % 3_600);
        let (minutes, seconds) = (rem / 60, rem % 60);
        if days > 0 {
            format!("{} in {days}d {hours:02}h {minutes:02}m", self.title)
        } else {
            format!(
                "{} in {hours:02}:{minutes:02}:{seconds:02}",
                self.title
            )
        }
    }
}

impl Component for CountdownPill {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        let border = if focused {
            theme::widget_border_grabbed()
        } else {
            theme::widget_border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(theme::widget_bg()));
        let inner = block.inner(area);
        let text = truncate_to_width(&self.label(), inner.width as usize);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

impl FloatingContent for CountdownPill {
    fn size(&self, bounds: Rect) -> (u16, u16) {
        let width = (self.label().chars().count() as u16).saturating_add(4);
        (width.min(bounds.width), 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn label_formats_remaining_time() {
        let mut pill = CountdownPill::new("Gig", Some(at(0) + Duration::seconds(90_061)));
        pill.tick(at(0));
        assert_eq!(pill.label(), "Gig in 1d 01h 01m");
        pill.tick(at(86_400));
        assert_eq!(pill.label(), "Gig in 01:01:01");
        pill.tick(at(100_000));
        assert_eq!(pill.label(), "Gig: event started");
    }

    #[test]
    fn no_bookmark_label_and_size() {
        let pill = CountdownPill::new("Gig", None);
        assert_eq!(pill.label(), "No bookmarked events");
        let (w, h) = pill.size(Rect::new(0, 0, 80, 24));
        assert_eq!((w, h), (24, 3));
        let (w, _) = pill.size(Rect::new(0, 0, 10, 24));
        assert_eq!(w, 10);
    }
}
