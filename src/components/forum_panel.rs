//! Threaded forum view for one event.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::Component;
use crate::forum::{PostId, Thread};
use crate::theme;
use crate::ui::{UiFrame, truncate_to_width};

/// What the user asked the forum to do. The host applies it to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForumAction {
    Submit {
        parent: Option<PostId>,
        text: String,
    },
    ToggleUpvote(PostId),
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    depth: usize,
    id: PostId,
    username: String,
    text: String,
    upvotes: usize,
    upvoted: bool,
    image_bytes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Composer {
    parent: Option<PostId>,
    buffer: String,
}

#[derive(Debug, Clone)]
pub struct ForumPanel {
    title: String,
    username: String,
    rows: Vec<Row>,
    selected: usize,
    scroll: usize,
    composer: Option<Composer>,
    notice: Option<(String, bool)>,
}

impl ForumPanel {
    pub fn new(title: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            username: username.into(),
            rows: Vec::new(),
            selected: 0,
            scroll: 0,
            composer: None,
            notice: None,
        }
    }

    /// Replace the displayed threads, keeping the selection on the same node
    /// when it still exists.
    pub fn set_threads(&mut self, threads: &[Thread]) {
        let keep = self.selected_id().map(str::to_string);
        self.rows = threads
            .iter()
            .flat_map(|thread| thread.walk())
            .map(|(depth, node)| Row {
                depth,
                id: node.post.id.clone(),
                username: node.post.username.clone(),
                text: node.post.text.clone(),
                upvotes: node.post.upvote_count(),
                upvoted: node.post.upvoted_by(&self.username),
                image_bytes: node.image.as_ref().map(|image| image.len()),
            })
            .collect();
        self.selected = keep
            .and_then(|id| self.rows.iter().position(|row| row.id == id))
            .unwrap_or(0)
            .min(self.rows.len().saturating_sub(1));
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.rows.get(self.selected).map(|row| row.id.as_str())
    }

    pub fn is_composing(&self) -> bool {
        self.composer.is_some()
    }

    /// Show a one-line message under the thread list.
    pub fn set_notice(&mut self, message: impl Into<String>, is_error: bool) {
        self.notice = Some((message.into(), is_error));
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = (self.selected + delta as usize).min(self.rows.len() - 1);
        }
    }

    /// Handle a key and report the store operation it requests, if any.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<ForumAction> {
        if let Some(composer) = self.composer.as_mut() {
            match code {
                KeyCode::Esc => self.composer = None,
                KeyCode::Backspace => {
                    composer.buffer.pop();
                }
                KeyCode::Enter => {
                    let composer = self.composer.take()?;
                    let text = composer.buffer.trim().to_string();
                    if text.is_empty() {
                        return None;
                    }
                    return Some(ForumAction::Submit {
                        parent: composer.parent,
                        text,
                    });
                }
                KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                    composer.buffer.push(c);
                }
                _ => {}
            }
            return None;
        }
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.rows.len().saturating_sub(1),
            KeyCode::Char('n') => {
                self.composer = Some(Composer {
                    parent: None,
                    buffer: String::new(),
                });
            }
            KeyCode::Char('r') => {
                let parent = self.selected_id()?.to_string();
                self.composer = Some(Composer {
                    parent: Some(parent),
                    buffer: String::new(),
                });
            }
            KeyCode::Char('u') | KeyCode::Char('+') => {
                return self
                    .selected_id()
                    .map(|id| ForumAction::ToggleUpvote(id.to_string()));
            }
            KeyCode::Char('R') => return Some(ForumAction::Reload),
            _ => {}
        }
        None
    }

    fn row_line(&self, index: usize, row: &Row, width: usize) -> Line<'static> {
        let indent = "  ".repeat(row.depth);
        let marker = if row.depth == 0 { "●" } else { "↳" };
        let vote_style = if row.upvoted {
            Style::default().fg(theme::upvoted_fg())
        } else {
            Style::default().fg(theme::meta_fg())
        };
        let mut spans = vec![
            Span::raw(format!("{indent}{marker} ")),
            Span::styled(format!("▲{} ", row.upvotes), vote_style),
            Span::styled(
                format!("{}: ", row.username),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ];
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let mut text = row.text.clone();
        if let Some(bytes) = row.image_bytes {
            text.push_str(&format!(" [image {bytes} B]"));
        }
        spans.push(Span::raw(truncate_to_width(
            &text,
            width.saturating_sub(used),
        )));
        let mut line = Line::from(spans);
        if index == self.selected {
            line = line.style(Style::default().bg(theme::selection_bg()));
        }
        line
    }
}

impl Component for ForumPanel {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        let border = if focused {
            theme::accent()
        } else {
            theme::widget_border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" Forum · {} ", self.title));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let footer_rows = usize::from(self.composer.is_some()) + usize::from(self.notice.is_some());
        let list_height = (inner.height as usize).saturating_sub(footer_rows);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if list_height > 0 && self.selected >= self.scroll + list_height {
            self.scroll = self.selected + 1 - list_height;
        }

        let width = inner.width as usize;
        let mut lines: Vec<Line<'static>> = if self.rows.is_empty() {
            vec![Line::from(Span::styled(
                "No posts yet. Press n to start the conversation.",
                Style::default().fg(theme::meta_fg()),
            ))]
        } else {
            self.rows
                .iter()
                .enumerate()
                .skip(self.scroll)
                .take(list_height)
                .map(|(index, row)| self.row_line(index, row, width))
                .collect()
        };
        lines.truncate(list_height);
        while lines.len() < list_height {
            lines.push(Line::from(""));
        }
        if let Some((message, is_error)) = &self.notice {
            let fg = if *is_error {
                theme::error_fg()
            } else {
                theme::meta_fg()
            };
            lines.push(Line::from(Span::styled(
                truncate_to_width(message, width),
                Style::default().fg(fg),
            )));
        }
        if let Some(composer) = &self.composer {
            let label = if composer.parent.is_some() {
                "reply"
            } else {
                "post"
            };
            lines.push(Line::from(truncate_to_width(
                &format!("{label}> {}_", composer.buffer),
                width,
            )));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
