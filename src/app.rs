//! Application shell: the forum panel with corner-docked floating widgets on
//! top of it.

use chrono::{DateTime, Utc};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Paragraph;

use crate::components::{
    Component, CountdownPill, FaqBubble, FloatingWidget, ForumAction, ForumPanel,
};
use crate::config::AppConfig;
use crate::drag::DragOutcome;
use crate::faq::FaqIndex;
use crate::forum::{ForumStore, NewPost};
use crate::layout::{Corner, CornerRegistry, hit_test_topmost};
use crate::log_buffer::global_log;
use crate::theme;
use crate::ui::{UiFrame, truncate_to_width};
use crate::zorder::ZOrderArbiter;

const COUNTDOWN_PRIORITY: i32 = 0;
const FAQ_PRIORITY: i32 = 1;
const KEY_HINT: &str = "n post · r reply · u upvote · R reload · ? help · q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidgetId {
    Countdown,
    Faq,
}

pub struct App {
    config: AppConfig,
    store: ForumStore,
    registry: CornerRegistry<WidgetId>,
    arbiter: ZOrderArbiter,
    countdown: FloatingWidget<WidgetId, CountdownPill>,
    faq: FloatingWidget<WidgetId, FaqBubble>,
    forum: ForumPanel,
    viewport: Rect,
    active_drag: Option<WidgetId>,
    quit: bool,
}

impl App {
    /// Build the shell over an initialized store. `viewport` is the full
    /// terminal area.
    pub fn new(config: AppConfig, store: ForumStore, viewport: Rect) -> Self {
        let mut registry = CornerRegistry::with_gap(config.stack_gap);
        let mut arbiter = ZOrderArbiter::new();
        let bounds = body_area(viewport);
        let countdown = FloatingWidget::mount(
            WidgetId::Countdown,
            CountdownPill::new(config.event_title.clone(), config.event_start),
            Corner::BottomRight,
            COUNTDOWN_PRIORITY,
            &mut registry,
            &mut arbiter,
            bounds,
        );
        let faq = FloatingWidget::mount(
            WidgetId::Faq,
            FaqBubble::new(FaqIndex::default_entries()),
            Corner::BottomRight,
            FAQ_PRIORITY,
            &mut registry,
            &mut arbiter,
            bounds,
        );
        let forum = ForumPanel::new(config.event_title.clone(), config.username.clone());
        let mut app = Self {
            config,
            store,
            registry,
            arbiter,
            countdown,
            faq,
            forum,
            viewport,
            active_drag: None,
            quit: false,
        };
        let expired = app.store.cleanup_expired();
        if expired > 0 {
            tracing::info!(expired, "dropped expired forum posts");
        }
        app.refresh_forum();
        app
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn store(&self) -> &ForumStore {
        &self.store
    }

    pub fn registry(&self) -> &CornerRegistry<WidgetId> {
        &self.registry
    }

    pub fn forum(&self) -> &ForumPanel {
        &self.forum
    }

    pub fn faq_expanded(&self) -> bool {
        self.faq.content().expanded()
    }

    pub fn widget_rect(&self, id: WidgetId) -> Rect {
        match id {
            WidgetId::Countdown => self.countdown.rect(),
            WidgetId::Faq => self.faq.rect(),
        }
    }

    pub fn widget_z(&self, id: WidgetId) -> i64 {
        match id {
            WidgetId::Countdown => self.countdown.z_index(),
            WidgetId::Faq => self.faq.z_index(),
        }
    }

    /// Returns true when the event changed something worth redrawing.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Resize(width, height) => {
                self.resize(Rect::new(0, 0, *width, *height));
                true
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Key(key) => self.handle_key(event, key),
            _ => false,
        }
    }

    /// Clock driven work: pick up posts written by other instances and move
    /// the countdown along.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.store.reload_if_changed() {
            self.refresh_forum();
        }
        self.countdown.content_mut().tick(now);
        self.sync_widgets();
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        if area != self.viewport {
            self.resize(area);
        }
        let body = body_area(area);
        let forum_focused = !self.faq_expanded();
        self.forum.render(frame, body, forum_focused);

        let status = Rect {
            y: area.y.saturating_add(body.height),
            height: area.height.saturating_sub(body.height),
            ..area
        };
        let alert = global_log().and_then(|log| log.last_alert());
        let fg = if alert.is_some() {
            theme::error_fg()
        } else {
            theme::status_fg()
        };
        let text = alert.unwrap_or_else(|| KEY_HINT.to_string());
        frame.render_widget(
            Paragraph::new(truncate_to_width(&text, status.width as usize))
                .style(Style::default().bg(theme::status_bg()).fg(fg)),
            status,
        );

        self.sync_widgets();
        if self.countdown.z_index() <= self.faq.z_index() {
            self.countdown.render(frame);
            self.faq.render(frame);
        } else {
            self.faq.render(frame);
            self.countdown.render(frame);
        }
    }

    /// Detach the floating widgets from the registry.
    pub fn shutdown(&mut self) {
        self.countdown.unmount(&mut self.registry);
        self.faq.unmount(&mut self.registry);
        tracing::debug!("widgets unmounted");
    }

    fn bounds(&self) -> Rect {
        body_area(self.viewport)
    }

    fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.registry.viewport_resized();
        self.sync_widgets();
    }

    fn sync_widgets(&mut self) {
        let bounds = self.bounds();
        // First pass reports heights, second docks against settled offsets.
        for _ in 0..2 {
            self.countdown.sync(&mut self.registry, bounds);
            self.faq.sync(&mut self.registry, bounds);
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> bool {
        let target = match self.active_drag {
            Some(id) => Some(id),
            None if matches!(mouse.kind, MouseEventKind::Down(_)) => hit_test_topmost(
                mouse.column,
                mouse.row,
                [WidgetId::Countdown, WidgetId::Faq]
                    .into_iter()
                    .map(|id| (id, self.widget_rect(id), self.widget_z(id))),
            ),
            None => None,
        };
        let Some(id) = target else {
            return self.scroll_forum(mouse);
        };
        let bounds = self.bounds();
        let outcome = match id {
            WidgetId::Countdown => {
                self.countdown
                    .handle_mouse(mouse, &mut self.registry, &mut self.arbiter, bounds)
            }
            WidgetId::Faq => {
                self.faq
                    .handle_mouse(mouse, &mut self.registry, &mut self.arbiter, bounds)
            }
        };
        match outcome {
            DragOutcome::Started => self.active_drag = Some(id),
            DragOutcome::Ended { moved } => {
                self.active_drag = None;
                if moved {
                    tracing::debug!(widget = ?id, corner = %self.widget_corner(id), "widget docked");
                }
                self.sync_widgets();
            }
            DragOutcome::Moved { .. } | DragOutcome::Ignored => {}
        }
        outcome.handled()
    }

    fn widget_corner(&self, id: WidgetId) -> Corner {
        match id {
            WidgetId::Countdown => self.countdown.corner(),
            WidgetId::Faq => self.faq.corner(),
        }
    }

    fn scroll_forum(&mut self, mouse: &MouseEvent) -> bool {
        let code = match mouse.kind {
            MouseEventKind::ScrollUp => KeyCode::Up,
            MouseEventKind::ScrollDown => KeyCode::Down,
            _ => return false,
        };
        self.forum.handle_key(code, KeyModifiers::NONE);
        true
    }

    fn handle_key(&mut self, event: &Event, key: &KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return true;
        }
        if self.faq_expanded() {
            if self.faq.content_mut().handle_event(event) {
                self.sync_widgets();
                return true;
            }
            return false;
        }
        if !self.forum.is_composing() {
            match key.code {
                KeyCode::Char('q') => {
                    self.quit = true;
                    return true;
                }
                KeyCode::Char('?') => {
                    self.faq.content_mut().set_expanded(true);
                    self.sync_widgets();
                    return true;
                }
                _ => {}
            }
        }
        if let Some(action) = self.forum.handle_key(key.code, key.modifiers) {
            self.apply(action);
        }
        true
    }

    fn apply(&mut self, action: ForumAction) {
        match action {
            ForumAction::Submit { parent, text } => {
                let post = NewPost::new(
                    self.config.event_id.clone(),
                    self.config.username.clone(),
                    text,
                );
                let saved = match parent.as_deref() {
                    Some(parent_id) => self.store.add_reply(parent_id, post, None),
                    None => self.store.add_post(post, None),
                };
                if saved {
                    self.forum.set_notice("Saved", false);
                } else {
                    self.forum
                        .set_notice("Could not save the post, see the log", true);
                }
            }
            ForumAction::ToggleUpvote(id) => {
                match self.store.toggle_upvote(&id, &self.config.username) {
                    Some(true) => self.forum.set_notice("Upvoted", false),
                    Some(false) => self.forum.set_notice("Upvote removed", false),
                    None => self.forum.set_notice("Could not update the upvote", true),
                }
            }
            ForumAction::Reload => {
                let changed = self.store.reload_if_changed();
                self.forum.set_notice(
                    if changed { "Reloaded" } else { "Up to date" },
                    false,
                );
            }
        }
        self.refresh_forum();
    }

    fn refresh_forum(&mut self) {
        let threads = self.store.get_posts_by_event(&self.config.event_id);
        self.forum.set_threads(&threads);
    }
}

/// Everything but the status line.
fn body_area(viewport: Rect) -> Rect {
    Rect {
        height: viewport.height.saturating_sub(1),
        ..viewport
    }
}
