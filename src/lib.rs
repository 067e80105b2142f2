//! Terminal companion for an event discovery app: a nested per-event forum
//! with draggable, corner-docked floating widgets (countdown pill and FAQ
//! bubble) drawn on top.

pub mod app;
pub mod components;
pub mod config;
pub mod constants;
pub mod drag;
pub mod drivers;
pub mod element;
pub mod event_loop;
pub mod faq;
pub mod forum;
pub mod layout;
pub mod log_buffer;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod zorder;
