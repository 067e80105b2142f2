//! Tracing subscriber setup.
//!
//! While the UI owns the terminal, formatted events go into a [`LogHandle`]
//! (tailed by the status line and mirrored to the log file). Without a handle
//! they go to stderr, which is what tests and early startup failures want.

use std::io::{self, Write};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::log_buffer::{LogHandle, LogWriter};

pub enum LogSink {
    Buffer(LogWriter),
    Stderr(io::Stderr),
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::Buffer(w) => w.write(buf),
            LogSink::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::Buffer(w) => w.flush(),
            LogSink::Stderr(s) => s.flush(),
        }
    }
}

/// Hands each event a sink bound to the handle chosen at setup.
#[derive(Clone, Debug, Default)]
pub struct LogMakeWriter {
    handle: Option<LogHandle>,
}

impl LogMakeWriter {
    pub fn new(handle: Option<LogHandle>) -> Self {
        Self { handle }
    }
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match &self.handle {
            Some(handle) => LogSink::Buffer(handle.writer()),
            None => LogSink::Stderr(io::stderr()),
        }
    }
}

/// `DEBUG` when verbose, `INFO` otherwise.
pub fn level_for(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}

/// Install the global subscriber. Returns false when one was already set.
pub fn init(level: Level, handle: Option<LogHandle>) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(LogMakeWriter::new(handle))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_land_in_the_handle_at_the_chosen_level() {
        let handle = LogHandle::new(16);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level_for(false))
            .with_writer(LogMakeWriter::new(Some(handle.clone())))
            .with_ansi(false)
            .with_target(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::info!("store ready");
        });
        let lines = handle.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("store ready"));
        assert!(handle.last_alert().is_none());

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level_for(true))
            .with_writer(LogMakeWriter::new(Some(handle.clone())))
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("disk nearly full");
        });
        let alert = handle.last_alert().unwrap();
        assert!(alert.contains("disk nearly full"));
    }
}
