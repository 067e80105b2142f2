//! In-memory log ring shared between the tracing subscriber and the UI.
//!
//! While the terminal is in raw mode nothing may be written to stderr, so log
//! output is captured here, tailed by the status line and optionally mirrored
//! to a file.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

pub const DEFAULT_MAX_LINES: usize = 500;
static GLOBAL_LOG: OnceLock<LogHandle> = OnceLock::new();

pub fn set_global_log(handle: LogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_log() -> Option<LogHandle> {
    GLOBAL_LOG.get().cloned()
}

#[derive(Debug)]
struct LogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
    file: Option<File>,
}

impl LogBuffer {
    fn push_line(&mut self, line: String) {
        if let Some(file) = self.file.as_mut() {
            // A failing mirror must not take the UI down with it.
            let _ = writeln!(file, "{line}");
        }
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogHandle {
    inner: Arc<Mutex<LogBuffer>>,
}

impl LogHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogBuffer {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
                file: None,
            })),
        }
    }

    /// Also append every line to `path`.
    pub fn mirror_to_file(&self, path: &Path) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.file = Some(file);
        }
        Ok(())
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    pub fn last_line(&self) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|buffer| buffer.lines.back().cloned())
    }

    /// The newest line when it was logged at `WARN` or `ERROR`.
    pub fn last_alert(&self) -> Option<String> {
        self.last_line().filter(|line| is_alert(line))
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|buffer| buffer.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn writer(&self) -> LogWriter {
        LogWriter {
            handle: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// Formatted lines read `<timestamp> <LEVEL> <message>`.
fn is_alert(line: &str) -> bool {
    matches!(line.split_whitespace().nth(1), Some("WARN" | "ERROR"))
}

/// `io::Write` adapter splitting the byte stream into lines.
#[derive(Debug)]
pub struct LogWriter {
    handle: LogHandle,
    pending: Vec<u8>,
}

impl LogWriter {
    fn flush_pending(&mut self, force: bool) {
        let end = if force {
            self.pending.len()
        } else {
            match self.pending.iter().rposition(|b| *b == b'\n') {
                Some(pos) => pos + 1,
                None => return,
            }
        };
        let drained: Vec<u8> = self.pending.drain(..end).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n') {
            if !line.is_empty() {
                self.handle.push(line.to_string());
            }
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_capped() {
        let handle = LogHandle::new(3);
        for line in ["one", "two", "three", "four"] {
            handle.push(line);
        }
        assert_eq!(handle.lines(), vec!["two", "three", "four"]);
        assert_eq!(handle.last_line().as_deref(), Some("four"));
    }

    #[test]
    fn writer_splits_lines_and_flushes_partial() {
        let handle = LogHandle::new(10);
        let mut writer = handle.writer();
        writer.write_all(b"first line\nsecond line\npartial").unwrap();
        assert_eq!(handle.lines(), vec!["first line", "second line"]);
        writer.flush().unwrap();
        assert_eq!(handle.last_line().as_deref(), Some("partial"));
    }

    #[test]
    fn mirror_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let handle = LogHandle::new(10);
        handle.mirror_to_file(&path).unwrap();
        handle.push("hello");
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "hello\n");
    }

    #[test]
    fn only_warn_and_error_lines_are_alerts() {
        let handle = LogHandle::new(4);
        handle.push("2026-10-19T10:00:00Z  INFO eventurer started");
        assert!(handle.last_alert().is_none());
        handle.push("2026-10-19T10:00:01Z  WARN forum write rejected");
        assert!(handle.last_alert().unwrap().ends_with("forum write rejected"));
        handle.push("2026-10-19T10:00:02Z ERROR forum store init failed");
        assert!(handle.last_alert().is_some());
        handle.push("2026-10-19T10:00:03Z  INFO back to normal");
        assert!(handle.last_alert().is_none());
    }
}

