//! Command line configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;
use indoc::indoc;
use thiserror::Error;
use tracing::Level;

use crate::constants::FLOATING_STACK_GAP;
use crate::tracing_sub;

const AFTER_HELP: &str = indoc! {"
    Keys:
      j/k, arrows   select a post
      n             new post
      r             reply to the selected post
      u             toggle upvote
      R             reload posts written by other sessions
      ?             open the FAQ bubble (Esc closes)
      q, Ctrl-C     quit

    Drag the countdown or FAQ bubble with the mouse; it snaps to the
    nearest corner when released.
"};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "eventurer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Event discovery companion: forums, countdown and FAQ in your terminal",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Directory holding forum posts, images and the log file.
    #[arg(long = "data-dir", value_name = "DIR", default_value = ".eventurer")]
    pub data_dir: PathBuf,

    /// Name shown on posts and used for upvotes.
    #[arg(short = 'u', long = "user", value_name = "NAME", default_value = "guest")]
    pub username: String,

    /// Event whose forum is opened.
    #[arg(short = 'e', long = "event", value_name = "EVENT_ID", default_value = "demo")]
    pub event_id: String,

    /// Title shown for the event.
    #[arg(long = "event-title", value_name = "TITLE", default_value = "Demo event")]
    pub event_title: String,

    /// Start time of the bookmarked event (RFC 3339) for the countdown pill.
    #[arg(long = "event-start", value_name = "RFC3339")]
    pub event_start: Option<String>,

    /// Upper bound for the data directory size in bytes. Unlimited if unset.
    #[arg(long = "max-storage", value_name = "BYTES")]
    pub max_storage_bytes: Option<u64>,

    /// Rows between widgets stacked in the same corner.
    #[arg(long = "stack-gap", value_name = "ROWS", default_value_t = FLOATING_STACK_GAP)]
    pub stack_gap: u16,

    /// UI tick interval in milliseconds.
    #[arg(long = "tick-ms", value_name = "MS", default_value_t = 250)]
    pub tick_ms: u64,

    /// Log debug events too.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("event id must not be empty")]
    EmptyEventId,
    #[error("invalid event start {value:?}: {reason}")]
    InvalidEventStart { value: String, reason: String },
    #[error("stack gap must be at most 8 rows")]
    StackGapTooLarge,
    #[error("tick interval must be between 16 and 5000 ms")]
    TickOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub username: String,
    pub event_id: String,
    pub event_title: String,
    pub event_start: Option<DateTime<Utc>>,
    pub max_storage_bytes: Option<u64>,
    pub stack_gap: u16,
    pub tick: Duration,
    pub log_level: Level,
}

impl AppConfig {
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("eventurer.log")
    }
}

impl TryFrom<&Cli> for AppConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let username = cli.username.trim();
        if username.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        let event_id = cli.event_id.trim();
        if event_id.is_empty() {
            return Err(ConfigError::EmptyEventId);
        }
        if cli.stack_gap > 8 {
            return Err(ConfigError::StackGapTooLarge);
        }
        if !(16..=5000).contains(&cli.tick_ms) {
            return Err(ConfigError::TickOutOfRange);
        }
        let event_start = cli
            .event_start
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|err| ConfigError::InvalidEventStart {
                        value: value.to_string(),
                        reason: err.to_string(),
                    })
            })
            .transpose()?;
        Ok(Self {
            data_dir: cli.data_dir.clone(),
            username: username.to_string(),
            event_id: event_id.to_string(),
            event_title: cli.event_title.clone(),
            event_start,
            max_storage_bytes: cli.max_storage_bytes,
            stack_gap: cli.stack_gap,
            tick: Duration::from_millis(cli.tick_ms),
            log_level: tracing_sub::level_for(cli.verbose),
        })
    }
}
