//! Host capabilities: the game-side services the orchestrator talks to.
//!
//! The gather pipeline never touches the game directly. It sends chat
//! commands through a [`CommandExecutor`], reports to the user through a
//! [`NotificationSink`], and reads the clock and the player's whereabouts
//! from a [`GameState`]. All three are trait objects shared across tasks,
//! so implementations must be `Send + Sync`.
//!
//! [`RecordingExecutor`] and [`RecordingSink`] keep everything they
//! receive in memory, which is what the integration tests and the dry-run
//! console use. [`SharedGameState`] holds a settable location and an
//! optional frozen clock.

use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use forager_types::PlayerLocation;

/// Sends a chat command to the game.
pub trait CommandExecutor: Send + Sync {
    /// Dispatch `command`. Returns `false` when the command was not
    /// recognized (for example, because the plugin that owns it is not
    /// installed).
    fn execute(&self, command: &str) -> bool;
}

/// Shows messages to the user.
pub trait NotificationSink: Send + Sync {
    /// Informational message.
    fn print(&self, message: &str);

    /// Error or warning message.
    fn print_error(&self, message: &str);
}

/// Read-only view of live game state.
pub trait GameState: Send + Sync {
    /// Where the player currently stands, if known.
    fn player_location(&self) -> Option<PlayerLocation>;

    /// The current real instant.
    fn now(&self) -> DateTime<Utc>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// Executor that records every command and rejects those starting with a
/// configured prefix.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    commands: Mutex<Vec<String>>,
    rejected_prefixes: Vec<String>,
}

impl RecordingExecutor {
    /// Executor that accepts every command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor that rejects commands starting with any of `prefixes`.
    pub fn rejecting<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: Mutex::new(Vec::new()),
            rejected_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Every command received so far, accepted or not.
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, command: &str) -> bool {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.to_owned());
        let accepted = !self
            .rejected_prefixes
            .iter()
            .any(|prefix| command.starts_with(prefix.as_str()));
        tracing::debug!(command, accepted, "command dispatched");
        accepted
    }
}

/// A message received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Sent through [`NotificationSink::print`].
    Info(String),
    /// Sent through [`NotificationSink::print_error`].
    Error(String),
}

impl Notice {
    /// The message text.
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }

    /// Whether this came through the error channel.
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Sink that keeps every message in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Only the error-channel messages.
    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|notice| match notice {
                Notice::Error(text) => Some(text),
                Notice::Info(_) => None,
            })
            .collect()
    }

    fn push(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

impl NotificationSink for RecordingSink {
    fn print(&self, message: &str) {
        self.push(Notice::Info(message.to_owned()));
    }

    fn print_error(&self, message: &str) {
        self.push(Notice::Error(message.to_owned()));
    }
}

/// Game state with a settable player location and an optional frozen
/// clock.
#[derive(Debug, Default)]
pub struct SharedGameState {
    location: RwLock<Option<PlayerLocation>>,
    frozen_at: RwLock<Option<DateTime<Utc>>>,
}

impl SharedGameState {
    /// State with no known location and a live clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the player's location.
    pub fn set_location(&self, location: Option<PlayerLocation>) {
        *self.location.write().unwrap_or_else(PoisonError::into_inner) = location;
    }

    /// Stop the clock at `instant`, or resume the live clock with `None`.
    pub fn freeze_time(&self, instant: Option<DateTime<Utc>>) {
        *self.frozen_at.write().unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl GameState for SharedGameState {
    fn player_location(&self) -> Option<PlayerLocation> {
        *self.location.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> DateTime<Utc> {
        self.frozen_at
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or_else(Utc::now)
    }
}
