//! Transcript entries and per-session state.

use neura_chat_client::RemainingHours;
use std::fmt;

/// Who a transcript entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "you",
            Sender::Bot => "bot",
        }
    }
}

/// One transcript entry. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Static identifier for the current user; fixed for the lifetime of a surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Indicators mirrored in the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Last value reported by the backend; `None` until the first response.
    pub remaining_hours: Option<RemainingHours>,
    pub voice_enabled: bool,
    pub background: String,
    pub language: String,
}

impl SessionState {
    /// Premium is implied by the backend reporting unlimited hours.
    pub fn premium(&self) -> bool {
        self.remaining_hours
            .map(|h| h.is_unlimited())
            .unwrap_or(false)
    }
}
