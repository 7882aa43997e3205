//! Render interface between the surface and whatever displays it.

use neura_chat_client::RemainingHours;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::session::Message;

/// Display side of the widget. Calls arrive in transcript order.
pub trait Renderer: Send + Sync {
    /// Show a newly appended message and bring it into view.
    fn show_message(&self, message: &Message);

    fn show_remaining_hours(&self, hours: RemainingHours);

    /// Swap the background style token from `previous` to `next`.
    /// `previous` is empty for the initial theme, applied once at construction.
    fn apply_theme(&self, previous: &str, next: &str);
}

/// Line-oriented renderer for a terminal or any other writer.
pub struct TerminalRenderer<W> {
    out: Mutex<W>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, line: std::fmt::Arguments<'_>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!("failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn show_message(&self, message: &Message) {
        self.write_line(format_args!("{}> {}", message.sender.label(), message.text));
    }

    fn show_remaining_hours(&self, hours: RemainingHours) {
        self.write_line(format_args!("[hours remaining: {}]", hours));
    }

    fn apply_theme(&self, _previous: &str, next: &str) {
        self.write_line(format_args!("[background: {}]", next));
    }
}
