//! Neura chat widget: transcript, session indicators, and gesture handling
//! on top of the gateway client. The `neura-chat` binary drives it from a terminal.

pub mod commands;
pub mod render;
pub mod session;
pub mod surface;

pub use commands::{parse, Gesture};
pub use render::{Renderer, TerminalRenderer};
pub use session::{Message, Sender, SessionState, UserId};
pub use surface::{Dispatch, Surface, SurfaceError, FAILURE_TEXT};
