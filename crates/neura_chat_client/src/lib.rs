//! Neura chat gateway client (config, HTTP contract, response parsing).
//! Used by the widget surface and the `neura-chat` binary.

pub mod client;
pub mod config;
pub mod messages;

pub use client::{Backend, GatewayClient, GatewayError};
pub use config::{default_config_path, Config, ConfigError, ServerSection, SessionSection, UiSection};
pub use messages::{ChatReply, HealthReply, RemainingHours, UpgradeReply};
