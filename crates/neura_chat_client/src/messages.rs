//! HTTP message types for the chat backend. Client ↔ server JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal the backend reports instead of a number for premium accounts.
const UNLIMITED: &str = "Unlimited";

/// Client → server: query parameters of the chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatQuery<'a> {
    pub msg: &'a str,
    pub user_id: &'a str,
    pub premium: bool,
}

impl<'a> ChatQuery<'a> {
    pub fn new(msg: &'a str, user_id: &'a str, premium: bool) -> Self {
        Self {
            msg,
            user_id,
            premium,
        }
    }
}

/// Client → server: body of the upgrade request.
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeRequest<'a> {
    pub user_id: &'a str,
}

/// Session hours left on the account, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawHours")]
pub enum RemainingHours {
    Hours(f64),
    Unlimited,
}

impl RemainingHours {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, RemainingHours::Unlimited)
    }
}

impl fmt::Display for RemainingHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainingHours::Hours(h) => write!(f, "{}", h),
            RemainingHours::Unlimited => f.write_str(UNLIMITED),
        }
    }
}

/// `remaining_hours` on the wire: a number, or a string for premium accounts.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawHours {
    Number(f64),
    Text(String),
}

impl TryFrom<RawHours> for RemainingHours {
    type Error = String;

    fn try_from(raw: RawHours) -> Result<Self, Self::Error> {
        match raw {
            RawHours::Number(h) => Ok(RemainingHours::Hours(h)),
            RawHours::Text(s) if s.eq_ignore_ascii_case(UNLIMITED) => {
                Ok(RemainingHours::Unlimited)
            }
            RawHours::Text(s) => Err(format!("expected hours or \"Unlimited\", got {:?}", s)),
        }
    }
}

/// Server → client: reply to a chat message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChatReply {
    pub reply: String,
    pub remaining_hours: RemainingHours,
}

/// Server → client: result of an upgrade request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpgradeReply {
    pub message: String,
    pub remaining_hours: RemainingHours,
}

/// Server → client: health check reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthReply {
    pub status: String,
    #[serde(default)]
    pub model: Option<String>,
}
