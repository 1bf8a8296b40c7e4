//! Reaction tokens (emoji) used as user-facing signals and confirmation answers.

use serde::{Deserialize, Serialize};

/// A single reaction emoji, compared by its exact text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionToken(pub String);

impl ReactionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Confirm / success marker.
    pub fn check() -> Self {
        Self::new(CHECK)
    }

    /// Cancel / failure marker.
    pub fn cross() -> Self {
        Self::new(CROSS)
    }

    /// "I did not understand that" marker.
    pub fn question() -> Self {
        Self::new(QUESTION)
    }
}

impl std::fmt::Display for ReactionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReactionToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

pub const CHECK: &str = "\u{2705}";
pub const CROSS: &str = "\u{274C}";
pub const QUESTION: &str = "\u{2753}";
pub const MUTE: &str = "\u{1F507}";
pub const UNMUTE: &str = "\u{1F50A}";
pub const PING_PONG: &str = "\u{1F3D3}";
