//! Platform snowflake identifiers.
//!
//! Every id is an opaque `u64` assigned by the chat platform. Distinct
//! newtypes keep a `UserId` from being passed where a `MessageId` is expected.

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

snowflake!(
    /// A message posted in a channel.
    MessageId
);
snowflake!(
    /// A platform user (humans and bots alike).
    UserId
);
snowflake!(
    /// A text channel.
    ChannelId
);
snowflake!(
    /// A guild (server) grouping channels.
    GuildId
);
