//! Reaction-gated confirmations.
//!
//! A handler that sends a "are you sure?" message parks a continuation on
//! that message. The first qualifying reaction removes the entry and runs
//! the continuation; every later reaction finds nothing. Removal happens
//! under the lock, before the continuation is awaited, so two racing
//! reactions can never both win.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use bl_protocol::{MessageId, ReactionEvent, ReactionToken, UserId};

use crate::error::DuplicateConfirmationError;

/// Work to run once a confirmation resolves. Consumed on use.
#[async_trait]
pub trait Continuation: Send {
    async fn resolve(self: Box<Self>, token: ReactionToken) -> anyhow::Result<()>;
}

/// Adapts an async closure into a [`Continuation`].
pub struct FnContinuation<F>(F);

impl<F> FnContinuation<F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: FnOnce(ReactionToken) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> Continuation for FnContinuation<F>
where
    F: FnOnce(ReactionToken) -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn resolve(self: Box<Self>, token: ReactionToken) -> anyhow::Result<()> {
        (self.0)(token).await
    }
}

/// A pending confirmation parked on a bot message.
pub struct ConfirmationEntry {
    pub target_message_id: MessageId,
    pub requesting_user_id: UserId,
    pub accepted_tokens: HashSet<ReactionToken>,
    pub on_resolve: Box<dyn Continuation>,
    pub created_at: DateTime<Utc>,
    /// When false, anyone may resolve it.
    pub user_locked: bool,
}

impl ConfirmationEntry {
    /// A user-locked entry created now.
    pub fn new(
        target_message_id: MessageId,
        requesting_user_id: UserId,
        accepted_tokens: impl IntoIterator<Item = ReactionToken>,
        on_resolve: impl Continuation + 'static,
    ) -> Self {
        Self {
            target_message_id,
            requesting_user_id,
            accepted_tokens: accepted_tokens.into_iter().collect(),
            on_resolve: Box::new(on_resolve),
            created_at: Utc::now(),
            user_locked: true,
        }
    }

    pub fn unlocked(mut self) -> Self {
        self.user_locked = false;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    fn accepts(&self, reaction: &ReactionEvent) -> Result<(), ReactionOutcome> {
        if self.user_locked && reaction.user_id != self.requesting_user_id {
            return Err(ReactionOutcome::WrongUser);
        }
        if !self.accepted_tokens.contains(&reaction.token) {
            return Err(ReactionOutcome::UnacceptedToken);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConfirmationEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationEntry")
            .field("target_message_id", &self.target_message_id)
            .field("requesting_user_id", &self.requesting_user_id)
            .field("accepted_tokens", &self.accepted_tokens)
            .field("created_at", &self.created_at)
            .field("user_locked", &self.user_locked)
            .finish_non_exhaustive()
    }
}

/// What a reaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// No confirmation is pending on that message.
    NoEntry,
    /// Someone other than the requester reacted to a user-locked entry.
    WrongUser,
    UnacceptedToken,
    /// The entry was consumed and its continuation ran.
    Resolved(ReactionToken),
}

/// Pending confirmations, keyed by the message they are parked on.
#[derive(Default)]
pub struct ConfirmationEngine {
    active: Mutex<HashMap<MessageId, ConfirmationEntry>>,
}

impl ConfirmationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> MutexGuard<'_, HashMap<MessageId, ConfirmationEntry>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Park a confirmation. An existing entry on the same message is kept
    /// and the new one is rejected.
    pub fn register(&self, entry: ConfirmationEntry) -> Result<(), DuplicateConfirmationError> {
        let message_id = entry.target_message_id;
        match self.active().entry(message_id) {
            Entry::Occupied(_) => {
                tracing::error!(message_id = %message_id, "confirmation already pending on message");
                Err(DuplicateConfirmationError { message_id })
            }
            Entry::Vacant(slot) => {
                tracing::debug!(
                    message_id = %message_id,
                    user = %entry.requesting_user_id,
                    locked = entry.user_locked,
                    "confirmation registered"
                );
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Feed one reaction event.
    ///
    /// Non-qualifying reactions leave the entry in place. A qualifying one
    /// removes it and awaits its continuation; a continuation error is
    /// logged and the entry stays consumed.
    pub async fn on_reaction(&self, reaction: &ReactionEvent) -> ReactionOutcome {
        let entry = {
            let mut active = self.active();
            let Entry::Occupied(slot) = active.entry(reaction.message_id) else {
                return ReactionOutcome::NoEntry;
            };
            if let Err(outcome) = slot.get().accepts(reaction) {
                tracing::debug!(
                    message_id = %reaction.message_id,
                    user = %reaction.user_id,
                    token = %reaction.token,
                    ?outcome,
                    "reaction ignored"
                );
                return outcome;
            }
            slot.remove()
        };

        tracing::info!(
            message_id = %reaction.message_id,
            user = %reaction.user_id,
            token = %reaction.token,
            "confirmation resolved"
        );
        if let Err(e) = entry.on_resolve.resolve(reaction.token.clone()).await {
            tracing::error!(
                message_id = %reaction.message_id,
                error = %format!("{e:#}"),
                "confirmation continuation failed"
            );
        }
        ReactionOutcome::Resolved(reaction.token.clone())
    }

    /// Drop entries older than `ttl` without running their continuations.
    /// Returns the ids of the abandoned messages.
    pub fn sweep_expired(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<MessageId> {
        let mut expired = Vec::new();
        self.active().retain(|id, entry| {
            let keep = entry.created_at + ttl > now;
            if !keep {
                expired.push(*id);
            }
            keep
        });
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "abandoned confirmations expired");
        }
        expired
    }

    pub fn pending(&self) -> usize {
        self.active().len()
    }

    pub fn is_pending(&self, message_id: MessageId) -> bool {
        self.active().contains_key(&message_id)
    }
}
