//! Baselard chat bot: library crate.
//!
//! Exposes the feature handlers, the per-event `Bot` and the background
//! loops so `bl-e2e-tests` can drive the whole pipeline against mocks.

pub mod bot;
pub mod config;
pub mod event_loop;
pub mod features;
pub mod state;
pub mod sweeper;
