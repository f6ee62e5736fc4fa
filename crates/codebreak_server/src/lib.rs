//! Authoritative match service for the code-breaking engine.
//!
//! [`MatchService`] serializes every mutation of a match, persists it through
//! a [`MatchStore`], pushes it to subscribers and hands it to a
//! [`MatchNotifier`]. Turn timers run server-side and pass the turn when a
//! player stalls. The [`http`] module exposes all of it over REST and SSE.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod events;
pub mod http;
mod notifier;
mod service;
pub mod store;
mod timers;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Service
pub use error::ServiceError;
pub use service::{MatchService, ServiceSettings};

// Crate-level exports - Push delivery
pub use events::{EventHub, JOURNAL_CAPACITY, MatchEvent, Subscription, Transition};
pub use notifier::{MatchNotifier, TracingNotifier};
pub use timers::TurnTimers;

// Crate-level exports - Persistence
pub use store::{MatchStore, MemoryStore, SqliteStore, StoreError, StoreErrorKind};
