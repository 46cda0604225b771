//! Account Core
//!
//! Event-sourced account aggregate engine over an append-only event store.
//!
//! # Architecture
//!
//! - **Event Sourcing**: Account state is always derived by folding the
//!   account's full event history; there are no snapshots or state caches
//! - **Optimistic Concurrency**: The store enforces atomic uniqueness of
//!   `(account, sequence)`; colliding writers retry the whole
//!   read-fold-decide-append cycle
//! - **Idempotency**: Client transaction ids are rejected as duplicates
//!   against the freshly loaded history on every attempt
//!
//! # Invariants
//!
//! - Sequence numbers per account are contiguous starting at 1
//! - An account is opened exactly once, at sequence 1
//! - A transaction id appears at most once per account
//! - Balance equals initial balance plus deposits minus withdrawals and
//!   never goes negative

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod metrics;
pub mod state;
pub mod storage;
pub mod types;

// Re-exports
pub use command::AccountCommand;
pub use config::Config;
pub use error::{Error, Result};
pub use event::AccountEvent;
pub use handler::{CommandHandler, QueryHandler};
pub use metrics::Metrics;
pub use state::AccountState;
pub use storage::{EventStore, Storage};
pub use types::{Account, AccountId, Money, OwnerId, TransactionId};
