//! Command and query handlers
//!
//! One command attempt is the full read-fold-decide-append cycle against
//! the store. The handler keeps no state of its own between attempts;
//! concurrent writers are coordinated purely by the store's uniqueness
//! guarantee on `(account, sequence)` plus the bounded retry loop.

use crate::command::AccountCommand;
use crate::error::{Error, Result};
use crate::event::AccountEvent;
use crate::metrics::Metrics;
use crate::state::AccountState;
use crate::storage::EventStore;
use crate::types::{Account, AccountId, Money};
use std::sync::Arc;
use std::time::Instant;

/// Executes account commands against an event store
pub struct CommandHandler<S> {
    store: Arc<S>,
    metrics: Arc<Metrics>,
}

impl<S: EventStore> CommandHandler<S> {
    /// Create a handler over a store
    pub fn new(store: Arc<S>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Execute one attempt of a command
    ///
    /// Loads the account's full history, rejects duplicate transaction
    /// ids, folds the history, decides, and appends the produced event.
    /// Returns the appended event.
    pub fn handle(&self, command: &AccountCommand) -> Result<AccountEvent> {
        let started = Instant::now();
        let result = self.attempt(command);

        self.metrics.record_command();
        self.metrics
            .record_command_duration(started.elapsed().as_secs_f64());

        match &result {
            Ok(event) => {
                self.metrics.record_event_appended();
                tracing::debug!(
                    command = command.name(),
                    account_id = %command.account_id(),
                    sequence_number = event.sequence_number(),
                    "Command applied"
                );
            }
            Err(e) if e.is_retryable() => self.metrics.record_conflict(),
            Err(e) if e.is_domain() => {
                self.metrics.record_rejection();
                tracing::debug!(
                    command = command.name(),
                    account_id = %command.account_id(),
                    error = %e,
                    "Command rejected"
                );
            }
            Err(_) => {}
        }

        result
    }

    /// Execute a command, retrying on write conflicts
    ///
    /// Only [`Error::ConcurrentModification`] is retried; every attempt
    /// re-reads the history, which is what turns a lost duplicate race
    /// into a clean [`Error::DuplicatedTransaction`]. Domain rejections
    /// return immediately. Running out of attempts is an infrastructure
    /// fault, not a domain outcome.
    pub fn handle_with_retries(
        &self,
        command: &AccountCommand,
        max_attempts: u32,
    ) -> Result<AccountEvent> {
        for attempt in 1..=max_attempts {
            match self.handle(command) {
                Err(e) if e.is_retryable() => {
                    tracing::debug!(
                        command = command.name(),
                        account_id = %command.account_id(),
                        attempt,
                        "Write conflict, retrying"
                    );
                }
                other => return other,
            }
        }

        self.metrics.record_retries_exhausted();
        tracing::warn!(
            command = command.name(),
            account_id = %command.account_id(),
            attempts = max_attempts,
            "Attempt budget exhausted"
        );
        Err(Error::RetriesExhausted {
            attempts: max_attempts,
            transaction_id: command.transaction_id(),
        })
    }

    fn attempt(&self, command: &AccountCommand) -> Result<AccountEvent> {
        let history = self.store.get_events(command.account_id())?;

        if history
            .iter()
            .any(|event| event.transaction_id() == command.transaction_id())
        {
            return Err(Error::DuplicatedTransaction(command.transaction_id()));
        }

        let state = AccountState::replay(&history)?;
        let event = Self::decide(state, command)?;
        self.store.append(&event)?;

        Ok(event)
    }

    fn decide(state: AccountState, command: &AccountCommand) -> Result<AccountEvent> {
        match command {
            AccountCommand::Open {
                account_id,
                owner_id,
                transaction_id,
            } => match state {
                AccountState::NotInitialized => Ok(AccountEvent::Opened {
                    account_id: *account_id,
                    sequence_number: 1,
                    transaction_id: *transaction_id,
                    owner_id: *owner_id,
                    initial_balance: Money::ZERO,
                }),
                AccountState::Opened { .. } => Err(Error::AccountAlreadyOpened(*account_id)),
            },
            AccountCommand::Deposit {
                account_id,
                amount,
                transaction_id,
            } => match state {
                AccountState::Opened {
                    balance, version, ..
                } => Ok(AccountEvent::Deposited {
                    account_id: *account_id,
                    sequence_number: version + 1,
                    transaction_id: *transaction_id,
                    amount: *amount,
                    balance,
                }),
                AccountState::NotInitialized => Err(Error::AccountNotInitialized(*account_id)),
            },
            AccountCommand::Withdraw {
                account_id,
                amount,
                transaction_id,
            } => match state {
                AccountState::Opened {
                    balance, version, ..
                } => {
                    // A withdrawal must leave a strictly positive balance;
                    // draining the account to zero is rejected.
                    if balance.subtract(*amount).value() > 0 {
                        Ok(AccountEvent::Withdrawn {
                            account_id: *account_id,
                            sequence_number: version + 1,
                            transaction_id: *transaction_id,
                            amount: *amount,
                            balance,
                        })
                    } else {
                        Err(Error::InsufficientBalance {
                            balance,
                            amount: *amount,
                        })
                    }
                }
                AccountState::NotInitialized => Err(Error::AccountNotInitialized(*account_id)),
            },
        }
    }
}

/// Serves account read queries
pub struct QueryHandler<S> {
    store: Arc<S>,
    metrics: Arc<Metrics>,
}

impl<S: EventStore> QueryHandler<S> {
    /// Create a query handler over a store
    pub fn new(store: Arc<S>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Current read model of an account, folded from its history
    pub fn get_account(&self, account_id: AccountId) -> Result<Account> {
        let history = self.store.get_events(account_id)?;
        self.metrics.record_query();

        match AccountState::replay(&history)? {
            AccountState::Opened {
                account_id,
                owner_id,
                balance,
                ..
            } => Ok(Account {
                account_id,
                owner_id,
                balance,
            }),
            AccountState::NotInitialized => Err(Error::AccountNotInitialized(account_id)),
        }
    }
}
