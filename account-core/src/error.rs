//! Error types for the account engine

use crate::types::{AccountId, Money, TransactionId};
use thiserror::Error;

/// Result type for account operations
pub type Result<T> = std::result::Result<T, Error>;

/// Account engine errors
///
/// Domain rejections are returned to the caller and never retried.
/// `ConcurrentModification` is the only retryable error; the command
/// handler consumes it inside its bounded retry loop. The remaining
/// variants are infrastructure faults and propagate unrecovered.
#[derive(Error, Debug)]
pub enum Error {
    /// Account has already been opened
    #[error("Account {0} already opened")]
    AccountAlreadyOpened(AccountId),

    /// Account has no opening event yet
    #[error("Account {0} not initialized")]
    AccountNotInitialized(AccountId),

    /// Withdrawal would not leave a positive balance
    #[error("Insufficient balance: cannot withdraw {amount} from {balance}")]
    InsufficientBalance {
        /// Balance at decision time
        balance: Money,
        /// Requested withdrawal amount
        amount: Money,
    },

    /// Transaction id already applied to this account
    #[error("Transaction {0} already applied")]
    DuplicatedTransaction(TransactionId),

    /// Amounts are non-negative minor units
    #[error("Money cannot be negative: {0}")]
    NegativeAmount(i64),

    /// Stored envelope carries no payload
    #[error("Event at sequence {0} has no payload")]
    EmptyPayload(u64),

    /// Another writer persisted the same (account, sequence) first
    #[error("Write conflict on account {account_id} at sequence {sequence_number}")]
    ConcurrentModification {
        /// Account both writers targeted
        account_id: AccountId,
        /// Sequence number both writers produced
        sequence_number: u64,
    },

    /// Retry budget exhausted without a successful append
    #[error("Gave up after {attempts} attempts for transaction {transaction_id}")]
    RetriesExhausted {
        /// Attempts performed
        attempts: u32,
        /// Transaction that never got applied
        transaction_id: TransactionId,
    },

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the command cycle may be re-attempted after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ConcurrentModification { .. })
    }

    /// Whether this is a domain rejection rather than an infrastructure fault
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Error::AccountAlreadyOpened(_)
                | Error::AccountNotInitialized(_)
                | Error::InsufficientBalance { .. }
                | Error::DuplicatedTransaction(_)
                | Error::NegativeAmount(_)
                | Error::EmptyPayload(_)
        )
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
