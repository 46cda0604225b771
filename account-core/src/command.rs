//! Commands accepted by the account engine

use crate::types::{AccountId, Money, OwnerId, TransactionId};

/// Commands targeting a single account aggregate
///
/// Every command carries the client-supplied transaction id used for
/// duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountCommand {
    /// Open a new account for an owner
    Open {
        /// Account to create
        account_id: AccountId,
        /// Owner of the new account
        owner_id: OwnerId,
        /// Idempotency key
        transaction_id: TransactionId,
    },
    /// Deposit an amount into an opened account
    Deposit {
        /// Target account
        account_id: AccountId,
        /// Amount to deposit
        amount: Money,
        /// Idempotency key
        transaction_id: TransactionId,
    },
    /// Withdraw an amount from an opened account
    Withdraw {
        /// Target account
        account_id: AccountId,
        /// Amount to withdraw
        amount: Money,
        /// Idempotency key
        transaction_id: TransactionId,
    },
}

impl AccountCommand {
    /// Account the command targets
    pub fn account_id(&self) -> AccountId {
        match self {
            AccountCommand::Open { account_id, .. }
            | AccountCommand::Deposit { account_id, .. }
            | AccountCommand::Withdraw { account_id, .. } => *account_id,
        }
    }

    /// Transaction id the command carries
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            AccountCommand::Open { transaction_id, .. }
            | AccountCommand::Deposit { transaction_id, .. }
            | AccountCommand::Withdraw { transaction_id, .. } => *transaction_id,
        }
    }

    /// Short command name for logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            AccountCommand::Open { .. } => "open",
            AccountCommand::Deposit { .. } => "deposit",
            AccountCommand::Withdraw { .. } => "withdraw",
        }
    }
}
