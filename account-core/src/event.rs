//! Events recorded in an account's history

use crate::types::{AccountId, Money, OwnerId, TransactionId};

/// Facts recorded in an account's append-only history
///
/// Sequence numbers are 1-based and contiguous per account. Deposit and
/// withdrawal events carry the balance the account held immediately
/// before the event was applied, so any single event is auditable
/// without replaying its predecessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    /// Account was opened; always the first event of a history
    Opened {
        /// Account that was opened
        account_id: AccountId,
        /// Always 1
        sequence_number: u64,
        /// Command that caused the opening
        transaction_id: TransactionId,
        /// Owner of the account
        owner_id: OwnerId,
        /// Opening balance (zero at present)
        initial_balance: Money,
    },
    /// Money was deposited
    Deposited {
        /// Target account
        account_id: AccountId,
        /// Position in the account's history
        sequence_number: u64,
        /// Command that caused the deposit
        transaction_id: TransactionId,
        /// Amount deposited
        amount: Money,
        /// Balance immediately before the deposit was applied
        balance: Money,
    },
    /// Money was withdrawn
    Withdrawn {
        /// Target account
        account_id: AccountId,
        /// Position in the account's history
        sequence_number: u64,
        /// Command that caused the withdrawal
        transaction_id: TransactionId,
        /// Amount withdrawn
        amount: Money,
        /// Balance immediately before the withdrawal was applied
        balance: Money,
    },
}

impl AccountEvent {
    /// Account this event belongs to
    pub fn account_id(&self) -> AccountId {
        match self {
            AccountEvent::Opened { account_id, .. }
            | AccountEvent::Deposited { account_id, .. }
            | AccountEvent::Withdrawn { account_id, .. } => *account_id,
        }
    }

    /// Position in the account's history (1-based)
    pub fn sequence_number(&self) -> u64 {
        match self {
            AccountEvent::Opened { sequence_number, .. }
            | AccountEvent::Deposited { sequence_number, .. }
            | AccountEvent::Withdrawn { sequence_number, .. } => *sequence_number,
        }
    }

    /// Transaction id of the command that produced this event
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            AccountEvent::Opened { transaction_id, .. }
            | AccountEvent::Deposited { transaction_id, .. }
            | AccountEvent::Withdrawn { transaction_id, .. } => *transaction_id,
        }
    }
}
