//! Account state derived by folding event histories

use crate::error::{Error, Result};
use crate::event::AccountEvent;
use crate::types::{AccountId, Money, OwnerId};

/// Current state of an account aggregate
///
/// State is never stored; it is recomputed from the full event history
/// on every command and query. `version` tracks the sequence number of
/// the last applied event, which is what the next event's sequence
/// number is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountState {
    /// No opening event has been applied yet
    NotInitialized,
    /// Account is open and live
    Opened {
        /// Account identifier
        account_id: AccountId,
        /// Owner identifier
        owner_id: OwnerId,
        /// Current balance
        balance: Money,
        /// Sequence number of the last applied event
        version: u64,
    },
}

impl AccountState {
    /// Fold a full history into the resulting state
    ///
    /// An empty history yields `NotInitialized`. Replay is deterministic:
    /// the same events always produce the same state.
    pub fn replay<'a, I>(events: I) -> Result<AccountState>
    where
        I: IntoIterator<Item = &'a AccountEvent>,
    {
        events
            .into_iter()
            .try_fold(AccountState::NotInitialized, |state, event| {
                state.apply(event)
            })
    }

    /// Apply a single event to this state
    pub fn apply(self, event: &AccountEvent) -> Result<AccountState> {
        match (self, event) {
            (
                AccountState::NotInitialized,
                AccountEvent::Opened {
                    account_id,
                    owner_id,
                    initial_balance,
                    ..
                },
            ) => Ok(AccountState::Opened {
                account_id: *account_id,
                owner_id: *owner_id,
                balance: *initial_balance,
                version: 1,
            }),
            (AccountState::NotInitialized, other) => {
                Err(Error::AccountNotInitialized(other.account_id()))
            }
            (AccountState::Opened { account_id, .. }, AccountEvent::Opened { .. }) => {
                Err(Error::AccountAlreadyOpened(account_id))
            }
            (
                AccountState::Opened {
                    account_id,
                    owner_id,
                    balance,
                    ..
                },
                AccountEvent::Deposited {
                    sequence_number,
                    amount,
                    ..
                },
            ) => Ok(AccountState::Opened {
                account_id,
                owner_id,
                balance: balance.add(*amount),
                version: *sequence_number,
            }),
            (
                AccountState::Opened {
                    account_id,
                    owner_id,
                    balance,
                    ..
                },
                AccountEvent::Withdrawn {
                    sequence_number,
                    amount,
                    ..
                },
            ) => Ok(AccountState::Opened {
                account_id,
                owner_id,
                balance: balance.subtract(*amount),
                version: *sequence_number,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionId;
    use uuid::Uuid;

    fn account_id() -> AccountId {
        AccountId::new(Uuid::new_v4())
    }

    fn opened(account_id: AccountId, owner_id: OwnerId) -> AccountEvent {
        AccountEvent::Opened {
            account_id,
            sequence_number: 1,
            transaction_id: TransactionId::new(Uuid::new_v4()),
            owner_id,
            initial_balance: Money::ZERO,
        }
    }

    fn deposited(account_id: AccountId, sequence_number: u64, amount: i64, balance: i64) -> AccountEvent {
        AccountEvent::Deposited {
            account_id,
            sequence_number,
            transaction_id: TransactionId::new(Uuid::new_v4()),
            amount: Money::new(amount).unwrap(),
            balance: Money::new(balance).unwrap(),
        }
    }

    fn withdrawn(account_id: AccountId, sequence_number: u64, amount: i64, balance: i64) -> AccountEvent {
        AccountEvent::Withdrawn {
            account_id,
            sequence_number,
            transaction_id: TransactionId::new(Uuid::new_v4()),
            amount: Money::new(amount).unwrap(),
            balance: Money::new(balance).unwrap(),
        }
    }

    #[test]
    fn test_empty_history_is_not_initialized() {
        let state = AccountState::replay([]).unwrap();
        assert_eq!(state, AccountState::NotInitialized);
    }

    #[test]
    fn test_opened_event_initializes_account() {
        let id = account_id();
        let owner = OwnerId::new(Uuid::new_v4());

        let state = AccountState::NotInitialized
            .apply(&opened(id, owner))
            .unwrap();

        assert_eq!(
            state,
            AccountState::Opened {
                account_id: id,
                owner_id: owner,
                balance: Money::ZERO,
                version: 1,
            }
        );
    }

    #[test]
    fn test_deposit_before_open_fails() {
        let id = account_id();
        let err = AccountState::NotInitialized
            .apply(&deposited(id, 2, 10, 0))
            .unwrap_err();

        assert!(matches!(err, Error::AccountNotInitialized(a) if a == id));
    }

    #[test]
    fn test_withdraw_before_open_fails() {
        let id = account_id();
        let err = AccountState::NotInitialized
            .apply(&withdrawn(id, 2, 10, 0))
            .unwrap_err();

        assert!(matches!(err, Error::AccountNotInitialized(_)));
    }

    #[test]
    fn test_double_open_fails() {
        let id = account_id();
        let owner = OwnerId::new(Uuid::new_v4());

        let state = AccountState::NotInitialized
            .apply(&opened(id, owner))
            .unwrap();
        let err = state.apply(&opened(id, owner)).unwrap_err();

        assert!(matches!(err, Error::AccountAlreadyOpened(a) if a == id));
    }

    #[test]
    fn test_deposits_and_withdrawals_track_balance_and_version() {
        let id = account_id();
        let owner = OwnerId::new(Uuid::new_v4());

        let history = vec![
            opened(id, owner),
            deposited(id, 2, 100, 0),
            deposited(id, 3, 50, 100),
            withdrawn(id, 4, 30, 150),
        ];

        let state = AccountState::replay(&history).unwrap();
        assert_eq!(
            state,
            AccountState::Opened {
                account_id: id,
                owner_id: owner,
                balance: Money::new(120).unwrap(),
                version: 4,
            }
        );
    }

    #[test]
    fn test_replay_is_deterministic() {
        let id = account_id();
        let owner = OwnerId::new(Uuid::new_v4());
        let history = vec![opened(id, owner), deposited(id, 2, 42, 0)];

        assert_eq!(
            AccountState::replay(&history).unwrap(),
            AccountState::replay(&history).unwrap()
        );
    }
}
