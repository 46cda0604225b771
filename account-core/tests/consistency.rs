//! Multi-writer consistency under optimistic concurrency
//!
//! No lock coordinates the writers in these tests; every thread runs the
//! full read-fold-decide-append cycle against the shared store and
//! retries write conflicts.

use account_core::{
    AccountCommand, AccountId, AccountState, CommandHandler, Config, Error, EventStore, Metrics,
    Money, OwnerId, Storage, TransactionId,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use uuid::Uuid;

const WRITERS: usize = 8;
const DEPOSITS_PER_WRITER: usize = 25;

fn setup() -> (CommandHandler<Storage>, Arc<Storage>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.data_dir = temp_dir.path().to_path_buf();

    let storage = Arc::new(Storage::open(&config).unwrap());
    let metrics = Arc::new(Metrics::new().unwrap());
    let handler = CommandHandler::new(storage.clone(), metrics);

    (handler, storage, temp_dir)
}

fn open_account(handler: &CommandHandler<Storage>) -> AccountId {
    let account_id = AccountId::new(Uuid::new_v4());
    handler
        .handle(&AccountCommand::Open {
            account_id,
            owner_id: OwnerId::new(Uuid::new_v4()),
            transaction_id: TransactionId::new(Uuid::new_v4()),
        })
        .unwrap();
    account_id
}

#[test]
fn test_concurrent_unit_deposits_converge() {
    let (handler, storage, _temp) = setup();
    let account_id = open_account(&handler);

    thread::scope(|s| {
        for _ in 0..WRITERS {
            s.spawn(|| {
                for _ in 0..DEPOSITS_PER_WRITER {
                    let command = AccountCommand::Deposit {
                        account_id,
                        amount: Money::new(1).unwrap(),
                        transaction_id: TransactionId::new(Uuid::new_v4()),
                    };
                    // A conflict means some other writer progressed, so
                    // every writer eventually gets through
                    loop {
                        match handler.handle(&command) {
                            Ok(_) => break,
                            Err(e) if e.is_retryable() => continue,
                            Err(other) => panic!("unexpected error: {other}"),
                        }
                    }
                }
            });
        }
    });

    let events = storage.get_events(account_id).unwrap();
    let expected = WRITERS * DEPOSITS_PER_WRITER + 1;
    assert_eq!(events.len(), expected);

    // Contiguous sequences, unique transaction ids
    let mut transaction_ids = HashSet::new();
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.sequence_number(), (i + 1) as u64);
        assert!(transaction_ids.insert(event.transaction_id()));
    }

    match AccountState::replay(&events).unwrap() {
        AccountState::Opened { balance, version, .. } => {
            assert_eq!(balance.value(), (WRITERS * DEPOSITS_PER_WRITER) as i64);
            assert_eq!(version, expected as u64);
        }
        AccountState::NotInitialized => panic!("account was opened"),
    }
}

#[test]
fn test_racing_same_transaction_applies_once() {
    let (handler, storage, _temp) = setup();
    let account_id = open_account(&handler);

    handler
        .handle(&AccountCommand::Deposit {
            account_id,
            amount: Money::new(10).unwrap(),
            transaction_id: TransactionId::new(Uuid::new_v4()),
        })
        .unwrap();

    let command = AccountCommand::Deposit {
        account_id,
        amount: Money::new(5).unwrap(),
        transaction_id: TransactionId::new(Uuid::new_v4()),
    };

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| s.spawn(|| handler.handle_with_retries(&command, 10)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let applied = results.iter().filter(|r| r.is_ok()).count();
    let duplicated = results
        .iter()
        .filter(|r| matches!(r, Err(Error::DuplicatedTransaction(_))))
        .count();

    assert_eq!(applied, 1);
    assert_eq!(duplicated, 1);

    let events = storage.get_events(account_id).unwrap();
    assert_eq!(events.len(), 3);

    match AccountState::replay(&events).unwrap() {
        AccountState::Opened { balance, .. } => assert_eq!(balance.value(), 15),
        AccountState::NotInitialized => panic!("account was opened"),
    }
}
