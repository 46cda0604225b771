//! Binary envelope encoding for persisted events
//!
//! Every event is stored as an [`EventRecord`] envelope whose payload
//! bytes are a bincode encoding of the per-event-type schema. Each event
//! type owns its payload schema independently, so one schema can evolve
//! without touching the others.

use crate::error::{Error, Result};
use crate::event::AccountEvent;
use crate::types::{AccountId, Money, OwnerId, TransactionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type discriminator inside the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Account was opened
    Opened,
    /// Money was deposited
    Deposited,
    /// Money was withdrawn
    Withdrawn,
}

impl EventKind {
    /// Upper-case wire name, for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Opened => "OPENED",
            EventKind::Deposited => "DEPOSITED",
            EventKind::Withdrawn => "WITHDRAWN",
        }
    }
}

/// Envelope persisted in the event store
///
/// The payload is `None` only on malformed records; decoding such a
/// record fails with [`Error::EmptyPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Account the event belongs to
    pub account_id: Uuid,
    /// Position in the account's history (1-based)
    pub sequence_number: u64,
    /// Transaction id of the producing command
    pub transaction_id: Uuid,
    /// Payload schema discriminator
    pub kind: EventKind,
    /// Bincode-encoded payload
    pub payload: Option<Vec<u8>>,
}

#[derive(Serialize, Deserialize)]
struct OpenedPayload {
    owner_id: Uuid,
    initial_balance: i64,
}

#[derive(Serialize, Deserialize)]
struct DepositedPayload {
    balance: i64,
    amount: i64,
}

#[derive(Serialize, Deserialize)]
struct WithdrawnPayload {
    balance: i64,
    amount: i64,
}

/// Encode an event into its storage envelope
pub fn encode(event: &AccountEvent) -> Result<EventRecord> {
    let (kind, payload) = match event {
        AccountEvent::Opened {
            owner_id,
            initial_balance,
            ..
        } => (
            EventKind::Opened,
            bincode::serialize(&OpenedPayload {
                owner_id: owner_id.as_uuid(),
                initial_balance: initial_balance.value(),
            })?,
        ),
        AccountEvent::Deposited {
            amount, balance, ..
        } => (
            EventKind::Deposited,
            bincode::serialize(&DepositedPayload {
                balance: balance.value(),
                amount: amount.value(),
            })?,
        ),
        AccountEvent::Withdrawn {
            amount, balance, ..
        } => (
            EventKind::Withdrawn,
            bincode::serialize(&WithdrawnPayload {
                balance: balance.value(),
                amount: amount.value(),
            })?,
        ),
    };

    Ok(EventRecord {
        account_id: event.account_id().as_uuid(),
        sequence_number: event.sequence_number(),
        transaction_id: event.transaction_id().as_uuid(),
        kind,
        payload: Some(payload),
    })
}

/// Decode a storage envelope back into an event
///
/// Amounts are re-validated on the way in: a negative persisted value
/// fails with [`Error::NegativeAmount`] even though encoding can never
/// produce one.
pub fn decode(record: &EventRecord) -> Result<AccountEvent> {
    let payload = record
        .payload
        .as_deref()
        .ok_or(Error::EmptyPayload(record.sequence_number))?;

    let account_id = AccountId::new(record.account_id);
    let transaction_id = TransactionId::new(record.transaction_id);

    match record.kind {
        EventKind::Opened => {
            let p: OpenedPayload = bincode::deserialize(payload)?;
            Ok(AccountEvent::Opened {
                account_id,
                sequence_number: record.sequence_number,
                transaction_id,
                owner_id: OwnerId::new(p.owner_id),
                initial_balance: Money::new(p.initial_balance)?,
            })
        }
        EventKind::Deposited => {
            let p: DepositedPayload = bincode::deserialize(payload)?;
            Ok(AccountEvent::Deposited {
                account_id,
                sequence_number: record.sequence_number,
                transaction_id,
                amount: Money::new(p.amount)?,
                balance: Money::new(p.balance)?,
            })
        }
        EventKind::Withdrawn => {
            let p: WithdrawnPayload = bincode::deserialize(payload)?;
            Ok(AccountEvent::Withdrawn {
                account_id,
                sequence_number: record.sequence_number,
                transaction_id,
                amount: Money::new(p.amount)?,
                balance: Money::new(p.balance)?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_events() -> Vec<AccountEvent> {
        let account_id = AccountId::new(Uuid::new_v4());
        vec![
            AccountEvent::Opened {
                account_id,
                sequence_number: 1,
                transaction_id: TransactionId::new(Uuid::new_v4()),
                owner_id: OwnerId::new(Uuid::new_v4()),
                initial_balance: Money::ZERO,
            },
            AccountEvent::Deposited {
                account_id,
                sequence_number: 2,
                transaction_id: TransactionId::new(Uuid::new_v4()),
                amount: Money::new(100).unwrap(),
                balance: Money::ZERO,
            },
            AccountEvent::Withdrawn {
                account_id,
                sequence_number: 3,
                transaction_id: TransactionId::new(Uuid::new_v4()),
                amount: Money::new(40).unwrap(),
                balance: Money::new(100).unwrap(),
            },
        ]
    }

    #[test]
    fn test_encode_fills_envelope() {
        let events = sample_events();

        let kinds: Vec<EventKind> = events
            .iter()
            .map(|e| encode(e).unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            vec![EventKind::Opened, EventKind::Deposited, EventKind::Withdrawn]
        );

        for event in &events {
            let record = encode(event).unwrap();
            assert_eq!(record.account_id, event.account_id().as_uuid());
            assert_eq!(record.sequence_number, event.sequence_number());
            assert_eq!(record.transaction_id, event.transaction_id().as_uuid());
            assert!(record.payload.is_some());
        }
    }

    #[test]
    fn test_decode_restores_events() {
        for event in sample_events() {
            let record = encode(&event).unwrap();
            assert_eq!(decode(&record).unwrap(), event);
        }
    }

    #[test]
    fn test_missing_payload_fails_decode() {
        let mut record = encode(&sample_events()[0]).unwrap();
        record.payload = None;

        let err = decode(&record).unwrap_err();
        assert!(matches!(err, Error::EmptyPayload(1)));
    }

    #[test]
    fn test_negative_persisted_amount_fails_decode() {
        let mut record = encode(&sample_events()[1]).unwrap();
        record.payload = Some(
            bincode::serialize(&DepositedPayload {
                balance: 0,
                amount: -5,
            })
            .unwrap(),
        );

        let err = decode(&record).unwrap_err();
        assert!(matches!(err, Error::NegativeAmount(-5)));
    }
}
