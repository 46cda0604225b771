//! Value types for the account domain

use crate::error::{Error, Result};
use std::fmt;
use uuid::Uuid;

/// Account identifier (128-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Wrap an existing UUID
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for AccountId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Owner identifier (128-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Wrap an existing UUID
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Client-supplied transaction identifier (128-bit), the idempotency key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Wrap an existing UUID
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TransactionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Monetary amount in minor units
///
/// Construction rejects negative values. `add` and `subtract` are
/// unchecked: a subtraction may go transiently negative, and the result
/// is validated at the point of use (the withdrawal rule). Persisted
/// balances never go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(0);

    /// Validate and wrap an amount in minor units
    pub fn new(value: i64) -> Result<Self> {
        if value < 0 {
            return Err(Error::NegativeAmount(value));
        }
        Ok(Self(value))
    }

    /// Amount in minor units
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Unchecked addition
    pub fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }

    /// Unchecked subtraction
    pub fn subtract(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Read model returned by account queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account identifier
    pub account_id: AccountId,
    /// Owner identifier
    pub owner_id: OwnerId,
    /// Current balance
    pub balance: Money,
}
