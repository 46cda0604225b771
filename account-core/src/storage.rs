//! Event store backed by RocksDB
//!
//! # Column Families
//!
//! - `events` - Append-only event envelopes
//!
//! # Key layout
//!
//! `account_id (16 bytes) || sequence_number (8 bytes, big-endian)`, so a
//! forward scan from an account prefix yields that account's events in
//! ascending sequence order.
//!
//! # Concurrency
//!
//! Appends run inside an optimistic transaction that reads the target key
//! with `get_for_update` and relies on commit-time validation. Two
//! writers racing the same `(account, sequence)` key cannot both commit;
//! the loser surfaces as [`Error::ConcurrentModification`] and is retried
//! by the command handler. No lock above the store serializes writers.

use crate::{
    codec::{self, EventRecord},
    error::{Error, Result},
    event::AccountEvent,
    types::AccountId,
    Config,
};
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, ErrorKind, IteratorMode,
    OptimisticTransactionDB, Options, SliceTransform,
};

/// Column family names
const CF_EVENTS: &str = "events";

/// Width of the account prefix inside event keys
const ACCOUNT_PREFIX_LEN: usize = 16;

/// Append-only event store contract
///
/// `append` must enforce atomic uniqueness of `(account, sequence)`:
/// concurrent appends of the same pair cannot both succeed, and the
/// violation maps to the retryable [`Error::ConcurrentModification`].
/// Every other failure is an infrastructure fault.
pub trait EventStore: Send + Sync {
    /// All events of an account in ascending sequence order
    ///
    /// An unknown account yields an empty history, not an error.
    fn get_events(&self, account_id: AccountId) -> Result<Vec<AccountEvent>>;

    /// Persist one event
    fn append(&self, event: &AccountEvent) -> Result<()>;
}

/// RocksDB-backed event store
pub struct Storage {
    db: OptimisticTransactionDB,
}

impl Storage {
    /// Open or create the database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_EVENTS,
            Self::cf_options_events(),
        )];

        let db = OptimisticTransactionDB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB event store at {:?}", path);

        Ok(Self { db })
    }

    fn cf_options_events() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        // Per-account scans benefit from prefix bloom filters
        opts.set_prefix_extractor(SliceTransform::create_fixed_prefix(ACCOUNT_PREFIX_LEN));
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    fn event_key(account_id: AccountId, sequence_number: u64) -> [u8; 24] {
        let mut key = [0u8; 24];
        key[..16].copy_from_slice(account_id.as_uuid().as_bytes());
        key[16..].copy_from_slice(&sequence_number.to_be_bytes());
        key
    }

    /// Approximate number of events across all accounts (fast)
    pub fn approximate_event_count(&self) -> Result<u64> {
        let cf = self.cf_handle(CF_EVENTS)?;
        let count = self
            .db
            .property_int_value_cf(cf, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);
        Ok(count)
    }
}

impl EventStore for Storage {
    fn get_events(&self, account_id: AccountId) -> Result<Vec<AccountEvent>> {
        let cf = self.cf_handle(CF_EVENTS)?;
        let prefix = *account_id.as_uuid().as_bytes();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix[..], Direction::Forward));

        let mut events = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }

            let record: EventRecord = bincode::deserialize(&value)?;
            events.push(codec::decode(&record)?);
        }

        Ok(events)
    }

    fn append(&self, event: &AccountEvent) -> Result<()> {
        let cf = self.cf_handle(CF_EVENTS)?;
        let record = codec::encode(event)?;
        let key = Self::event_key(event.account_id(), event.sequence_number());
        let value = bincode::serialize(&record)?;

        let txn = self.db.transaction();

        // Registers the key in the transaction's read set; a writer that
        // commits this key between here and our commit fails us at commit
        // time instead of being silently overwritten.
        if txn.get_for_update_cf(cf, key, true)?.is_some() {
            return Err(Error::ConcurrentModification {
                account_id: event.account_id(),
                sequence_number: event.sequence_number(),
            });
        }

        txn.put_cf(cf, key, &value)?;

        txn.commit().map_err(|e| match e.kind() {
            ErrorKind::Busy | ErrorKind::TryAgain => Error::ConcurrentModification {
                account_id: event.account_id(),
                sequence_number: event.sequence_number(),
            },
            _ => Error::Storage(e.to_string()),
        })?;

        tracing::debug!(
            account_id = %event.account_id(),
            sequence_number = event.sequence_number(),
            kind = record.kind.as_str(),
            "Event appended"
        );

        Ok(())
    }
}
