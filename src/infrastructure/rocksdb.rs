use crate::domain::events::{AuditEvent, LedgerRecord};
use crate::domain::ports::{AuditStore, DuplicateLedger};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Column Family for merged document references.
pub const CF_LEDGER: &str = "ledger";
/// Column Family for audit events.
pub const CF_AUDIT: &str = "audit";

impl From<rocksdb::Error> for EngineError {
    fn from(e: rocksdb::Error) -> Self {
        EngineError::InternalError(Box::new(e))
    }
}

/// A persistent ledger and audit trail backed by RocksDB.
///
/// Ledger keys are `<doc_ref>\0<loaded_at>\0<file_name>`, so every load of a
/// reference is kept and a prefix scan returns its history in time order.
/// Audit keys are `<batch_id><sequence>`, keeping a batch's events in emission
/// order.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the
    /// "ledger" and "audit" column families when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_ledger = ColumnFamilyDescriptor::new(CF_LEDGER, Options::default());
        let cf_audit = ColumnFamilyDescriptor::new(CF_AUDIT, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_ledger, cf_audit])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            EngineError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    /// Values stored under keys starting with `prefix`, in key order.
    fn scan_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
        let cf = self.cf(cf_name)?;
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(value.into_vec());
        }
        Ok(values)
    }
}

fn ledger_prefix(doc_ref: &str) -> Vec<u8> {
    let mut key = doc_ref.as_bytes().to_vec();
    key.push(0);
    key
}

fn ledger_key(record: &LedgerRecord) -> Vec<u8> {
    let mut key = ledger_prefix(&record.doc_ref);
    key.extend_from_slice(record.loaded_at.format("%Y%m%d%H%M%S%.f").to_string().as_bytes());
    key.push(0);
    key.extend_from_slice(record.file_name.as_bytes());
    key
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        EngineError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        EngineError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

#[async_trait]
impl DuplicateLedger for RocksDBStore {
    async fn find_by_reference(&self, doc_ref: &str) -> Result<Vec<LedgerRecord>> {
        self.scan_prefix(CF_LEDGER, &ledger_prefix(doc_ref))?
            .iter()
            .map(|bytes| decode(bytes))
            .collect()
    }

    async fn record(&self, record: LedgerRecord) -> Result<()> {
        let cf = self.cf(CF_LEDGER)?;
        self.db.put_cf(cf, ledger_key(&record), encode(&record)?)?;
        Ok(())
    }

    async fn record_all(&self, records: Vec<LedgerRecord>) -> Result<()> {
        let cf = self.cf(CF_LEDGER)?;
        let mut batch = WriteBatch::default();
        for record in &records {
            batch.put_cf(cf, ledger_key(record), encode(record)?);
        }
        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl AuditStore for RocksDBStore {
    async fn append(&self, event: AuditEvent) -> Result<()> {
        let prefix = event.batch_id().into_bytes();
        let sequence = self.scan_prefix(CF_AUDIT, &prefix)?.len() as u32;

        let mut key = prefix.to_vec();
        key.extend_from_slice(&sequence.to_be_bytes());

        let cf = self.cf(CF_AUDIT)?;
        self.db.put_cf(cf, key, encode(&event)?)?;
        Ok(())
    }

    async fn events(&self, batch_id: Uuid) -> Result<Vec<AuditEvent>> {
        self.scan_prefix(CF_AUDIT, batch_id.as_bytes())?
            .iter()
            .map(|bytes| decode(bytes))
            .collect()
    }
}
