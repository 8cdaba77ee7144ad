use crate::domain::events::{AuditEvent, LedgerRecord};
use crate::domain::ports::{AuditStore, DuplicateLedger};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory history of merged document references.
///
/// Uses `Arc<RwLock<HashMap<String, Vec<LedgerRecord>>>>` so clones share the
/// same history. Lives only as long as the process.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    records: Arc<RwLock<HashMap<String, Vec<LedgerRecord>>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DuplicateLedger for InMemoryLedger {
    async fn find_by_reference(&self, doc_ref: &str) -> Result<Vec<LedgerRecord>> {
        let records = self.records.read().await;
        Ok(records.get(doc_ref).cloned().unwrap_or_default())
    }

    async fn record(&self, record: LedgerRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records
            .entry(record.doc_ref.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn record_all(&self, batch: Vec<LedgerRecord>) -> Result<()> {
        let mut records = self.records.write().await;
        for record in batch {
            records
                .entry(record.doc_ref.clone())
                .or_default()
                .push(record);
        }
        Ok(())
    }
}

/// A thread-safe in-memory audit trail, grouped by batch.
#[derive(Default, Clone)]
pub struct InMemoryAuditStore {
    events: Arc<RwLock<HashMap<Uuid, Vec<AuditEvent>>>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, event: AuditEvent) -> Result<()> {
        let mut events = self.events.write().await;
        events.entry(event.batch_id()).or_default().push(event);
        Ok(())
    }

    async fn events(&self, batch_id: Uuid) -> Result<Vec<AuditEvent>> {
        let events = self.events.read().await;
        Ok(events.get(&batch_id).cloned().unwrap_or_default())
    }
}
