use super::document::ParsedDocument;
use super::events::{AuditEvent, LedgerRecord};
use super::graph::Vertex;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// History of document references merged by earlier batches.
#[async_trait]
pub trait DuplicateLedger: Send + Sync {
    async fn find_by_reference(&self, doc_ref: &str) -> Result<Vec<LedgerRecord>>;
    async fn record(&self, record: LedgerRecord) -> Result<()>;

    /// Stores every record of a batch, or none of them.
    async fn record_all(&self, records: Vec<LedgerRecord>) -> Result<()>;
}

/// Destination of audit events drained from the engine's channel.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, event: AuditEvent) -> Result<()>;
    async fn events(&self, batch_id: Uuid) -> Result<Vec<AuditEvent>>;
}

/// Read-only view of the payment dependency graph.
pub trait DependencyLookup: Send + Sync {
    fn contains_vertex(&self, vertex: &Vertex) -> bool;
    fn contains_edge(&self, from: &Vertex, to: &Vertex) -> bool;
}

/// Source of "now". Never read the system clock directly in the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// First problem reported by a compiled schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub line: Option<u32>,
    pub reason: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.reason),
            None => f.write_str(&self.reason),
        }
    }
}

/// A compiled schema, built once per batch and reused for every document.
pub trait DocumentSchema: Send + Sync + fmt::Debug {
    fn check(&self, document: &ParsedDocument) -> std::result::Result<(), SchemaViolation>;
}

pub trait SchemaCompiler: Send + Sync {
    fn compile(&self, source: &[u8]) -> Result<Arc<dyn DocumentSchema>>;
}

pub type SharedLedger = Arc<dyn DuplicateLedger>;
pub type SharedAuditStore = Arc<dyn AuditStore>;
pub type SharedGraph = Arc<dyn DependencyLookup>;
pub type SharedClock = Arc<dyn Clock>;
