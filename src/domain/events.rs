use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of validating a single document file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub batch_id: Uuid,
    pub file_name: String,
    pub source_ref: String,
    pub success: bool,
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub fail_fields: Vec<String>,
    pub timestamp: NaiveDateTime,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    pub dir_ref: String,
    pub success: bool,
    pub total_artifact_ref: Option<String>,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactCreated {
    pub batch_id: Uuid,
    pub artifact_path: String,
}

/// Notification emitted by the engine for the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEvent {
    File(FileOutcome),
    Batch(BatchOutcome),
    ArtifactCreated(ArtifactCreated),
}

impl AuditEvent {
    pub fn batch_id(&self) -> Uuid {
        match self {
            Self::File(outcome) => outcome.batch_id,
            Self::Batch(outcome) => outcome.batch_id,
            Self::ArtifactCreated(created) => created.batch_id,
        }
    }
}

/// A document reference that has already been merged by an earlier batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub doc_ref: String,
    pub file_name: String,
    pub loaded_at: NaiveDateTime,
}
