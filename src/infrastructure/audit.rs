use crate::domain::events::AuditEvent;
use crate::domain::ports::SharedAuditStore;
use crate::error::Result;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Consumer side of the engine's audit channel.
pub struct AuditRecorder;

impl AuditRecorder {
    /// Drains `events` into `store` until every sender is dropped. Returns the
    /// number of events stored.
    pub fn spawn(
        store: SharedAuditStore,
        mut events: UnboundedReceiver<AuditEvent>,
    ) -> JoinHandle<Result<usize>> {
        tokio::spawn(async move {
            let mut stored = 0;
            while let Some(event) = events.recv().await {
                log_event(&event);
                store.append(event).await?;
                stored += 1;
            }
            Ok(stored)
        })
    }
}

fn log_event(event: &AuditEvent) {
    match event {
        AuditEvent::File(outcome) if outcome.success => {
            tracing::info!(batch = %outcome.batch_id, file = %outcome.file_name, "file accepted");
        }
        AuditEvent::File(outcome) => {
            tracing::warn!(
                batch = %outcome.batch_id,
                file = %outcome.file_name,
                reason = outcome.failure_reason.as_deref().unwrap_or_default(),
                "file rejected"
            );
        }
        AuditEvent::Batch(outcome) => {
            tracing::info!(
                batch = %outcome.batch_id,
                dir = %outcome.dir_ref,
                success = outcome.success,
                "batch finished"
            );
        }
        AuditEvent::ArtifactCreated(created) => {
            tracing::info!(batch = %created.batch_id, path = %created.artifact_path, "artifact created");
        }
    }
}
