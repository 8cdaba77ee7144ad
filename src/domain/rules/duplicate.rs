use super::DocumentRule;
use crate::domain::context::ValidationContext;
use crate::domain::document::{ParsedDocument, tags};
use crate::domain::ports::SharedLedger;
use crate::error::Result;
use async_trait::async_trait;

/// Rejects a document carrying a payment reference already merged by an
/// earlier batch.
pub struct DuplicateRule {
    ledger: SharedLedger,
}

impl DuplicateRule {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl DocumentRule for DuplicateRule {
    fn name(&self) -> &'static str {
        "duplicate"
    }

    async fn validate(
        &self,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> Result<bool> {
        let mut history = Vec::new();
        for doc_ref in document.body_values_of(tags::DOC_REF) {
            history.extend(self.ledger.find_by_reference(&doc_ref).await?);
        }
        if history.is_empty() {
            return Ok(true);
        }

        let file = document.file_name();
        for record in &history {
            tracing::info!(
                doc_ref = %record.doc_ref,
                file = %file,
                loaded_at = %record.loaded_at,
                "document was already loaded"
            );
        }
        let message = history
            .iter()
            .map(|record| {
                format!(
                    "В файле {file} найден платеж, который уже был загружен ранее {}",
                    record.loaded_at
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        context.add_message(message, &[tags::DOC_REF]);
        Ok(false)
    }
}
