use super::aggregator::TargetDocument;
use super::output::OutputSizeGuard;
use crate::config::EngineConfig;
use crate::domain::context::ValidationContext;
use crate::domain::document::{ParsedDocument, file_name_of, tags};
use crate::domain::events::{ArtifactCreated, AuditEvent, BatchOutcome, FileOutcome, LedgerRecord};
use crate::domain::ports::{
    DocumentSchema, SchemaCompiler, SharedClock, SharedGraph, SharedLedger,
};
use crate::domain::rules::{
    AmountRule, CurrencyRule, DuplicateRule, Ipv4Rule, PayInfoRule, PaymentDateRule, RuleSet,
    SinglePayerCheck,
};
use crate::error::{EngineError, Result};
use crate::infrastructure::file_set::resolve_files;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// What a successful batch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub artifact_path: PathBuf,
    pub documents_merged: usize,
}

impl BatchReport {
    pub fn artifact_name(&self) -> String {
        file_name_of(&self.artifact_path)
    }
}

/// Validates a directory of payment documents and merges them into one
/// artifact.
///
/// Batches are processed one file at a time, in file-name order. The first
/// rejected file ends the batch: its outcome and the batch outcome are still
/// sent to the audit channel before the error is returned, and later files
/// are never read.
pub struct MergeEngine {
    config: EngineConfig,
    compiler: Arc<dyn SchemaCompiler>,
    rules: RuleSet,
    payer_check: SinglePayerCheck,
    clock: SharedClock,
    ledger: SharedLedger,
    events: UnboundedSender<AuditEvent>,
}

impl MergeEngine {
    /// Creates a new `MergeEngine`.
    ///
    /// # Arguments
    ///
    /// * `config` - Batch tunables. Rejected if invalid.
    /// * `compiler` - Compiles the batch's schema file.
    /// * `rules` - Business rules run after the schema check.
    /// * `clock` - Source of the current date and time.
    /// * `ledger` - History of merged document references, written after
    ///   every successful batch.
    /// * `events` - Audit channel. Sending never blocks.
    pub fn new(
        config: EngineConfig,
        compiler: Arc<dyn SchemaCompiler>,
        rules: RuleSet,
        clock: SharedClock,
        ledger: SharedLedger,
        events: UnboundedSender<AuditEvent>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            compiler,
            rules,
            payer_check: SinglePayerCheck,
            clock,
            ledger,
            events,
        })
    }

    /// The payment rules, in the order their failures are reported.
    pub fn standard_rules(
        config: &EngineConfig,
        graph: SharedGraph,
        clock: SharedClock,
        ledger: SharedLedger,
    ) -> RuleSet {
        RuleSet::new()
            .with_rule(CurrencyRule::new(config.currency_code.clone()))
            .with_rule(Ipv4Rule)
            .with_rule(AmountRule::new(config.min_payment, config.max_payment))
            .with_rule(PaymentDateRule::new(
                clock,
                config.document_date_format.clone(),
            ))
            .with_rule(PayInfoRule::new(graph))
            .with_rule(DuplicateRule::new(ledger))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one batch over `dir`.
    pub async fn run(&self, dir: &Path) -> Result<BatchReport> {
        let batch_id = Uuid::new_v4();
        tracing::info!(batch = %batch_id, dir = %dir.display(), "batch started");

        match self.process(batch_id, dir).await {
            Ok(report) => {
                self.emit(AuditEvent::Batch(BatchOutcome {
                    batch_id,
                    dir_ref: dir.display().to_string(),
                    success: true,
                    total_artifact_ref: Some(report.artifact_path.display().to_string()),
                    timestamp: self.clock.now(),
                }));
                tracing::info!(
                    batch = %batch_id,
                    artifact = %report.artifact_path.display(),
                    documents = report.documents_merged,
                    "batch succeeded"
                );
                Ok(report)
            }
            Err(e) => {
                self.emit(AuditEvent::Batch(BatchOutcome {
                    batch_id,
                    dir_ref: dir.display().to_string(),
                    success: false,
                    total_artifact_ref: None,
                    timestamp: self.clock.now(),
                }));
                tracing::warn!(batch = %batch_id, error = %e, "batch failed");
                Err(e)
            }
        }
    }

    async fn process(&self, batch_id: Uuid, dir: &Path) -> Result<BatchReport> {
        let files = resolve_files(dir, &self.config).await?;
        tracing::debug!(
            batch = %batch_id,
            documents = files.xml_files.len(),
            schema = %files.xsd_file.display(),
            "files resolved"
        );

        let schema_source = tokio::fs::read(&files.xsd_file).await?;
        let schema = self.compiler.compile(&schema_source)?;

        let mut target = TargetDocument::new();
        let mut canonical_payer: Option<Option<String>> = None;
        let mut references = Vec::new();

        for path in &files.xml_files {
            let (document, mut context) = match self
                .validate_file(path, schema.as_ref(), &mut canonical_payer)
                .await
            {
                Ok(validated) => validated,
                Err(e) => {
                    let mut context = ValidationContext::new();
                    context.add_message(e.to_string(), &[]);
                    self.emit_file(batch_id, path, &context);
                    return Err(e);
                }
            };

            let Some(document) = document.filter(|_| context.is_empty()) else {
                self.emit_file(batch_id, path, &context);
                tracing::warn!(
                    batch = %batch_id,
                    file = %file_name_of(path),
                    reason = %context.joined(),
                    "document rejected"
                );
                return Err(EngineError::ValidationError(context.joined()));
            };

            let file_name = document.file_name();
            let doc_refs = document.body_values_of(tags::DOC_REF);
            if let Err(e) = target.accept(document) {
                context.add_message(e.to_string(), &[]);
                self.emit_file(batch_id, path, &context);
                return Err(e);
            }
            self.emit_file(batch_id, path, &context);
            references.extend(doc_refs.into_iter().map(|doc_ref| (doc_ref, file_name.clone())));
        }

        target.finalize(self.clock.as_ref(), &self.config.message_timestamp_format)?;
        let bytes = target.serialize()?;

        let now = self.clock.now();
        let artifact_path = dir.join(format!(
            "{}{}{}",
            self.config.output_base_name,
            now.format(&self.config.output_timestamp_format),
            self.config.output_extension
        ));
        let size = OutputSizeGuard::new(self.config.max_output_bytes)
            .write(&artifact_path, &bytes)
            .await?;
        tracing::debug!(path = %artifact_path.display(), size, "artifact written");

        let records = references
            .into_iter()
            .map(|(doc_ref, file_name)| LedgerRecord {
                doc_ref,
                file_name,
                loaded_at: now,
            })
            .collect();
        if let Err(e) = self.ledger.record_all(records).await {
            discard_artifact(&artifact_path).await;
            return Err(e);
        }

        self.emit(AuditEvent::ArtifactCreated(ArtifactCreated {
            batch_id,
            artifact_path: artifact_path.display().to_string(),
        }));

        Ok(BatchReport {
            batch_id,
            artifact_path,
            documents_merged: target.len(),
        })
    }

    /// Parses one file and runs the schema check, then the payer check and
    /// every rule. Returns the document only if it could be parsed and passed
    /// the schema.
    async fn validate_file(
        &self,
        path: &Path,
        schema: &dyn DocumentSchema,
        canonical_payer: &mut Option<Option<String>>,
    ) -> Result<(Option<ParsedDocument>, ValidationContext)> {
        let file = file_name_of(path);
        let mut context = ValidationContext::new();

        let bytes = tokio::fs::read(path).await?;
        let document = match ParsedDocument::parse(path, &bytes) {
            Ok(document) => document,
            Err(e) => {
                context.add_message(format!("Malformed document {file}: {e}"), &[]);
                return Ok((None, context));
            }
        };

        if let Err(violation) = schema.check(&document) {
            context.add_message(
                format!("Invalid XML file with name: {file} ({violation})"),
                &[],
            );
            return Ok((None, context));
        }

        let payer = canonical_payer.get_or_insert_with(|| document.value_of(tags::PAYER));
        self.payer_check
            .validate(payer.as_deref(), &document, &mut context);
        self.rules.validate_all(&document, &mut context).await?;

        Ok((Some(document), context))
    }

    fn emit_file(&self, batch_id: Uuid, path: &Path, context: &ValidationContext) {
        let success = context.is_empty();
        self.emit(AuditEvent::File(FileOutcome {
            batch_id,
            file_name: file_name_of(path),
            source_ref: path.display().to_string(),
            success,
            failure_reason: (!success).then(|| context.joined()),
            fail_fields: context.fail_fields(),
            timestamp: self.clock.now(),
        }));
    }

    fn emit(&self, event: AuditEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("audit channel closed, event dropped");
        }
    }
}

/// Removes an artifact whose batch failed after it was written.
async fn discard_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::warn!(path = %path.display(), "artifact removed, batch not committed"),
        Err(e) => tracing::error!(
            path = %path.display(),
            error = %e,
            "artifact of a failed batch could not be removed"
        ),
    }
}
