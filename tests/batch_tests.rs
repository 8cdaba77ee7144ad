mod common;

use chrono::{NaiveDate, NaiveDateTime};
use common::{Payment, artifacts, document_path, valid_payments, write_batch};
use paymerge::application::engine::MergeEngine;
use paymerge::config::EngineConfig;
use paymerge::domain::events::AuditEvent;
use paymerge::domain::ports::{DuplicateLedger, SharedClock, SharedLedger};
use paymerge::error::EngineError;
use paymerge::infrastructure::clock::FixedClock;
use paymerge::infrastructure::dependency_graph::DependencyGraph;
use paymerge::infrastructure::in_memory::InMemoryLedger;
use paymerge::infrastructure::xsd::XsdCompiler;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

fn batch_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 22).unwrap()
}

fn batch_time() -> NaiveDateTime {
    batch_day().and_hms_opt(12, 30, 0).unwrap()
}

struct Harness {
    engine: MergeEngine,
    events: UnboundedReceiver<AuditEvent>,
    ledger: InMemoryLedger,
}

impl Harness {
    fn new(config: EngineConfig) -> Self {
        let clock: SharedClock = Arc::new(FixedClock::new(batch_time()));
        let ledger = InMemoryLedger::new();
        let shared: SharedLedger = Arc::new(ledger.clone());
        let graph = DependencyGraph::builtin().unwrap();
        let rules =
            MergeEngine::standard_rules(&config, Arc::new(graph), clock.clone(), shared.clone());
        let (tx, events) = unbounded_channel();
        let engine = MergeEngine::new(config, Arc::new(XsdCompiler), rules, clock, shared, tx)
            .unwrap();
        Self {
            engine,
            events,
            ledger,
        }
    }

    fn drain(&mut self) -> Vec<AuditEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

fn file_events(events: &[AuditEvent]) -> Vec<&paymerge::domain::events::FileOutcome> {
    events
        .iter()
        .filter_map(|event| match event {
            AuditEvent::File(outcome) => Some(outcome),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_ten_valid_documents_are_merged() {
    let dir = tempdir().unwrap();
    write_batch(dir.path(), &valid_payments(10, batch_day())).unwrap();
    let mut harness = Harness::new(EngineConfig::default());

    let report = harness.engine.run(dir.path()).await.unwrap();
    assert_eq!(report.documents_merged, 10);
    assert_eq!(report.artifact_name(), "Total_2024-02-22_12-30-00.xml");
    assert_eq!(artifacts(dir.path()), vec![report.artifact_path.clone()]);

    let merged = std::fs::read_to_string(&report.artifact_path).unwrap();
    assert_eq!(merged.matches("<Document>").count(), 10);
    assert_eq!(merged.matches("<Documents>").count(), 1);
    assert!(merged.contains("DateTime=\"2024-02-22T12:30:00\""));

    let events = harness.drain();
    let files = file_events(&events);
    assert_eq!(files.len(), 10);
    assert!(files.iter().all(|outcome| outcome.success));
    assert!(matches!(events.last(), Some(AuditEvent::Batch(b)) if b.success));
}

#[tokio::test]
async fn test_invalid_currency_stops_at_third_document() {
    let dir = tempdir().unwrap();
    let mut payments = valid_payments(10, batch_day());
    payments[2].currency = "840".to_string();
    write_batch(dir.path(), &payments).unwrap();
    let mut harness = Harness::new(EngineConfig::default());

    let err = harness.engine.run(dir.path()).await.unwrap_err();
    assert!(matches!(err, EngineError::ValidationError(_)));
    assert!(err.to_string().contains("Допустимое значение кода валюты 810"));

    let events = harness.drain();
    let files = file_events(&events);
    assert_eq!(files.len(), 3);
    assert!(files[0].success && files[1].success);
    assert!(!files[2].success);
    assert_eq!(files[2].file_name, "payment_02.xml");
    assert_eq!(files[2].fail_fields, vec!["CurrCode".to_string()]);
    assert!(matches!(events.last(), Some(AuditEvent::Batch(b)) if !b.success));

    assert!(artifacts(dir.path()).is_empty());
    assert!(
        harness
            .ledger
            .find_by_reference(&payments[0].doc_ref)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_too_many_files_rejects_the_batch_up_front() {
    let dir = tempdir().unwrap();
    write_batch(dir.path(), &valid_payments(11, batch_day())).unwrap();
    let mut harness = Harness::new(EngineConfig::default());

    let err = harness.engine.run(dir.path()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "There are more than 10 xml files, or the files are missing"
    );

    let events = harness.drain();
    assert!(file_events(&events).is_empty());
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_later_files_are_never_reported_after_failure() {
    let dir = tempdir().unwrap();
    let mut payments = valid_payments(10, batch_day());
    payments[1].amount = "5.00".to_string();
    write_batch(dir.path(), &payments).unwrap();
    std::fs::write(document_path(dir.path(), 5), "<BSMessage><Documents>").unwrap();
    let mut harness = Harness::new(EngineConfig::default());

    let err = harness.engine.run(dir.path()).await.unwrap_err();
    assert!(err.to_string().ends_with("- Amount"));
    assert!(!err.to_string().contains("Malformed"));

    let events = harness.drain();
    let files = file_events(&events);
    assert_eq!(files.len(), 2);
    assert_eq!(files[1].fail_fields, vec!["Amount".to_string()]);
}

#[tokio::test]
async fn test_malformed_document_is_reported() {
    let dir = tempdir().unwrap();
    write_batch(dir.path(), &valid_payments(10, batch_day())).unwrap();
    std::fs::write(document_path(dir.path(), 0), "<BSMessage><Documents>").unwrap();
    let mut harness = Harness::new(EngineConfig::default());

    let err = harness.engine.run(dir.path()).await.unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Malformed document payment_00.xml")
    );
    assert_eq!(file_events(&harness.drain()).len(), 1);
}

#[tokio::test]
async fn test_schema_violation_is_reported_with_line() {
    let dir = tempdir().unwrap();
    let mut payments = valid_payments(10, batch_day());
    payments[0].amount = "12.345".to_string();
    write_batch(dir.path(), &payments).unwrap();
    let harness = Harness::new(EngineConfig::default());

    let err = harness.engine.run(dir.path()).await.unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Invalid XML file with name: payment_00.xml"));
    assert!(message.contains("line 11: "), "{message}");
    assert!(message.contains("Amount"), "{message}");
}

#[tokio::test]
async fn test_payer_mismatch_is_rejected() {
    let dir = tempdir().unwrap();
    let mut payments = valid_payments(10, batch_day());
    payments[3].payer = "ООО Лютик".to_string();
    write_batch(dir.path(), &payments).unwrap();
    let mut harness = Harness::new(EngineConfig::default());

    let err = harness.engine.run(dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("Payer"));

    let events = harness.drain();
    let files = file_events(&events);
    assert_eq!(files.len(), 4);
    assert!(files[3].fail_fields.contains(&"Payer".to_string()));
}

#[tokio::test]
async fn test_unknown_revenue_code_is_rejected() {
    let dir = tempdir().unwrap();
    let mut payments = valid_payments(10, batch_day());
    payments[0].code_rev = "00000000000000000000".to_string();
    write_batch(dir.path(), &payments).unwrap();
    let harness = Harness::new(EngineConfig::default());

    let err = harness.engine.run(dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("CodeRev"));
}

#[tokio::test]
async fn test_output_size_limit_boundary() {
    let payments = valid_payments(10, batch_day());

    let baseline = tempdir().unwrap();
    write_batch(baseline.path(), &payments).unwrap();
    let report = Harness::new(EngineConfig::default())
        .engine
        .run(baseline.path())
        .await
        .unwrap();
    let size = std::fs::metadata(&report.artifact_path).unwrap().len();

    let exact = tempdir().unwrap();
    write_batch(exact.path(), &payments).unwrap();
    let config = EngineConfig {
        max_output_bytes: size,
        ..Default::default()
    };
    let report = Harness::new(config).engine.run(exact.path()).await.unwrap();
    assert_eq!(std::fs::metadata(&report.artifact_path).unwrap().len(), size);

    let over = tempdir().unwrap();
    write_batch(over.path(), &payments).unwrap();
    let config = EngineConfig {
        max_output_bytes: size - 1,
        ..Default::default()
    };
    let harness = Harness::new(config);
    let err = harness.engine.run(over.path()).await.unwrap_err();
    assert!(matches!(err, EngineError::SizeLimitExceeded { limit, .. } if limit == size - 1));
    assert!(artifacts(over.path()).is_empty());
    assert!(
        harness
            .ledger
            .find_by_reference(&payments[0].doc_ref)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_rerun_is_detected_as_duplicate() {
    let dir = tempdir().unwrap();
    let payments = valid_payments(10, batch_day());
    write_batch(dir.path(), &payments).unwrap();
    let mut harness = Harness::new(EngineConfig::default());

    harness.engine.run(dir.path()).await.unwrap();
    for payment in &payments {
        let history = harness
            .ledger
            .find_by_reference(&payment.doc_ref)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].loaded_at, batch_time());
    }
    harness.drain();

    let err = harness.engine.run(dir.path()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "В файле payment_00.xml найден платеж, который уже был загружен ранее 2024-02-22 12:30:00 - DocRef"
    );
    assert_eq!(file_events(&harness.drain()).len(), 1);
    assert_eq!(artifacts(dir.path()).len(), 1);
}

#[tokio::test]
async fn test_every_event_shares_the_batch_id() {
    let dir = tempdir().unwrap();
    let payments: Vec<Payment> = valid_payments(3, batch_day());
    write_batch(dir.path(), &payments).unwrap();
    let config = EngineConfig {
        min_files: 1,
        max_files: 3,
        ..Default::default()
    };
    let mut harness = Harness::new(config);

    let report = harness.engine.run(dir.path()).await.unwrap();
    let events = harness.drain();
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|event| event.batch_id() == report.batch_id));
}
