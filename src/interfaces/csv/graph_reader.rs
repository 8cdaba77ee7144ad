use crate::error::{EngineError, Result};
use serde::Deserialize;
use std::io::Read;

/// One allowed `revenue code -> payment type -> payment ground` path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphRow {
    pub revenue_code: String,
    pub payment_type: String,
    pub payment_ground: String,
}

/// Reads dependency graph rows from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths.
pub struct GraphReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> GraphReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes the rows.
    pub fn rows(self) -> impl Iterator<Item = Result<GraphRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EngineError::from))
    }
}
