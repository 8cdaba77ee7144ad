use super::DocumentRule;
use crate::domain::context::ValidationContext;
use crate::domain::document::{ParsedDocument, tags};
use crate::domain::ports::SharedClock;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// The payment date must be today, according to the injected clock.
pub struct PaymentDateRule {
    clock: SharedClock,
    format: String,
}

impl PaymentDateRule {
    pub fn new(clock: SharedClock, format: impl Into<String>) -> Self {
        Self {
            clock,
            format: format.into(),
        }
    }
}

#[async_trait]
impl DocumentRule for PaymentDateRule {
    fn name(&self) -> &'static str {
        "payment_date"
    }

    async fn validate(
        &self,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> Result<bool> {
        let date = document
            .value_of(tags::DOCUMENT_DATE)
            .and_then(|raw| NaiveDate::parse_from_str(&raw, &self.format).ok());
        if date == Some(self.clock.today()) {
            return Ok(true);
        }
        context.add_message(
            "Дата платежного документа должна быть равна текущей дате",
            &[tags::DOCUMENT_DATE],
        );
        Ok(false)
    }
}
