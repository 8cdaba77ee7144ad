use super::DocumentRule;
use crate::domain::context::ValidationContext;
use crate::domain::document::{ParsedDocument, tags};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Payment amount must parse as a decimal within `[min, max]`.
pub struct AmountRule {
    min: Decimal,
    max: Decimal,
}

impl AmountRule {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }
}

#[async_trait]
impl DocumentRule for AmountRule {
    fn name(&self) -> &'static str {
        "amount"
    }

    async fn validate(
        &self,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> Result<bool> {
        let file = document.file_name();
        let amount = document
            .value_of(tags::AMOUNT)
            .and_then(|raw| Decimal::from_str(&raw).ok());

        let message = match amount {
            None => format!("В файле {file} не найдена сумма платежа или сумма некорректна"),
            Some(amount) if amount < self.min => {
                format!("В файле {file} сумма платежа не соответствует минимальной")
            }
            Some(amount) if amount > self.max => {
                format!("В файле {file} сумма платежа не соответствует максимальной")
            }
            Some(_) => return Ok(true),
        };
        context.add_message(message, &[tags::AMOUNT]);
        Ok(false)
    }
}
