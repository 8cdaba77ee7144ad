use super::DocumentRule;
use crate::domain::context::ValidationContext;
use crate::domain::document::{ParsedDocument, tags};
use crate::error::Result;
use async_trait::async_trait;

pub struct CurrencyRule {
    code: String,
}

impl CurrencyRule {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[async_trait]
impl DocumentRule for CurrencyRule {
    fn name(&self) -> &'static str {
        "currency"
    }

    async fn validate(
        &self,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> Result<bool> {
        if document.value_of(tags::CURR_CODE).as_deref() == Some(self.code.as_str()) {
            return Ok(true);
        }
        context.add_message(
            format!("Допустимое значение кода валюты {}", self.code),
            &[tags::CURR_CODE],
        );
        Ok(false)
    }
}
