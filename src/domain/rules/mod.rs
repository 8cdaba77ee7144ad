//! Business rules applied to a document after it has passed the schema check.
//!
//! Rules never short-circuit each other: every rule in a [`RuleSet`] runs and
//! records its own failures in the shared [`ValidationContext`].

pub mod amount;
pub mod currency;
pub mod duplicate;
pub mod ipv4;
pub mod pay_info;
pub mod payment_date;
pub mod single_payer;

use super::context::ValidationContext;
use super::document::ParsedDocument;
use crate::error::Result;
use async_trait::async_trait;

pub use amount::AmountRule;
pub use currency::CurrencyRule;
pub use duplicate::DuplicateRule;
pub use ipv4::Ipv4Rule;
pub use pay_info::PayInfoRule;
pub use payment_date::PaymentDateRule;
pub use single_payer::SinglePayerCheck;

/// A single-document check.
///
/// Returns `Ok(false)` after adding a message to the context when the document
/// breaks the rule. `Err` is reserved for failures of external capabilities.
#[async_trait]
pub trait DocumentRule: Send + Sync {
    fn name(&self) -> &'static str;

    async fn validate(
        &self,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> Result<bool>;
}

/// Ordered collection of rules run by the pipeline.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn DocumentRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl DocumentRule + 'static) -> Self {
        self.register(Box::new(rule));
        self
    }

    pub fn register(&mut self, rule: Box<dyn DocumentRule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Runs every rule, in registration order. Returns `true` if all passed.
    pub async fn validate_all(
        &self,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> Result<bool> {
        let mut passed = true;
        for rule in &self.rules {
            if !rule.validate(document, context).await? {
                tracing::debug!(rule = rule.name(), file = %document.file_name(), "rule failed");
                passed = false;
            }
        }
        Ok(passed)
    }
}
