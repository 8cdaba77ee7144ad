use super::DocumentRule;
use crate::domain::context::ValidationContext;
use crate::domain::document::{ParsedDocument, tags};
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])\.){3}([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])$",
    )
    .expect("IPv4 pattern is valid")
});

pub struct Ipv4Rule;

#[async_trait]
impl DocumentRule for Ipv4Rule {
    fn name(&self) -> &'static str {
        "ipv4"
    }

    async fn validate(
        &self,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> Result<bool> {
        if document
            .value_of(tags::IP)
            .is_some_and(|ip| IPV4.is_match(&ip))
        {
            return Ok(true);
        }
        context.add_message("IP адрес не соответствует формату IPv4", &[tags::IP]);
        Ok(false)
    }
}
