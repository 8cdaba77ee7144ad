use crate::domain::context::ValidationContext;
use crate::domain::document::{ParsedDocument, tags};

/// Cross-document check: every document of a batch must carry the payer of
/// the first document.
///
/// A mismatch invalidates the merge target, so the pipeline ends the whole
/// batch on it.
pub struct SinglePayerCheck;

impl SinglePayerCheck {
    pub fn validate(
        &self,
        canonical_payer: Option<&str>,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> bool {
        if document.value_of(tags::PAYER).as_deref() == canonical_payer {
            return true;
        }
        context.add_message(
            "Данные файлы не могут быть объединены, т.к. обнаружены разные плательщики",
            &[tags::PAYER],
        );
        false
    }
}
