//! XML Schema validation backed by libxml2.

use crate::domain::document::ParsedDocument;
use crate::domain::ports::{DocumentSchema, SchemaCompiler, SchemaViolation};
use crate::error::{EngineError, Result};
use libxml::error::StructuredError;
use libxml::parser::Parser;
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Compiles `.xsd` sources with libxml2.
#[derive(Debug, Default, Clone, Copy)]
pub struct XsdCompiler;

impl SchemaCompiler for XsdCompiler {
    fn compile(&self, source: &[u8]) -> Result<Arc<dyn DocumentSchema>> {
        let mut parser = SchemaParserContext::from_buffer(source);
        let context = SchemaValidationContext::from_parser(&mut parser)
            .map_err(|errors| EngineError::SchemaCompileError(describe_all(&errors)))?;
        Ok(Arc::new(CompiledSchema {
            handle: Mutex::new(ValidationHandle(context)),
        }))
    }
}

/// Owns a libxml2 schema together with its validation context.
struct ValidationHandle(SchemaValidationContext);

// SAFETY: the handle exclusively owns its libxml2 schema and validation
// context, which are not tied to the creating thread. It is only reached
// through the mutex of `CompiledSchema`, so it is never used concurrently.
unsafe impl Send for ValidationHandle {}

/// A schema compiled once per batch and reused for every document.
pub struct CompiledSchema {
    handle: Mutex<ValidationHandle>,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema").finish_non_exhaustive()
    }
}

impl DocumentSchema for CompiledSchema {
    fn check(&self, document: &ParsedDocument) -> std::result::Result<(), SchemaViolation> {
        let instance = Parser::default()
            .parse_string(document.raw())
            .map_err(|e| SchemaViolation {
                line: None,
                reason: format!("document could not be loaded: {e:?}"),
            })?;

        let mut handle = self
            .handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handle.0.validate_document(&instance).map_err(|errors| {
            errors.first().map(violation).unwrap_or_else(|| SchemaViolation {
                line: None,
                reason: "document does not match the schema".to_string(),
            })
        })
    }
}

fn describe(error: &StructuredError) -> String {
    error
        .message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or("unknown libxml2 error")
        .to_string()
}

fn describe_all(errors: &[StructuredError]) -> String {
    if errors.is_empty() {
        return "schema is not valid".to_string();
    }
    errors.iter().map(describe).collect::<Vec<_>>().join("; ")
}

fn violation(error: &StructuredError) -> SchemaViolation {
    SchemaViolation {
        line: error.line.and_then(|line| u32::try_from(line).ok()),
        reason: describe(error),
    }
}
