use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum EngineError {
    #[error("{0}")]
    #[diagnostic(code(paymerge::file_set))]
    FileSetError(String),
    #[error("Schema could not be compiled: {0}")]
    #[diagnostic(code(paymerge::schema_compile))]
    SchemaCompileError(String),
    #[error("{0}")]
    #[diagnostic(code(paymerge::validation))]
    ValidationError(String),
    #[error("Merged document is {size} bytes, which exceeds the limit of {limit} bytes")]
    #[diagnostic(
        code(paymerge::size_limit),
        help("split the payment documents into smaller batches")
    )]
    SizeLimitExceeded { size: u64, limit: u64 },
    #[error("Merge error: {0}")]
    #[diagnostic(code(paymerge::merge))]
    MergeError(String),
    #[error("Configuration error: {0}")]
    #[diagnostic(code(paymerge::config))]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("XML error: {0}")]
    XmlError(String),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, EngineError>;
