use rowbind_api::error::{MappingError, SourceError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Every constructor-resolution failure surfaces through this variant.
    #[error("mapping failed for statement '{statement}': {source}")]
    Mapping {
        statement: String,
        #[source]
        source: MappingError,
    },

    #[error("statement not found: {0}")]
    StatementNotFound(String),

    #[error("statement '{statement}': {detail}")]
    Parameter { statement: String, detail: String },

    #[error("statement '{statement}' returned {count} rows where at most one was expected")]
    TooManyResults { statement: String, count: usize },
}

impl EngineError {
    /// Prepend context to `Source` and `Config` messages.
    ///
    /// The other variants already name their statement and pass through
    /// unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Source(e) => EngineError::Source(e.with_context(ctx)),
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }

    /// The underlying mapping failure, if this is one.
    pub fn mapping_error(&self) -> Option<&MappingError> {
        match self {
            EngineError::Mapping { source, .. } => Some(source),
            _ => None,
        }
    }
}
