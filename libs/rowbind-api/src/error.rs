use std::fmt;

/// Why a row could not be turned into an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingErrorKind {
    /// More than one constructor fits the row shape.
    AmbiguousConstructor,
    /// No constructor's arity or types fit the row shape.
    NoMatchingConstructor,
    /// A `NULL` column value maps to a non-nullable parameter.
    NullToPrimitiveParameter,
    /// A value does not fit its declared parameter type.
    Conversion,
}

impl fmt::Display for MappingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingErrorKind::AmbiguousConstructor => f.write_str("ambiguous constructor"),
            MappingErrorKind::NoMatchingConstructor => f.write_str("no matching constructor"),
            MappingErrorKind::NullToPrimitiveParameter => f.write_str("null to primitive parameter"),
            MappingErrorKind::Conversion => f.write_str("conversion"),
        }
    }
}

/// Mapping failure. Never accompanied by a partially built object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingError {
    pub kind: MappingErrorKind,
    pub message: String,
}

impl MappingError {
    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self { kind: MappingErrorKind::AmbiguousConstructor, message: msg.into() }
    }

    pub fn no_match(msg: impl Into<String>) -> Self {
        Self { kind: MappingErrorKind::NoMatchingConstructor, message: msg.into() }
    }

    pub fn null_to_primitive(msg: impl Into<String>) -> Self {
        Self { kind: MappingErrorKind::NullToPrimitiveParameter, message: msg.into() }
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self { kind: MappingErrorKind::Conversion, message: msg.into() }
    }

    /// Add context to the error, preserving the original kind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for MappingError {}

/// Error kind for row source errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Schema,
}

/// Row source error, returned by all `RowSource` methods.
#[derive(Debug)]
pub struct SourceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Schema, message: msg.into() }
    }

    /// Add context to the error, preserving the original ErrorKind.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SourceError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → SourceError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        Self::format(e.to_string())
    }
}

impl From<base64::DecodeError> for SourceError {
    fn from(e: base64::DecodeError) -> Self {
        Self::format(e.to_string())
    }
}
