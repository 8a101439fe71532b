use crate::error::SourceError;
use crate::schema::Schema;
use crate::value::{Row, Value};

/// Rows produced by one statement execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parameters for a fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowQuery {
    pub table: String,
    /// Projected columns, in output order. Empty means all columns.
    pub columns: Vec<String>,
    /// Equality filter `(column, value)`. `NULL` matches nothing.
    pub filter: Option<(String, Value)>,
    pub limit: Option<usize>,
}

impl RowQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, column: impl Into<String>, value: Value) -> Self {
        self.filter = Some((column.into(), value));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Row-fetch collaborator.
///
/// The engine doesn't know concrete implementations; for the engine a
/// source is just this trait. Rows come back typed per column.
pub trait RowSource: Send + Sync {
    /// Fetch rows according to the query.
    fn fetch(&self, query: &RowQuery) -> Result<ResultSet, SourceError>;

    /// Column layout of a table, if the source knows it.
    /// The engine calls this at startup to validate statements.
    fn table_schema(&self, table: &str) -> Option<Schema>;
}
