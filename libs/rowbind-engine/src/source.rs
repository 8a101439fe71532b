use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::Engine as _;
use serde::Deserialize;

use rowbind_api::error::SourceError;
use rowbind_api::schema::{Column, ColumnType, Schema};
use rowbind_api::source::{ResultSet, RowQuery, RowSource};
use rowbind_api::value::{Row, Value};

/// A table as written in a JSON dataset file.
#[derive(Debug, Deserialize)]
struct TableSpec {
    name: String,
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct DatasetSpec {
    #[serde(default)]
    tables: Vec<TableSpec>,
}

#[derive(Debug, Clone)]
struct Table {
    schema: Schema,
    rows: Vec<Row>,
}

/// In-memory tables. Stands in for a database in tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryRowSource {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON dataset file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SourceError::from(e).with_context(path.display()))?;
        Self::from_json_str(&content).map_err(|e| e.with_context(path.display()))
    }

    /// Parse a JSON dataset: `{"tables": [{"name", "columns", "rows"}]}`.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let spec: DatasetSpec = serde_json::from_str(json)?;
        let source = Self::new();
        for table in spec.tables {
            let ctx = format!("table '{}'", table.name);
            let schema = Schema::new(table.columns);
            let rows = table
                .rows
                .iter()
                .enumerate()
                .map(|(i, raw)| {
                    row_from_json(&schema, raw).map_err(|e| e.with_context(format!("row {i}")))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.with_context(&ctx))?;
            source.insert_table(table.name, schema, rows)?;
        }
        Ok(source)
    }

    /// Register (or replace) a table. Every row must match the schema width.
    pub fn insert_table(
        &self,
        name: impl Into<String>,
        schema: Schema,
        rows: Vec<Row>,
    ) -> Result<(), SourceError> {
        let name = name.into();
        if let Some(bad) = rows.iter().position(|r| r.len() != schema.len()) {
            return Err(SourceError::schema(format!(
                "table '{name}': row {bad} has {} values, schema has {} columns",
                rows[bad].len(),
                schema.len()
            )));
        }
        tracing::debug!(table = %name, columns = schema.len(), rows = rows.len(), "registered table");
        self.write().insert(name, Table { schema, rows });
        Ok(())
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Table>> {
        match self.tables.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("row source read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Table>> {
        match self.tables.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("row source write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl RowSource for MemoryRowSource {
    fn fetch(&self, query: &RowQuery) -> Result<ResultSet, SourceError> {
        let tables = self.read();
        let table = tables
            .get(&query.table)
            .ok_or_else(|| SourceError::schema(format!("table not found: {}", query.table)))?;

        let projection: Vec<usize> = if query.columns.is_empty() {
            (0..table.schema.len()).collect()
        } else {
            query
                .columns
                .iter()
                .map(|c| column_index(&table.schema, &query.table, c))
                .collect::<Result<_, _>>()?
        };

        let filter = match &query.filter {
            Some((column, value)) => {
                let index = column_index(&table.schema, &query.table, column)?;
                check_filter_kind(&table.schema.columns[index], value)?;
                Some((index, value))
            }
            None => None,
        };

        let schema = Schema::new(
            projection
                .iter()
                .map(|&i| table.schema.columns[i].clone())
                .collect(),
        );

        let limit = query.limit.unwrap_or(usize::MAX);
        let rows: Vec<Row> = table
            .rows
            .iter()
            .filter(|row| match filter {
                Some((index, wanted)) => !wanted.is_null() && row.0[index] == *wanted,
                None => true,
            })
            .take(limit)
            .map(|row| Row(projection.iter().map(|&i| row.0[i].clone()).collect()))
            .collect();

        tracing::trace!(table = %query.table, rows = rows.len(), "fetched rows");
        Ok(ResultSet::new(schema, rows))
    }

    fn table_schema(&self, table: &str) -> Option<Schema> {
        self.read().get(table).map(|t| t.schema.clone())
    }
}

fn column_index(schema: &Schema, table: &str, column: &str) -> Result<usize, SourceError> {
    schema
        .index_of(column)
        .ok_or_else(|| SourceError::schema(format!("column '{column}' not found in table '{table}'")))
}

/// Equality is exact, so the filter value must have the column's own kind.
fn check_filter_kind(column: &Column, value: &Value) -> Result<(), SourceError> {
    match value.kind() {
        Some(kind) if kind != column.column_type.scalar_kind() => {
            Err(SourceError::schema(format!(
                "cannot compare column '{}' ({}) with {value}",
                column.name, column.column_type
            )))
        }
        _ => Ok(()),
    }
}

fn row_from_json(schema: &Schema, raw: &[serde_json::Value]) -> Result<Row, SourceError> {
    if raw.len() != schema.len() {
        return Err(SourceError::schema(format!(
            "{} values for {} columns",
            raw.len(),
            schema.len()
        )));
    }
    schema
        .columns
        .iter()
        .zip(raw)
        .map(|(column, json)| {
            value_from_json(column, json).map_err(|e| e.with_context(format!("column '{}'", column.name)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Row)
}

/// Convert a JSON value into a typed column value.
pub fn value_from_json(column: &Column, json: &serde_json::Value) -> Result<Value, SourceError> {
    use serde_json::Value as Json;

    if json.is_null() {
        if !column.nullable {
            return Err(SourceError::schema("NULL in a NOT NULL column"));
        }
        return Ok(Value::Null);
    }

    let unexpected = || SourceError::format(format!("expected {}, got {json}", column.column_type));

    let value = match column.column_type {
        ColumnType::TinyInt => Value::Int8(int_in_range(json)?),
        ColumnType::SmallInt => Value::Int16(int_in_range(json)?),
        ColumnType::Integer => Value::Int32(int_in_range(json)?),
        ColumnType::BigInt => Value::Int64(json.as_i64().ok_or_else(unexpected)?),
        // JSON numbers are f64; narrowing to REAL is the column's own precision.
        ColumnType::Real => Value::Float32(json.as_f64().ok_or_else(unexpected)? as f32),
        ColumnType::Double => Value::Float64(json.as_f64().ok_or_else(unexpected)?),
        ColumnType::Boolean => match json {
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) if n.as_i64() == Some(0) => Value::Bool(false),
            Json::Number(n) if n.as_i64() == Some(1) => Value::Bool(true),
            _ => return Err(unexpected()),
        },
        ColumnType::Char => {
            let s = json.as_str().ok_or_else(unexpected)?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return Err(unexpected()),
            }
        }
        ColumnType::Varchar | ColumnType::Clob => {
            Value::String(json.as_str().ok_or_else(unexpected)?.to_string())
        }
        ColumnType::Blob => {
            let encoded = json.as_str().ok_or_else(unexpected)?;
            Value::Bytes(base64::engine::general_purpose::STANDARD.decode(encoded)?)
        }
        ColumnType::Decimal => {
            let text = match json {
                Json::String(s) => s.clone(),
                Json::Number(n) => n.to_string(),
                _ => return Err(unexpected()),
            };
            let (value, scale) = parse_decimal(&text).ok_or_else(unexpected)?;
            Value::Decimal(value, scale)
        }
        ColumnType::Timestamp => Value::Timestamp(json.as_i64().ok_or_else(unexpected)?),
    };
    Ok(value)
}

/// Inverse of [`value_from_json`], in the dataset's own encoding.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Value::Int8(v) => Json::from(*v),
        Value::Int16(v) => Json::from(*v),
        Value::Int32(v) => Json::from(*v),
        Value::Int64(v) => Json::from(*v),
        Value::Float32(v) => Json::from(f64::from(*v)),
        Value::Float64(v) => Json::from(*v),
        Value::Bool(v) => Json::Bool(*v),
        Value::Char(c) => Json::String(c.to_string()),
        Value::Decimal(..) => Json::String(value.to_string()),
        Value::Timestamp(micros) => Json::from(*micros),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(base64::engine::general_purpose::STANDARD.encode(b)),
        Value::Null => Json::Null,
    }
}

fn int_in_range<T: TryFrom<i64>>(json: &serde_json::Value) -> Result<T, SourceError> {
    let n = json
        .as_i64()
        .ok_or_else(|| SourceError::format(format!("expected integer, got {json}")))?;
    T::try_from(n).map_err(|_| SourceError::format(format!("{n} is out of range")))
}

/// `"-12.340"` → `(-12340, 3)`.
fn parse_decimal(text: &str) -> Option<(i128, u8)> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    let scale = u8::try_from(frac_part.len()).ok()?;
    if !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits = format!("{int_part}{frac_part}");
    digits.parse::<i128>().ok().map(|v| (v, scale))
}
