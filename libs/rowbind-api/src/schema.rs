use std::fmt;

use crate::descriptor::ScalarKind;

/// Declared SQL type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Boolean,
    Char,
    Varchar,
    Clob,
    Blob,
    Timestamp,
}

impl ColumnType {
    /// Scalar kind a value of this column carries.
    pub fn scalar_kind(self) -> ScalarKind {
        match self {
            ColumnType::TinyInt => ScalarKind::I8,
            ColumnType::SmallInt => ScalarKind::I16,
            ColumnType::Integer => ScalarKind::I32,
            ColumnType::BigInt => ScalarKind::I64,
            ColumnType::Real => ScalarKind::F32,
            ColumnType::Double => ScalarKind::F64,
            ColumnType::Decimal => ScalarKind::Decimal,
            ColumnType::Boolean => ScalarKind::Bool,
            ColumnType::Char => ScalarKind::Char,
            ColumnType::Varchar | ColumnType::Clob => ScalarKind::Str,
            ColumnType::Blob => ScalarKind::Bytes,
            ColumnType::Timestamp => ScalarKind::Timestamp,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::TinyInt => "TINYINT",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Real => "REAL",
            ColumnType::Double => "DOUBLE",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Char => "CHAR",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Clob => "CLOB",
            ColumnType::Blob => "BLOB",
            ColumnType::Timestamp => "TIMESTAMP",
        };
        f.write_str(name)
    }
}

/// A single column of a result set.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Column layout shared by every row of one result set.
///
/// Column position in `columns` determines its index: position in
/// `Row(Vec<Value>)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Case-insensitive lookup by column name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", c.name, c.column_type)?;
        }
        f.write_str(")")
    }
}
