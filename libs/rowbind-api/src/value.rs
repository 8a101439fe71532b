use std::fmt;

use crate::descriptor::ScalarKind;

/// Canonical column value, as produced by a row source.
///
/// Strategy by type:
/// - Integers and floats keep the width of the column they came from, so
///   widening into a parameter is an explicit decision of the resolver.
/// - Decimal, Timestamp: eager, fixed binary layout.
/// - String, Bytes: owned, a row is consumed once per resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Char(char),
    /// `(value, scale)`.
    Decimal(i128, u8),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),

    String(String),
    /// Opaque binary data (BLOB).
    Bytes(Vec<u8>),

    Null,
}

impl Value {
    /// Scalar kind carried by this value. `None` for `Null`.
    pub fn kind(&self) -> Option<ScalarKind> {
        Some(match self {
            Value::Int8(_) => ScalarKind::I8,
            Value::Int16(_) => ScalarKind::I16,
            Value::Int32(_) => ScalarKind::I32,
            Value::Int64(_) => ScalarKind::I64,
            Value::Float32(_) => ScalarKind::F32,
            Value::Float64(_) => ScalarKind::F64,
            Value::Bool(_) => ScalarKind::Bool,
            Value::Char(_) => ScalarKind::Char,
            Value::Decimal(..) => ScalarKind::Decimal,
            Value::Timestamp(_) => ScalarKind::Timestamp,
            Value::String(_) => ScalarKind::Str,
            Value::Bytes(_) => ScalarKind::Bytes,
            Value::Null => return None,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "'{v}'"),
            Value::Decimal(v, scale) => write!(f, "{}", Decimal::new(*v, *scale)),
            Value::Timestamp(v) => write!(f, "ts({v})"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Null => f.write_str("NULL"),
        }
    }
}

/// Fixed-point decimal: `value * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    pub value: i128,
    pub scale: u8,
}

impl Decimal {
    pub const fn new(value: i128, scale: u8) -> Self {
        Self { value, scale }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.value);
        }
        let Some(divisor) = 10u128.checked_pow(u32::from(self.scale)) else {
            return write!(f, "{}e-{}", self.value, self.scale);
        };
        let sign = if self.value < 0 { "-" } else { "" };
        let abs = self.value.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / divisor,
            abs % divisor,
            width = usize::from(self.scale)
        )
    }
}

/// Point in time, microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub micros: i64,
}

impl Timestamp {
    pub const fn from_micros(micros: i64) -> Self {
        Self { micros }
    }
}

/// Positional array of values. Order matches `Schema.columns`.
///
/// Values only, no names or types. Column metadata lives in the `Schema`
/// of the enclosing `ResultSet`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}
