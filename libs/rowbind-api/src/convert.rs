use crate::descriptor::{ParamType, ScalarKind};
use crate::error::MappingError;
use crate::value::{Decimal, Timestamp, Value};

/// Conversion from a column value into a constructor parameter type.
///
/// `PARAM_TYPE` is what the resolver matches columns against; `from_value`
/// must accept every value whose kind `PARAM_TYPE.kind` accepts.
/// Implement it for your own types to make them usable as parameters.
pub trait FromValue: Sized {
    const PARAM_TYPE: ParamType;

    fn from_value(value: Value) -> Result<Self, MappingError>;
}

fn mismatch(expected: ScalarKind, value: &Value) -> MappingError {
    match value {
        Value::Null => MappingError::null_to_primitive(format!("NULL cannot be bound to {expected}")),
        other => MappingError::conversion(format!("cannot convert {other} to {expected}")),
    }
}

macro_rules! from_value {
    ($ty:ty, $kind:ident, |$v:ident| { $($pat:pat => $expr:expr),+ $(,)? }) => {
        impl FromValue for $ty {
            const PARAM_TYPE: ParamType = ParamType::required(ScalarKind::$kind);

            fn from_value($v: Value) -> Result<Self, MappingError> {
                match $v {
                    $($pat => Ok($expr),)+
                    other => Err(mismatch(ScalarKind::$kind, &other)),
                }
            }
        }
    };
}

from_value!(i8, I8, |v| { Value::Int8(x) => x });
from_value!(i16, I16, |v| {
    Value::Int8(x) => i16::from(x),
    Value::Int16(x) => x,
});
from_value!(i32, I32, |v| {
    Value::Int8(x) => i32::from(x),
    Value::Int16(x) => i32::from(x),
    Value::Int32(x) => x,
});
from_value!(i64, I64, |v| {
    Value::Int8(x) => i64::from(x),
    Value::Int16(x) => i64::from(x),
    Value::Int32(x) => i64::from(x),
    Value::Int64(x) => x,
});
from_value!(f32, F32, |v| {
    Value::Int8(x) => f32::from(x),
    Value::Int16(x) => f32::from(x),
    Value::Float32(x) => x,
});
from_value!(f64, F64, |v| {
    Value::Int8(x) => f64::from(x),
    Value::Int16(x) => f64::from(x),
    Value::Int32(x) => f64::from(x),
    Value::Float32(x) => f64::from(x),
    Value::Float64(x) => x,
});
from_value!(bool, Bool, |v| { Value::Bool(x) => x });
from_value!(char, Char, |v| { Value::Char(x) => x });
from_value!(String, Str, |v| {
    Value::String(x) => x,
    Value::Char(x) => x.to_string(),
});
from_value!(Vec<u8>, Bytes, |v| { Value::Bytes(x) => x });
from_value!(Timestamp, Timestamp, |v| { Value::Timestamp(x) => Timestamp::from_micros(x) });
from_value!(Decimal, Decimal, |v| {
    Value::Int8(x) => Decimal::new(i128::from(x), 0),
    Value::Int16(x) => Decimal::new(i128::from(x), 0),
    Value::Int32(x) => Decimal::new(i128::from(x), 0),
    Value::Int64(x) => Decimal::new(i128::from(x), 0),
    Value::Decimal(x, scale) => Decimal::new(x, scale),
});

/// The nullable ("wrapper") form of `T`: `NULL` becomes `None`.
impl<T: FromValue> FromValue for Option<T> {
    const PARAM_TYPE: ParamType = ParamType::nullable(T::PARAM_TYPE.kind);

    fn from_value(value: Value) -> Result<Self, MappingError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
