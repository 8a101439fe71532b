//! Static constructor metadata for result types.
//!
//! A `TypeDescriptor<T>` lists every way to build a `T` from a row: the
//! ordered, typed parameters of each constructor and a function that calls
//! it. Descriptors are built once per type, either through
//! [`TypeDescriptor::builder`] or by the `#[auto_constructors]` attribute
//! macro, and never change afterwards.

use std::fmt;

use crate::convert::FromValue;
use crate::error::MappingError;
use crate::value::Value;

/// Scalar category of a column value or a constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Char,
    Str,
    Decimal,
    Timestamp,
    Bytes,
    /// A parameter type no column can feed (no value conversion exists).
    Opaque(&'static str),
}

impl ScalarKind {
    /// Whether a parameter of kind `self` can take a column of kind `column`.
    ///
    /// Exact kinds always match. With `widening`, integers and floats are
    /// accepted by any wider type that represents every value exactly.
    pub fn accepts(self, column: ScalarKind, widening: bool) -> bool {
        use ScalarKind::*;

        if let Opaque(_) = self {
            return false;
        }
        if self == column {
            return true;
        }
        match (column, self) {
            (Char, Str) => true,
            _ if !widening => false,
            (I8, I16 | I32 | I64 | F32 | F64 | Decimal) => true,
            (I16, I32 | I64 | F32 | F64 | Decimal) => true,
            (I32, I64 | F64 | Decimal) => true,
            (I64, Decimal) => true,
            (F32, F64) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::Char => "char",
            ScalarKind::Str => "String",
            ScalarKind::Decimal => "Decimal",
            ScalarKind::Timestamp => "Timestamp",
            ScalarKind::Bytes => "Vec<u8>",
            ScalarKind::Opaque(name) => name,
        };
        f.write_str(name)
    }
}

/// Declared type of a constructor parameter.
///
/// `nullable == false` is the primitive slot: a `NULL` column value can
/// never be bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamType {
    pub kind: ScalarKind,
    pub nullable: bool,
}

impl ParamType {
    pub const fn required(kind: ScalarKind) -> Self {
        Self { kind, nullable: false }
    }

    pub const fn nullable(kind: ScalarKind) -> Self {
        Self { kind, nullable: true }
    }

    pub const fn opaque(name: &'static str) -> Self {
        Self::required(ScalarKind::Opaque(name))
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// One constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Parameter name. `None` for positional-only parameters.
    pub name: Option<String>,
    /// Explicit column this parameter is mapped to.
    pub column: Option<String>,
    pub param_type: ParamType,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: Some(name.into()),
            column: None,
            param_type,
        }
    }

    pub fn positional(param_type: ParamType) -> Self {
        Self {
            name: None,
            column: None,
            param_type,
        }
    }

    /// Parameter of the Rust type `P`, typed by its `FromValue` impl.
    pub fn of<P: FromValue>(name: impl Into<String>) -> Self {
        Self::new(name, P::PARAM_TYPE)
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Column name used for name-based binding: the declared mapping if
    /// any, otherwise the parameter name.
    pub fn binding_name(&self) -> Option<&str> {
        self.column.as_deref().or(self.name.as_deref())
    }
}

impl fmt::Display for ParamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.param_type),
            None => write!(f, "_: {}", self.param_type),
        }
    }
}

/// Arguments handed to a constructor function, in parameter order.
pub struct Args {
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Take the next argument, converted to `P`.
    pub fn next<P: FromValue>(&mut self) -> Result<P, MappingError> {
        let position = self.position;
        self.position += 1;
        let value = self
            .values
            .next()
            .ok_or_else(|| MappingError::conversion(format!("missing argument #{position}")))?;
        P::from_value(value).map_err(|e| e.with_context(format_args!("argument #{position}")))
    }
}

type BuildFn<T> = Box<dyn Fn(Args) -> Result<T, MappingError> + Send + Sync>;

/// One way to construct a `T`.
pub struct ConstructorDescriptor<T> {
    name: String,
    params: Vec<ParamDescriptor>,
    automap: bool,
    build: BuildFn<T>,
}

impl<T> ConstructorDescriptor<T> {
    pub fn new<F>(name: impl Into<String>, params: Vec<ParamDescriptor>, build: F) -> Self
    where
        F: Fn(Args) -> Result<T, MappingError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params,
            automap: false,
            build: Box::new(build),
        }
    }

    /// Mark this constructor as the explicit mapping target.
    pub fn automap(mut self) -> Self {
        self.automap = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_automap(&self) -> bool {
        self.automap
    }

    /// Call the constructor. `values` must be in parameter order.
    pub fn invoke(&self, values: Vec<Value>) -> Result<T, MappingError> {
        (self.build)(Args::new(values))
    }
}

impl<T> fmt::Debug for ConstructorDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("automap", &self.automap)
            .finish()
    }
}

impl<T> fmt::Display for ConstructorDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")
    }
}

/// Every constructor of a result type.
#[derive(Debug)]
pub struct TypeDescriptor<T> {
    type_name: String,
    constructors: Vec<ConstructorDescriptor<T>>,
}

impl<T> TypeDescriptor<T> {
    pub fn builder(type_name: impl Into<String>) -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            type_name: type_name.into(),
            constructors: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn constructors(&self) -> &[ConstructorDescriptor<T>] {
        &self.constructors
    }
}

pub struct TypeDescriptorBuilder<T> {
    type_name: String,
    constructors: Vec<ConstructorDescriptor<T>>,
}

impl<T> TypeDescriptorBuilder<T> {
    pub fn constructor(mut self, constructor: ConstructorDescriptor<T>) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn build(self) -> TypeDescriptor<T> {
        TypeDescriptor {
            type_name: self.type_name,
            constructors: self.constructors,
        }
    }
}

/// A type that carries its own, lazily built, constructor table.
///
/// Implemented by `#[auto_constructors]`; can be written by hand with a
/// `OnceLock` static.
pub trait AutoConstruct: Sized + 'static {
    fn descriptor() -> &'static TypeDescriptor<Self>;
}
