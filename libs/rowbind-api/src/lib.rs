pub mod convert;
pub mod descriptor;

pub use rowbind_api_derive::auto_constructors;
pub mod error;
pub mod schema;
pub mod source;
pub mod value;

pub use convert::FromValue;
pub use descriptor::{
    Args, AutoConstruct, ConstructorDescriptor, ParamDescriptor, ParamType, ScalarKind,
    TypeDescriptor,
};
pub use error::{MappingError, MappingErrorKind, SourceError};
pub use schema::{Column, ColumnType, Schema};
pub use source::{ResultSet, RowQuery, RowSource};
pub use value::{Decimal, Row, Timestamp, Value};
