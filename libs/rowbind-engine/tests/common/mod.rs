#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::OnceLock;

use rowbind_api::descriptor::{ParamType, ScalarKind};
use rowbind_api::{auto_constructors, FromValue, MappingError, Timestamp, Value};
use rowbind_engine::{RowbindConfig, SessionFactory};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn config() -> RowbindConfig {
    RowbindConfig::load(fixture("autoconstructor.toml")).expect("load fixture config")
}

/// Factory over the fixture dataset, built once per test binary.
pub fn factory() -> &'static SessionFactory {
    static FACTORY: OnceLock<SessionFactory> = OnceLock::new();
    FACTORY.get_or_init(|| SessionFactory::from_config(config()).expect("build session factory"))
}

/// Every column nullable except the `NOT NULL` ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: i32,
    pub name: Option<String>,
    pub age: i32,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub active: bool,
    pub dt: Option<Timestamp>,
}

#[auto_constructors]
impl Subject {
    pub fn new(
        id: i32,
        name: Option<String>,
        age: i32,
        height: Option<i32>,
        weight: Option<i32>,
        active: bool,
        dt: Option<Timestamp>,
    ) -> Self {
        Self { id, name, age, height, weight, active, dt }
    }
}

/// `height` and `weight` are primitive slots; rows with NULL there fail.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSubject {
    pub id: i32,
    pub name: Option<String>,
    pub age: i32,
    pub height: i32,
    pub weight: i32,
    pub active: bool,
    pub dt: Option<Timestamp>,
}

#[auto_constructors]
impl PrimitiveSubject {
    pub fn new(
        id: i32,
        name: Option<String>,
        age: i32,
        height: i32,
        weight: i32,
        active: bool,
        dt: Option<Timestamp>,
    ) -> Self {
        Self { id, name, age, height, weight, active, dt }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSubject {
    pub id: i32,
    pub name: Option<String>,
    pub age: i32,
    pub height: Option<i32>,
    pub weight: Option<i32>,
}

#[auto_constructors]
impl AnnotatedSubject {
    pub fn new(id: i32, name: Option<String>, age: i32, height: i32, weight: i32) -> Self {
        Self { id, name, age, height: Some(height), weight: Some(weight) }
    }

    #[automap]
    pub fn nullable(
        id: i32,
        name: Option<String>,
        age: i32,
        height: Option<i32>,
        weight: Option<i32>,
    ) -> Self {
        Self { id, name, age, height, weight }
    }
}

/// Same constructors as `AnnotatedSubject`, none marked.
#[derive(Debug, Clone, PartialEq)]
pub struct UnannotatedSubject {
    pub id: i32,
    pub height: Option<i32>,
}

#[auto_constructors]
impl UnannotatedSubject {
    pub fn new(id: i32, _name: Option<String>, _age: i32, height: i32, _weight: i32) -> Self {
        Self { id, height: Some(height) }
    }

    pub fn nullable(
        id: i32,
        _name: Option<String>,
        _age: i32,
        height: Option<i32>,
        _weight: Option<i32>,
    ) -> Self {
        Self { id, height }
    }
}

/// A parameter type no column converts to.
#[derive(Debug, Clone, PartialEq)]
pub struct Height(pub i32);

impl FromValue for Height {
    const PARAM_TYPE: ParamType = ParamType::opaque("Height");

    fn from_value(value: Value) -> Result<Self, MappingError> {
        Err(MappingError::conversion(format!("no conversion from {value} to Height")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadSubject {
    pub id: i32,
    pub height: Height,
    pub weight: Option<f64>,
}

#[auto_constructors]
impl BadSubject {
    pub fn new(id: i32, _name: Option<String>, _age: i32, height: Height, weight: Option<f64>) -> Self {
        Self { id, height, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestEnum {
    AValue,
    BValue,
    CValue,
}

impl FromValue for TestEnum {
    const PARAM_TYPE: ParamType = ParamType::required(ScalarKind::Str);

    fn from_value(value: Value) -> Result<Self, MappingError> {
        match String::from_value(value)?.as_str() {
            "AVALUE" => Ok(TestEnum::AValue),
            "BVALUE" => Ok(TestEnum::BValue),
            "CVALUE" => Ok(TestEnum::CValue),
            other => Err(MappingError::conversion(format!("unknown TestEnum '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtensiveSubject {
    pub a_byte: i8,
    pub a_short: i16,
    pub a_char: char,
    pub an_int: i32,
    pub a_long: i64,
    pub a_float: f32,
    pub a_double: f64,
    pub a_boolean: bool,
    pub a_string: String,
    pub an_enum: TestEnum,
    pub a_clob: String,
    pub a_blob: Vec<u8>,
    pub a_timestamp: Timestamp,
}

#[auto_constructors]
impl ExtensiveSubject {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        a_byte: i8,
        a_short: i16,
        a_char: char,
        an_int: i32,
        a_long: i64,
        a_float: f32,
        a_double: f64,
        a_boolean: bool,
        a_string: String,
        an_enum: TestEnum,
        a_clob: String,
        a_blob: Vec<u8>,
        a_timestamp: Timestamp,
    ) -> Self {
        Self {
            a_byte,
            a_short,
            a_char,
            an_int,
            a_long,
            a_float,
            a_double,
            a_boolean,
            a_string,
            an_enum,
            a_clob,
            a_blob,
            a_timestamp,
        }
    }

    pub fn short(a_byte: i8, a_string: String) -> Self {
        Self::new(
            a_byte,
            0,
            ' ',
            0,
            0,
            0.0,
            0.0,
            false,
            a_string,
            TestEnum::AValue,
            String::new(),
            Vec::new(),
            Timestamp::from_micros(0),
        )
    }

    #[skip]
    pub fn is_first(&self) -> bool {
        self.an_int == 1
    }
}

/// Parameters named after columns, in a different order.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSummary {
    pub id: i32,
    pub label: Option<String>,
    pub age: i32,
}

#[auto_constructors(name = "Summary")]
impl SubjectSummary {
    pub fn new(age: i32, #[column("name")] label: Option<String>, id: i32) -> Self {
        Self { id, label, age }
    }

    #[skip]
    pub fn anonymous() -> Self {
        Self { id: 0, label: None, age: 0 }
    }
}
