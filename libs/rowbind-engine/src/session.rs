use std::sync::Arc;

use rowbind_api::descriptor::{AutoConstruct, TypeDescriptor};
use rowbind_api::schema::Schema;
use rowbind_api::source::{ResultSet, RowQuery, RowSource};
use rowbind_api::value::Value;

use crate::config::{RowbindConfig, Settings, StatementConfig};
use crate::error::EngineError;
use crate::mapper::ResultMapper;
use crate::resolver::{ConstructorResolver, ResolverOptions};
use crate::source::MemoryRowSource;

struct FactoryInner {
    settings: Settings,
    statements: Vec<StatementConfig>,
    source: Arc<dyn RowSource>,
    mapper: ResultMapper,
}

/// Validated configuration bound to a row source. Built once, shared.
#[derive(Clone)]
pub struct SessionFactory {
    inner: Arc<FactoryInner>,
}

impl std::fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFactory")
            .field("settings", &self.inner.settings)
            .field("statements", &self.inner.statements.len())
            .finish()
    }
}

impl SessionFactory {
    /// Check every statement against `source` and build the factory.
    pub fn new(config: RowbindConfig, source: Arc<dyn RowSource>) -> Result<Self, EngineError> {
        config.validate()?;
        for stmt in &config.statements {
            validate_statement(stmt, source.as_ref())
                .map_err(|e| e.with_context(format!("statement '{}'", stmt.id)))?;
        }

        let options = ResolverOptions::from(&config.settings);
        tracing::info!(
            statements = config.statements.len(),
            arg_name_based = options.arg_name_based,
            numeric_widening = options.numeric_widening,
            "session factory ready"
        );

        Ok(Self {
            inner: Arc::new(FactoryInner {
                settings: config.settings,
                statements: config.statements,
                source,
                mapper: ResultMapper::new(ConstructorResolver::new(options)),
            }),
        })
    }

    /// Build a factory over the memory row source named by `config.dataset`.
    pub fn from_config(config: RowbindConfig) -> Result<Self, EngineError> {
        let dataset = config
            .dataset
            .clone()
            .ok_or_else(|| EngineError::Config("no dataset configured".into()))?;
        let source = MemoryRowSource::load(&dataset)?;
        Self::new(config, Arc::new(source))
    }

    pub fn open_session(&self) -> Session {
        Session {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn statements(&self) -> &[StatementConfig] {
        &self.inner.statements
    }

    pub fn statement(&self, id: &str) -> Option<&StatementConfig> {
        self.inner.statements.iter().find(|s| s.id == id)
    }

    /// Schema of a table in the bound row source.
    pub fn table_schema(&self, table: &str) -> Option<Schema> {
        self.inner.source.table_schema(table)
    }
}

fn validate_statement(stmt: &StatementConfig, source: &dyn RowSource) -> Result<(), EngineError> {
    let schema = source
        .table_schema(&stmt.table)
        .ok_or_else(|| EngineError::Config(format!("table '{}' not found", stmt.table)))?;
    for column in stmt.columns.iter().chain(&stmt.filter_column) {
        if schema.index_of(column).is_none() {
            return Err(EngineError::Config(format!(
                "column '{column}' not found in table '{}'",
                stmt.table
            )));
        }
    }
    Ok(())
}

/// Handle for running statements. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<FactoryInner>,
}

/// A typed query interface bound to a session.
///
/// Implemented by hand-written structs that hold the session and forward
/// each method to a statement.
pub trait Mapper: Sized {
    fn bind(session: Session) -> Self;
}

impl Session {
    /// Bind a mapper to this session.
    pub fn mapper<M: Mapper>(&self) -> M {
        M::bind(self.clone())
    }

    /// Run a statement and return its rows unmapped.
    pub fn select_rows(&self, statement: &str, param: Option<Value>) -> Result<ResultSet, EngineError> {
        let stmt = self.statement(statement)?;

        let filter = match (&stmt.filter_column, param) {
            (Some(column), Some(value)) => Some((column.clone(), value)),
            (Some(column), None) => {
                return Err(EngineError::Parameter {
                    statement: statement.to_string(),
                    detail: format!("a value for '{column}' is required"),
                });
            }
            (None, Some(_)) => {
                return Err(EngineError::Parameter {
                    statement: statement.to_string(),
                    detail: "statement takes no parameter".into(),
                });
            }
            (None, None) => None,
        };

        let query = RowQuery {
            table: stmt.table.clone(),
            columns: stmt.columns.clone(),
            filter,
            limit: stmt.limit,
        };

        tracing::debug!(statement, table = %stmt.table, "executing statement");
        self.inner
            .source
            .fetch(&query)
            .map_err(|e| EngineError::from(e).with_context(format!("statement '{statement}'")))
    }

    pub fn select_list<T: AutoConstruct>(
        &self,
        statement: &str,
        param: Option<Value>,
    ) -> Result<Vec<T>, EngineError> {
        self.select_list_with(T::descriptor(), statement, param)
    }

    pub fn select_list_with<T>(
        &self,
        descriptor: &TypeDescriptor<T>,
        statement: &str,
        param: Option<Value>,
    ) -> Result<Vec<T>, EngineError> {
        let rs = self.select_rows(statement, param)?;
        self.map(descriptor, statement, &rs)
    }

    /// At most one object. More than one row is `TooManyResults`.
    pub fn select_one<T: AutoConstruct>(
        &self,
        statement: &str,
        param: Option<Value>,
    ) -> Result<Option<T>, EngineError> {
        let rs = self.select_rows(statement, param)?;
        if rs.len() > 1 {
            return Err(EngineError::TooManyResults {
                statement: statement.to_string(),
                count: rs.len(),
            });
        }
        Ok(self.map(T::descriptor(), statement, &rs)?.pop())
    }

    fn map<T>(
        &self,
        descriptor: &TypeDescriptor<T>,
        statement: &str,
        rs: &ResultSet,
    ) -> Result<Vec<T>, EngineError> {
        self.inner
            .mapper
            .map_with(descriptor, rs)
            .map_err(|source| {
                tracing::debug!(statement, error = %source, "result mapping failed");
                EngineError::Mapping {
                    statement: statement.to_string(),
                    source,
                }
            })
    }

    fn statement(&self, id: &str) -> Result<&StatementConfig, EngineError> {
        self.inner
            .statements
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| EngineError::StatementNotFound(id.to_string()))
    }
}
