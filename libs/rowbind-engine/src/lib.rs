pub mod config;
pub mod error;
pub mod mapper;
pub mod resolver;
pub mod session;
pub mod source;

pub use config::{ConfigParser, RowbindConfig, Settings, StatementConfig};
pub use error::EngineError;
pub use mapper::ResultMapper;
pub use resolver::{ConstructorResolver, ResolvedConstructor, ResolverOptions, SelectionRule};
pub use session::{Mapper, Session, SessionFactory};
pub use source::{MemoryRowSource, value_from_json, value_to_json};
