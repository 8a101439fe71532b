use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::EngineError;
use crate::resolver::ResolverOptions;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowbindConfig {
    #[serde(default)]
    pub settings: Settings,

    /// JSON dataset backing the memory row source, relative to the config file.
    #[serde(default)]
    pub dataset: Option<PathBuf>,

    /// Named statements.
    #[serde(default, deserialize_with = "one_or_many")]
    pub statements: Vec<StatementConfig>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Block-based formats yield a lone block as a map, not a list.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// Result mapping settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Bind constructor parameters to columns by name instead of position.
    #[serde(default)]
    pub arg_name_based_constructor_auto_mapping: bool,

    /// With name-based binding, `a_byte` matches column `aByte`.
    #[serde(default)]
    pub map_underscore_to_camel_case: bool,

    /// Accept narrower numeric columns in wider parameters (lossless only).
    #[serde(default = "default_numeric_widening")]
    pub numeric_widening: bool,
}

fn default_numeric_widening() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arg_name_based_constructor_auto_mapping: false,
            map_underscore_to_camel_case: false,
            numeric_widening: default_numeric_widening(),
        }
    }
}

impl From<&Settings> for ResolverOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            arg_name_based: settings.arg_name_based_constructor_auto_mapping,
            underscore_to_camel_case: settings.map_underscore_to_camel_case,
            numeric_widening: settings.numeric_widening,
        }
    }
}

/// A named select against one table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatementConfig {
    pub id: String,
    pub table: String,
    /// Projected columns, in order. Empty selects every column.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Column compared for equality with the statement parameter.
    /// When set, the statement requires a parameter.
    #[serde(default)]
    pub filter_column: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A configuration format.
pub trait ConfigParser: Send + Sync {
    /// File extensions handled, without the dot.
    fn extensions(&self) -> &[&str];

    fn parse(&self, content: &str) -> Result<RowbindConfig, EngineError>;
}

/// Built-in TOML format.
pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, content: &str) -> Result<RowbindConfig, EngineError> {
        toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }
}

impl RowbindConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Self::load_with(path, &[])
    }

    /// Load configuration, picking the parser by file extension.
    ///
    /// `extra` parsers are tried before the built-in TOML parser. A relative
    /// `dataset` path is resolved against the config file's directory.
    pub fn load_with(
        path: impl AsRef<Path>,
        extra: &[&dyn ConfigParser],
    ) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let toml_parser = TomlParser;
        let parser = extra
            .iter()
            .copied()
            .chain(std::iter::once(&toml_parser as &dyn ConfigParser))
            .find(|p| p.extensions().contains(&ext.as_str()))
            .ok_or_else(|| {
                EngineError::Config(format!(
                    "{}: unsupported config format '{ext}'",
                    path.display()
                ))
            })?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        let mut config = parser
            .parse(&content)
            .map_err(|e| e.with_context(path.display()))?;

        if let Some(dataset) = config.dataset.take() {
            config.dataset = Some(match path.parent() {
                Some(dir) if dataset.is_relative() => dir.join(dataset),
                _ => dataset,
            });
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        let config = TomlParser.parse(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that need no row source.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (i, stmt) in self.statements.iter().enumerate() {
            if stmt.id.is_empty() {
                return Err(EngineError::Config(format!("statement #{i} has an empty id")));
            }
            if self.statements[..i].iter().any(|s| s.id == stmt.id) {
                return Err(EngineError::Config(format!(
                    "duplicate statement id '{}'",
                    stmt.id
                )));
            }
        }
        Ok(())
    }

    pub fn statement(&self, id: &str) -> Option<&StatementConfig> {
        self.statements.iter().find(|s| s.id == id)
    }
}
