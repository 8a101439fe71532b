use rowbind_engine::config::{ConfigParser, RowbindConfig};
use rowbind_engine::error::EngineError;

pub struct HclParser;

impl ConfigParser for HclParser {
    fn extensions(&self) -> &[&str] {
        &["hcl"]
    }

    fn parse(&self, content: &str) -> Result<RowbindConfig, EngineError> {
        hcl::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }
}
