use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::Path;
use thiserror::Error;

use crate::error::{ErrorCode, GraphError};

pub const DEFAULT_MAX_DEPTH: usize = 128;
const DEFAULT_METRICS_HISTORY: usize = 256;
const ENV_PREFIX: &str = "JSONGRAPH";

/// How an identifier is synthesized for an object that carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdSynthesis {
    /// `ADDRESS[0]` for array items, `ProfileId` for singular objects.
    #[default]
    Positional,
    /// Positional id qualified by the parent entity id: `U1/ADDRESS[0]`.
    Scoped,
}

impl IdSynthesis {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdSynthesis::Positional => "positional",
            IdSynthesis::Scoped => "scoped",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("linked field at index {0} is blank")]
    BlankLinkedField(usize),
    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

impl GraphError for OptionsError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidConfiguration
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub separate_array_nodes: bool,
    pub linked_fields: Vec<String>,
    pub id_synthesis: IdSynthesis,
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            separate_array_nodes: false,
            linked_fields: Vec::new(),
            id_synthesis: IdSynthesis::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BuildOptions {
    pub fn new(separate_array_nodes: bool, linked_fields: Vec<String>) -> Self {
        Self {
            separate_array_nodes,
            linked_fields,
            ..Self::default()
        }
    }

    pub fn with_id_synthesis(mut self, id_synthesis: IdSynthesis) -> Self {
        self.id_synthesis = id_synthesis;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_depth == 0 {
            return Err(OptionsError::ZeroDepth);
        }
        if let Some(index) = self
            .linked_fields
            .iter()
            .position(|field| field.trim().is_empty())
        {
            return Err(OptionsError::BlankLinkedField(index));
        }
        Ok(())
    }

    /// Validated copy with duplicate linked fields collapsed, first occurrence kept.
    pub fn normalized(&self) -> Result<Self, OptionsError> {
        self.validate()?;
        let mut seen = HashSet::new();
        let linked_fields = self
            .linked_fields
            .iter()
            .map(|field| field.trim().to_string())
            .filter(|field| seen.insert(field.clone()))
            .collect();
        Ok(Self {
            linked_fields,
            ..self.clone()
        })
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MetricsConfig {
    pub max_history: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_METRICS_HISTORY,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub build: BuildOptions,
    pub metrics: MetricsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment());

        builder.build()?.try_deserialize()
    }

    /// Loads a single explicit config file, still layered under the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path))
            .add_source(environment());

        builder.build()?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("build.linked_fields")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_rejects_blank_linked_field() {
        let options = BuildOptions::new(false, vec!["orderId".into(), "  ".into()]);
        assert_eq!(options.validate(), Err(OptionsError::BlankLinkedField(1)));
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let options = BuildOptions::default().with_max_depth(0);
        assert_eq!(options.validate(), Err(OptionsError::ZeroDepth));
        assert_eq!(
            options.validate().unwrap_err().error_code(),
            ErrorCode::InvalidConfiguration
        );
    }

    #[test]
    fn test_normalized_collapses_duplicates() {
        let options = BuildOptions::new(
            true,
            vec!["orderId".into(), "userId".into(), " orderId".into()],
        );
        let normalized = options.normalized().unwrap();
        assert_eq!(normalized.linked_fields, vec!["orderId", "userId"]);
        assert!(normalized.separate_array_nodes);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[build]\nseparate_array_nodes = true\nlinked_fields = [\"orderId\"]\nid_synthesis = \"scoped\"\n\n[metrics]\nmax_history = 8"
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.build.separate_array_nodes);
        assert_eq!(config.build.linked_fields, vec!["orderId"]);
        assert_eq!(config.build.id_synthesis, IdSynthesis::Scoped);
        assert_eq!(config.build.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.metrics.max_history, 8);
    }
}
