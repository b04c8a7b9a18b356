use crate::shape::json_type_name;
use crate::{build_graph_from_str, BuildError};
use jsongraph_core::config::{BuildOptions, IdSynthesis, OptionsError, DEFAULT_MAX_DEPTH};
use jsongraph_core::error::{ErrorCode, GraphError};
use jsongraph_core::model::Graph;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiPayloadError {
    #[error("linked field at index {index} must be a string, found {found}")]
    NonStringLinkedField { index: usize, found: &'static str },
    #[error("{0}")]
    InvalidOptions(#[from] OptionsError),
    #[error("{0}")]
    InvalidPayload(String),
}

impl GraphError for ApiPayloadError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ApiPayloadError::InvalidPayload(_) => ErrorCode::MalformedInput,
            _ => ErrorCode::InvalidConfiguration,
        }
    }
}

/// Loosely typed request as sent by an editor: the raw document text plus
/// options whose entries have not been checked yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBuildPayload {
    pub document: String,
    #[serde(default)]
    pub separate_array_nodes: bool,
    #[serde(default)]
    pub linked_fields: Vec<Value>,
    #[serde(default)]
    pub id_synthesis: IdSynthesis,
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl JsonBuildPayload {
    pub fn parse_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn try_into_request(self) -> Result<BuildRequest, ApiPayloadError> {
        let linked_fields = self
            .linked_fields
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::String(field) => Ok(field),
                other => Err(ApiPayloadError::NonStringLinkedField {
                    index,
                    found: json_type_name(&other),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = BuildOptions {
            separate_array_nodes: self.separate_array_nodes,
            linked_fields,
            id_synthesis: self.id_synthesis,
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        };
        options.validate()?;

        Ok(BuildRequest {
            document: self.document,
            options,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub document: String,
    pub options: BuildOptions,
}

impl BuildRequest {
    pub fn new(document: impl Into<String>, options: BuildOptions) -> Self {
        Self {
            document: document.into(),
            options,
        }
    }

    pub fn build(&self) -> Result<Graph, BuildError> {
        build_graph_from_str(&self.document, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_string_linked_field_is_rejected() {
        let payload = JsonBuildPayload::parse_json(
            r#"{"document": "{}", "linked_fields": ["orderId", 42]}"#,
        )
        .unwrap();
        let err = payload.try_into_request().unwrap_err();
        assert_eq!(
            err,
            ApiPayloadError::NonStringLinkedField {
                index: 1,
                found: "number"
            }
        );
        assert_eq!(err.error_code(), ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_defaults_are_applied() {
        let request = JsonBuildPayload::parse_json(r#"{"document": "{}"}"#)
            .unwrap()
            .try_into_request()
            .unwrap();
        assert_eq!(request.options, BuildOptions::default());
    }
}
