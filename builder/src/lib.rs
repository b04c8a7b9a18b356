pub mod api;
pub mod identity;
pub mod linker;
pub mod naming;
pub mod shape;
pub mod walker;

use jsongraph_core::config::{BuildOptions, OptionsError};
use jsongraph_core::error::{ErrorCode, GraphError};
use jsongraph_core::hash::ContentHash;
use jsongraph_core::model::{Edge, Graph, Node};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};

pub use api::{ApiPayloadError, BuildRequest, JsonBuildPayload};
pub use identity::{Identity, IdentityResolver, Position};
pub use linker::CrossLinker;
pub use walker::{Deduplicated, EntityWalker, Fragment, MergedFact};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("malformed JSON at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("nesting under field `{field}` exceeds the maximum depth of {max_depth}")]
    DepthLimitExceeded { field: String, max_depth: usize },
    #[error("invalid build options: {0}")]
    InvalidOptions(#[from] OptionsError),
    #[error("invalid payload: {0}")]
    Payload(#[from] ApiPayloadError),
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::Parse {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

impl GraphError for BuildError {
    fn error_code(&self) -> ErrorCode {
        match self {
            BuildError::Parse { .. } => ErrorCode::MalformedInput,
            BuildError::DepthLimitExceeded { .. } => ErrorCode::ResourceExhausted,
            BuildError::InvalidOptions(err) => err.error_code(),
            BuildError::Payload(err) => err.error_code(),
        }
    }
}

/// Builds the entity graph for `document`.
///
/// Options are validated before traversal. Any traversal error aborts the
/// whole build; no partial graph is ever returned.
pub fn build_graph(document: &Value, options: &BuildOptions) -> Result<Graph, BuildError> {
    let options = options.normalized()?;
    let span = tracing::debug_span!(
        "build_graph",
        separate_array_nodes = options.separate_array_nodes,
        linked_fields = options.linked_fields.len()
    );
    let _guard = span.enter();

    let Deduplicated {
        nodes,
        edges,
        repeated,
        conflicts,
    } = EntityWalker::new(&options).walk_document(document)?.deduplicated();
    if repeated > 0 {
        debug!(repeated, "merged repeated entity facts");
    }
    for conflict in &conflicts {
        warn!(
            key = %conflict.key,
            kept = %conflict.kept,
            dropped = %conflict.dropped,
            "entities share an identity but disagree on a field; kept the first value"
        );
    }

    let cross_links = CrossLinker::new(options.linked_fields.iter().cloned()).links(&nodes);
    let mut metadata = build_metadata(&options, &nodes, &edges, cross_links.len());
    metadata.insert("merged_fact_count".to_string(), conflicts.len().to_string());
    let graph = Graph::new(metadata, nodes, edges).with_appended_edges(cross_links);

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph built"
    );
    Ok(graph)
}

/// Parses `raw` and builds its graph. The graph records the source fingerprint
/// under the `source_sha256` metadata key.
pub fn build_graph_from_str(raw: &str, options: &BuildOptions) -> Result<Graph, BuildError> {
    options.validate()?;
    let document: Value = serde_json::from_str(raw)?;
    let graph = build_graph(&document, options)?;
    Ok(graph.with_metadata("source_sha256", raw.content_hash()))
}

/// Parses a [`JsonBuildPayload`] and builds the document it carries.
pub fn execute_json(raw: &str) -> Result<Graph, BuildError> {
    let request = JsonBuildPayload::parse_json(raw)
        .map_err(|err| ApiPayloadError::InvalidPayload(err.to_string()))?
        .try_into_request()?;
    request.build()
}

fn build_metadata(
    options: &BuildOptions,
    nodes: &[Node],
    edges: &[Edge],
    cross_link_count: usize,
) -> BTreeMap<String, String> {
    let entity_count = nodes
        .iter()
        .map(|node| (node.id.entity.as_str(), node.id.entity_id.as_str()))
        .collect::<BTreeSet<_>>()
        .len();

    let mut metadata = BTreeMap::new();
    metadata.insert(
        "separate_array_nodes".to_string(),
        options.separate_array_nodes.to_string(),
    );
    metadata.insert("linked_fields".to_string(), options.linked_fields.join(","));
    metadata.insert(
        "id_synthesis".to_string(),
        options.id_synthesis.as_str().to_string(),
    );
    metadata.insert("entity_count".to_string(), entity_count.to_string());
    metadata.insert("node_count".to_string(), nodes.len().to_string());
    metadata.insert(
        "edge_count".to_string(),
        (edges.len() + cross_link_count).to_string(),
    );
    metadata.insert("cross_link_count".to_string(), cross_link_count.to_string());
    metadata
}
