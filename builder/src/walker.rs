use crate::identity::{Identity, IdentityResolver, Position, ID_FIELD};
use crate::naming::{capitalize, entity_name, item_field_name};
use crate::shape::Shape;
use crate::BuildError;
use jsongraph_core::config::BuildOptions;
use jsongraph_core::model::{
    Edge, EdgeLabel, EntityRef, Node, NodeKey, NodeKind, PrimitiveKind, ARRAY_PLACEHOLDER,
    OBJECT_PLACEHOLDER,
};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Entity that owns scalar fields found directly at the document root.
pub const DOCUMENT_ENTITY: &str = "DOCUMENT";
pub const DOCUMENT_ID: &str = "root";
/// Key a non-object document is wrapped under before walking.
const DOCUMENT_FIELD: &str = "document";

/// Nodes and edges produced by one walker call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: Fragment) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }

    /// Collapses repeated entity facts: the first node per key wins and an
    /// identical edge is kept once. A dropped node whose kind or value differs
    /// from the kept one is reported as a conflict.
    pub fn deduplicated(self) -> Deduplicated {
        let mut repeated = 0;
        let mut conflicts = Vec::new();

        let mut first_by_key: HashMap<NodeKey, usize> = HashMap::with_capacity(self.nodes.len());
        let mut nodes: Vec<Node> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            match first_by_key.get(&node.id) {
                Some(&index) => {
                    let kept = &nodes[index];
                    if kept.kind != node.kind || kept.value != node.value {
                        conflicts.push(MergedFact {
                            key: node.id,
                            kept: kept.value.clone(),
                            dropped: node.value,
                        });
                    } else {
                        repeated += 1;
                    }
                }
                None => {
                    first_by_key.insert(node.id.clone(), nodes.len());
                    nodes.push(node);
                }
            }
        }

        let mut seen_edges: HashSet<Edge> = HashSet::with_capacity(self.edges.len());
        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in self.edges {
            if seen_edges.insert(edge.clone()) {
                edges.push(edge);
            } else {
                repeated += 1;
            }
        }

        Deduplicated {
            nodes,
            edges,
            repeated,
            conflicts,
        }
    }
}

/// A node dropped in favour of an earlier node with the same key but a
/// different fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFact {
    pub key: NodeKey,
    pub kept: String,
    pub dropped: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Identical nodes and edges emitted more than once.
    pub repeated: usize,
    pub conflicts: Vec<MergedFact>,
}

pub struct EntityWalker<'a> {
    options: &'a BuildOptions,
    resolver: IdentityResolver,
}

impl<'a> EntityWalker<'a> {
    pub fn new(options: &'a BuildOptions) -> Self {
        Self {
            options,
            resolver: IdentityResolver::new(options.id_synthesis),
        }
    }

    pub fn walk_document(&self, document: &Value) -> Result<Fragment, BuildError> {
        match document {
            Value::Object(roots) => self.walk_roots(roots),
            other => {
                trace!("document is not an object, walking it under `{}`", DOCUMENT_FIELD);
                let mut wrapped = Map::new();
                wrapped.insert(DOCUMENT_FIELD.to_string(), other.clone());
                self.walk_roots(&wrapped)
            }
        }
    }

    /// Each top-level key names an entity collection. The collection field
    /// itself produces no node or edge.
    fn walk_roots(&self, roots: &Map<String, Value>) -> Result<Fragment, BuildError> {
        let document = EntityRef::new(DOCUMENT_ENTITY, DOCUMENT_ID);
        let mut fragment = Fragment::new();

        for (key, value) in roots {
            match Shape::of(value) {
                Shape::Null => trace!("skipping null root `{}`", key),
                Shape::Primitive(kind, text) => {
                    fragment.nodes.push(primitive_node(&document, key, kind, text));
                }
                Shape::Object(fields) => {
                    let identity = self.resolver.resolve(key, fields, Position::Single, None);
                    fragment.merge(self.walk_entity(key, &identity, fields, 1)?);
                }
                Shape::Array(items) => fragment.merge(self.walk_array(None, key, items, 1)?),
            }
        }

        Ok(fragment)
    }

    fn walk_entity(
        &self,
        field_key: &str,
        identity: &Identity,
        fields: &Map<String, Value>,
        depth: usize,
    ) -> Result<Fragment, BuildError> {
        if depth > self.options.max_depth {
            return Err(BuildError::DepthLimitExceeded {
                field: field_key.to_string(),
                max_depth: self.options.max_depth,
            });
        }

        let entity = &identity.entity;
        let mut fragment = Fragment::new();

        // Materialize the edge target when no `id` field will produce it.
        if identity.is_synthesized() && fields.get(ID_FIELD).map_or(true, Value::is_null) {
            fragment.nodes.push(Node::new(
                identity.anchor(),
                ID_FIELD,
                NodeKind::Identity,
                entity.id.clone(),
            ));
        }

        for (key, value) in fields {
            fragment.merge(self.walk_field(entity, key, value, depth)?);
        }

        Ok(fragment)
    }

    fn walk_field(
        &self,
        entity: &EntityRef,
        key: &str,
        value: &Value,
        depth: usize,
    ) -> Result<Fragment, BuildError> {
        let mut fragment = Fragment::new();

        match Shape::of(value) {
            Shape::Null => trace!("skipping null field `{}` of {}", key, entity),
            Shape::Primitive(kind, text) => {
                fragment.nodes.push(primitive_node(entity, key, kind, text));
            }
            Shape::Object(child) => {
                let identity =
                    self.resolver
                        .resolve(key, child, Position::Single, Some(entity.id.as_str()));
                let field = entity.key(key);
                fragment.nodes.push(Node::new(
                    field.clone(),
                    key,
                    NodeKind::Object(capitalize(key)),
                    OBJECT_PLACEHOLDER,
                ));
                fragment
                    .edges
                    .push(Edge::new(field, identity.anchor(), EdgeLabel::Has));
                fragment.merge(self.walk_entity(key, &identity, child, depth + 1)?);
            }
            Shape::Array(items) => {
                fragment.merge(self.walk_array(Some(entity), key, items, depth + 1)?);
            }
        }

        Ok(fragment)
    }

    /// `parent` is `None` for a document-root collection.
    fn walk_array(
        &self,
        parent: Option<&EntityRef>,
        key: &str,
        items: &[Value],
        depth: usize,
    ) -> Result<Fragment, BuildError> {
        let mut fragment = Fragment::new();
        let summary = parent.map(|parent| parent.key(key));

        if let Some(summary) = &summary {
            fragment.nodes.push(Node::new(
                summary.clone(),
                key,
                NodeKind::Array(capitalize(key)),
                ARRAY_PLACEHOLDER,
            ));
        }

        let item_entity = entity_name(key);
        let scope = parent.map(|parent| parent.id.as_str());
        let mut first_linked = false;

        for (index, item) in items.iter().enumerate() {
            let Some(fields) = item_fields(key, item) else {
                trace!("skipping null item {} of `{}`", index, key);
                continue;
            };
            let identity = self
                .resolver
                .resolve(key, &fields, Position::Index(index), scope);

            if let (Some(parent), Some(summary)) = (parent, &summary) {
                if self.options.separate_array_nodes {
                    let proxy_field = format!("{}[{}]", key, index);
                    let proxy = parent.key(proxy_field.as_str());
                    fragment.nodes.push(Node::new(
                        proxy.clone(),
                        proxy_field,
                        NodeKind::ArrayItem(item_entity.clone()),
                        OBJECT_PLACEHOLDER,
                    ));
                    // Only the first proxy hangs off the summary node.
                    if !first_linked {
                        fragment
                            .edges
                            .push(Edge::new(summary.clone(), proxy.clone(), EdgeLabel::Has));
                        first_linked = true;
                    }
                    fragment
                        .edges
                        .push(Edge::new(proxy, identity.anchor(), EdgeLabel::Contains));
                } else {
                    fragment.edges.push(Edge::new(
                        summary.clone(),
                        identity.anchor(),
                        EdgeLabel::Has,
                    ));
                }
            }

            fragment.merge(self.walk_entity(key, &identity, &fields, depth)?);
        }

        Ok(fragment)
    }
}

fn primitive_node(entity: &EntityRef, key: &str, kind: PrimitiveKind, text: String) -> Node {
    Node::new(entity.key(key), key, NodeKind::Primitive(kind), text)
}

/// Fields of an array item. Non-object items are wrapped as a one-field entity
/// named after the singular key; null items yield `None`.
fn item_fields<'v>(key: &str, item: &'v Value) -> Option<Cow<'v, Map<String, Value>>> {
    match item {
        Value::Null => None,
        Value::Object(fields) => Some(Cow::Borrowed(fields)),
        other => {
            let mut wrapped = Map::new();
            wrapped.insert(item_field_name(key), other.clone());
            Some(Cow::Owned(wrapped))
        }
    }
}
