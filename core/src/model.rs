use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Placeholder value rendered for a field holding a nested object.
pub const OBJECT_PLACEHOLDER: &str = "{...}";
/// Placeholder value rendered for a field holding an array.
pub const ARRAY_PLACEHOLDER: &str = "[{...}]";

/// The (entity name, entity id) pair every node is grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub name: String,
    pub id: String,
}

impl EntityRef {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    pub fn key(&self, field: impl Into<String>) -> NodeKey {
        NodeKey {
            entity: self.name.clone(),
            entity_id: self.id.clone(),
            field: field.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_component(f, &self.name)?;
        f.write_str(".")?;
        write_component(f, &self.id)
    }
}

/// Writes one key component with `\` and `.` backslash-escaped, so the joined
/// form maps back to exactly one component triple.
fn write_component(f: &mut fmt::Formatter<'_>, component: &str) -> fmt::Result {
    if !component.contains(['.', '\\']) {
        return f.write_str(component);
    }
    for ch in component.chars() {
        if ch == '.' || ch == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", ch)?;
    }
    Ok(())
}

/// Composite node identity. Equality and hashing are structural. The string
/// form joins the components with `.` and escapes dots and backslashes inside
/// them (`USER.U1.address\.city`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub entity: String,
    pub entity_id: String,
    pub field: String,
}

impl NodeKey {
    pub fn new(
        entity: impl Into<String>,
        entity_id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            entity_id: entity_id.into(),
            field: field.into(),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.entity.clone(), self.entity_id.clone())
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_component(f, &self.entity)?;
        f.write_str(".")?;
        write_component(f, &self.entity_id)?;
        f.write_str(".")?;
        write_component(f, &self.field)
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

/// Type tag carried by a node. Serialized as its display string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Scalar leaf: `string`, `number`, `boolean`.
    Primitive(PrimitiveKind),
    /// Synthesized identity of an entity that carried no usable id.
    Identity,
    /// Nested object field, tagged with the capitalized field name.
    Object(String),
    /// Array summary field, rendered `[Addresses]`.
    Array(String),
    /// Per-item proxy in separated array mode, rendered `[ADDRESS]`.
    ArrayItem(String),
}

impl NodeKind {
    pub fn is_primitive(&self) -> bool {
        matches!(self, NodeKind::Primitive(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Primitive(kind) => f.write_str(kind.as_str()),
            NodeKind::Identity => f.write_str("identity"),
            NodeKind::Object(tag) => f.write_str(tag),
            NodeKind::Array(tag) | NodeKind::ArrayItem(tag) => write!(f, "[{}]", tag),
        }
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: NodeKey,
    pub name: String,
    pub kind: NodeKind,
    pub value: String,
}

impl Node {
    pub fn new(id: NodeKey, name: impl Into<String>, kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    /// Field name with any positional decoration (`items[3]` -> `items`) removed.
    pub fn semantic_name(&self) -> &str {
        strip_decoration(&self.name)
    }

    /// Whether the node carries a real scalar that can be compared by value.
    pub fn is_linkable(&self) -> bool {
        self.kind.is_primitive() && !self.value.is_empty()
    }
}

pub fn strip_decoration(name: &str) -> &str {
    if name.ends_with(']') {
        if let Some(open) = name.rfind('[') {
            return &name[..open];
        }
    }
    name
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    Has,
    Contains,
    SameValue(String),
}

impl EdgeLabel {
    pub fn is_cross_link(&self) -> bool {
        matches!(self, EdgeLabel::SameValue(_))
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeLabel::Has => f.write_str("has"),
            EdgeLabel::Contains => f.write_str("contains"),
            EdgeLabel::SameValue(value) => write!(f, "same value: {}", value),
        }
    }
}

impl Serialize for EdgeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub source: NodeKey,
    pub target: NodeKey,
    pub label: EdgeLabel,
}

impl Edge {
    pub fn new(source: NodeKey, target: NodeKey, label: EdgeLabel) -> Self {
        Self {
            source,
            target,
            label,
        }
    }
}

/// A finished entity graph. Fields are private: consumers read through the
/// accessors and a graph never changes after it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph {
    metadata: BTreeMap<String, String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new(metadata: BTreeMap<String, String>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            metadata,
            nodes,
            edges,
        }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new(), Vec::new(), Vec::new())
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == key)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id.to_string() == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Distinct entities in first-seen order.
    pub fn entities(&self) -> Vec<EntityRef> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for node in &self.nodes {
            let entity = node.id.entity_ref();
            if seen.insert(entity.clone()) {
                out.push(entity);
            }
        }
        out
    }

    /// Returns a copy of this graph with `extra` appended after the existing edges.
    pub fn with_appended_edges(mut self, extra: impl IntoIterator<Item = Edge>) -> Self {
        self.edges.extend(extra);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

}

impl Default for Graph {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_key_display_and_structural_equality() {
        let a = NodeKey::new("USER", "U1", "address.city");
        let b = NodeKey::new("USER", "U1.address", "city");

        assert_ne!(a, b);
        assert_eq!(a.to_string(), r"USER.U1.address\.city");
        assert_eq!(b.to_string(), r"USER.U1\.address.city");
        assert_eq!(NodeKey::new("USER", "U1", "age").to_string(), "USER.U1.age");
    }

    #[test]
    fn test_backslashes_are_escaped_too() {
        let trailing = NodeKey::new("A", r"x\", "b");
        let dotted = NodeKey::new("A", "x", r"\b");
        assert_eq!(trailing.to_string(), r"A.x\\.b");
        assert_ne!(trailing.to_string(), dotted.to_string());
        assert_eq!(EntityRef::new("A", "x.y").to_string(), r"A.x\.y");
    }

    #[test]
    fn test_kind_rendering() {
        assert_eq!(NodeKind::Primitive(PrimitiveKind::Number).to_string(), "number");
        assert_eq!(NodeKind::Object("Address".into()).to_string(), "Address");
        assert_eq!(NodeKind::Array("Addresses".into()).to_string(), "[Addresses]");
        assert_eq!(NodeKind::ArrayItem("ADDRESS".into()).to_string(), "[ADDRESS]");
        assert_eq!(EdgeLabel::SameValue("O1".into()).to_string(), "same value: O1");
    }

    #[test]
    fn test_semantic_name_strips_position() {
        let node = Node::new(
            NodeKey::new("USER", "U1", "orders[2]"),
            "orders[2]",
            NodeKind::ArrayItem("ORDER".into()),
            OBJECT_PLACEHOLDER,
        );
        assert_eq!(node.semantic_name(), "orders");
        assert!(!node.is_linkable());
        assert_eq!(strip_decoration("plain"), "plain");
    }

    #[test]
    fn test_graph_serializes_ids_as_strings() {
        let source = NodeKey::new("USER", "U1", "profile");
        let target = NodeKey::new("PROFILE", "P1", "id");
        let graph = Graph::new(
            BTreeMap::new(),
            vec![Node::new(
                source.clone(),
                "profile",
                NodeKind::Object("Profile".into()),
                OBJECT_PLACEHOLDER,
            )],
            vec![Edge::new(source, target, EdgeLabel::Has)],
        );

        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["nodes"][0]["id"], "USER.U1.profile");
        assert_eq!(json["nodes"][0]["kind"], "Profile");
        assert_eq!(json["edges"][0]["target"], "PROFILE.P1.id");
        assert_eq!(json["edges"][0]["label"], "has");
    }
}
