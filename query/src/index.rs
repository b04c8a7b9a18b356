use jsongraph_core::model::{Edge, EntityRef, Graph, Node, NodeKey};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Read-only adjacency view over a built graph.
pub struct GraphIndex<'g> {
    graph: &'g Graph,
    outgoing: HashMap<&'g NodeKey, Vec<&'g Edge>>,
    incoming: HashMap<&'g NodeKey, Vec<&'g Edge>>,
    nodes: HashMap<&'g NodeKey, &'g Node>,
    entities: BTreeMap<EntityRef, Vec<&'g Node>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub node_count: usize,
    pub fields: Vec<String>,
}

impl<'g> GraphIndex<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let mut outgoing: HashMap<&NodeKey, Vec<&Edge>> = HashMap::new();
        let mut incoming: HashMap<&NodeKey, Vec<&Edge>> = HashMap::new();
        for edge in graph.edges() {
            outgoing.entry(&edge.source).or_default().push(edge);
            incoming.entry(&edge.target).or_default().push(edge);
        }

        let mut nodes = HashMap::with_capacity(graph.node_count());
        let mut entities: BTreeMap<EntityRef, Vec<&Node>> = BTreeMap::new();
        for node in graph.nodes() {
            nodes.insert(&node.id, node);
            entities.entry(node.id.entity_ref()).or_default().push(node);
        }

        Self {
            graph,
            outgoing,
            incoming,
            nodes,
            entities,
        }
    }

    pub fn node(&self, key: &NodeKey) -> Option<&'g Node> {
        self.nodes.get(key).copied()
    }

    /// Outgoing edges in build order.
    pub fn neighbors(&self, key: &NodeKey) -> Vec<&'g Edge> {
        self.outgoing.get(key).cloned().unwrap_or_default()
    }

    pub fn incoming(&self, key: &NodeKey) -> Vec<&'g Edge> {
        self.incoming.get(key).cloned().unwrap_or_default()
    }

    /// Nodes reachable in one or two outgoing hops, with their hop distance,
    /// sorted by key.
    pub fn neighbors_2hop(&self, key: &NodeKey) -> Vec<(&'g NodeKey, u8)> {
        let mut result: BTreeMap<&'g NodeKey, u8> = BTreeMap::new();

        for edge in self.outgoing.get(key).into_iter().flatten().copied() {
            result.insert(&edge.target, 1);
        }
        for edge in self.outgoing.get(key).into_iter().flatten().copied() {
            for second in self.outgoing.get(&edge.target).into_iter().flatten().copied() {
                if &second.target != key {
                    result.entry(&second.target).or_insert(2);
                }
            }
        }

        result.into_iter().collect()
    }

    /// Entities sorted by (name, id).
    pub fn entities(&self) -> Vec<&EntityRef> {
        self.entities.keys().collect()
    }

    pub fn entity_nodes(&self, entity: &EntityRef) -> Vec<&'g Node> {
        self.entities.get(entity).cloned().unwrap_or_default()
    }

    pub fn entity_summaries(&self) -> Vec<EntitySummary> {
        self.entities
            .iter()
            .map(|(entity, nodes)| EntitySummary {
                entity: entity.to_string(),
                node_count: nodes.len(),
                fields: nodes.iter().map(|node| node.id.field.clone()).collect(),
            })
            .collect()
    }

    pub fn cross_links(&self) -> Vec<&'g Edge> {
        self.graph
            .edges()
            .iter()
            .filter(|edge| edge.label.is_cross_link())
            .collect()
    }

    /// Edges with an endpoint that names no node. Empty for any graph the
    /// builder returns.
    pub fn dangling_edges(&self) -> Vec<&'g Edge> {
        self.graph
            .edges()
            .iter()
            .filter(|edge| {
                !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target)
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
