use jsongraph_core::model::{Edge, EdgeLabel, Graph, Node, NodeKey};
use std::collections::{HashMap, HashSet};

/// Adds `same value: <v>` edges between nodes of watched fields that share a value.
#[derive(Debug, Clone, Default)]
pub struct CrossLinker {
    fields: Vec<String>,
}

impl CrossLinker {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Edges to append for `nodes`. Matching uses the node's semantic name and
    /// groups by value across all watched fields. Within a group every edge
    /// starts at the first node in encounter order, so k nodes yield k-1 edges.
    pub fn links(&self, nodes: &[Node]) -> Vec<Edge> {
        if self.fields.is_empty() {
            return Vec::new();
        }

        let watched: HashSet<&str> = self.fields.iter().map(String::as_str).collect();
        let mut groups: Vec<(&str, Vec<&NodeKey>)> = Vec::new();
        let mut group_index: HashMap<&str, usize> = HashMap::new();

        for node in nodes
            .iter()
            .filter(|node| node.is_linkable() && watched.contains(node.semantic_name()))
        {
            let value = node.value.as_str();
            match group_index.get(value) {
                Some(&index) => groups[index].1.push(&node.id),
                None => {
                    group_index.insert(value, groups.len());
                    groups.push((value, vec![&node.id]));
                }
            }
        }

        let mut edges = Vec::new();
        for (value, members) in groups {
            if let Some((first, rest)) = members.split_first() {
                for other in rest {
                    edges.push(Edge::new(
                        (*first).clone(),
                        (*other).clone(),
                        EdgeLabel::SameValue(value.to_string()),
                    ));
                }
            }
        }
        edges
    }

    /// Appends cross-links to `graph`. Existing nodes and edges are untouched.
    ///
    /// Not idempotent: linking an already linked graph appends the same edges
    /// a second time. Link once per build.
    pub fn link(&self, graph: Graph) -> Graph {
        let extra = self.links(graph.nodes());
        graph.with_appended_edges(extra)
    }
}
