use crate::model::Graph;
use sha2::{Digest, Sha256};

pub trait ContentHash {
    fn content_hash(&self) -> String;
}

impl ContentHash for str {
    fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"text");
        hasher.update(self.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl ContentHash for Graph {
    /// Hash over the node and edge sequences in order. Metadata is excluded so
    /// graphs built from equal documents match regardless of how they were fed in.
    fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"graph");
        for node in self.nodes() {
            hasher.update(b"n");
            for part in [
                node.id.entity.as_str(),
                node.id.entity_id.as_str(),
                node.id.field.as_str(),
                node.name.as_str(),
            ] {
                hasher.update((part.len() as u64).to_le_bytes());
                hasher.update(part.as_bytes());
            }
            let kind = node.kind.to_string();
            hasher.update((kind.len() as u64).to_le_bytes());
            hasher.update(kind.as_bytes());
            hasher.update((node.value.len() as u64).to_le_bytes());
            hasher.update(node.value.as_bytes());
        }
        for edge in self.edges() {
            hasher.update(b"e");
            for part in [edge.source.to_string(), edge.target.to_string(), edge.label.to_string()] {
                hasher.update((part.len() as u64).to_le_bytes());
                hasher.update(part.as_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}
