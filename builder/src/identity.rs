use crate::naming::{capitalize, entity_name, id_candidate_field};
use jsongraph_core::config::IdSynthesis;
use jsongraph_core::model::{EntityRef, NodeKey};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "id";

/// Where an object sits relative to the field that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Single,
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    /// Taken from this field of the object itself.
    Field(String),
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub entity: EntityRef,
    pub source: IdSource,
}

impl Identity {
    pub fn id(&self) -> &str {
        &self.entity.id
    }

    pub fn is_synthesized(&self) -> bool {
        self.source == IdSource::Synthesized
    }

    /// The node that containment edges point at.
    pub fn anchor(&self) -> NodeKey {
        match &self.source {
            IdSource::Field(field) => self.entity.key(field.as_str()),
            IdSource::Synthesized => self.entity.key(ID_FIELD),
        }
    }
}

/// Derives entity identities. Pure: the same inputs always give the same id.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver {
    strategy: IdSynthesis,
}

impl IdentityResolver {
    pub fn new(strategy: IdSynthesis) -> Self {
        Self { strategy }
    }

    /// `scope` is the id of the enclosing entity, `None` for document roots.
    pub fn resolve(
        &self,
        field_key: &str,
        candidate: &Map<String, Value>,
        position: Position,
        scope: Option<&str>,
    ) -> Identity {
        let name = entity_name(field_key);

        for field in [ID_FIELD.to_string(), id_candidate_field(field_key)] {
            if let Some(id) = candidate.get(&field).and_then(usable_id) {
                return Identity {
                    entity: EntityRef::new(name, id),
                    source: IdSource::Field(field),
                };
            }
        }

        Identity {
            entity: EntityRef::new(name, self.synthesize(field_key, position, scope)),
            source: IdSource::Synthesized,
        }
    }

    pub fn synthesize(&self, field_key: &str, position: Position, scope: Option<&str>) -> String {
        let base = match position {
            Position::Index(index) => format!("{}[{}]", entity_name(field_key), index),
            Position::Single => format!("{}Id", capitalize(field_key)),
        };
        match (self.strategy, scope) {
            (IdSynthesis::Scoped, Some(scope)) => format!("{}/{}", scope, base),
            _ => base,
        }
    }
}

fn usable_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_explicit_id_wins() {
        let resolver = IdentityResolver::default();
        let identity = resolver.resolve(
            "user",
            &fields(json!({"id": "U1", "userId": "X"})),
            Position::Single,
            None,
        );
        assert_eq!(identity.entity, EntityRef::new("USER", "U1"));
        assert_eq!(identity.anchor(), NodeKey::new("USER", "U1", "id"));
        assert!(!identity.is_synthesized());
    }

    #[test]
    fn test_candidate_field_fallback() {
        let resolver = IdentityResolver::default();
        let identity = resolver.resolve(
            "orders",
            &fields(json!({"orderId": "O1"})),
            Position::Index(0),
            None,
        );
        assert_eq!(identity.id(), "O1");
        assert_eq!(identity.anchor(), NodeKey::new("ORDER", "O1", "orderId"));
    }

    #[test]
    fn test_numeric_and_blank_ids() {
        let resolver = IdentityResolver::default();
        let numeric = resolver.resolve("posts", &fields(json!({"id": 7})), Position::Index(2), None);
        assert_eq!(numeric.id(), "7");

        let blank = resolver.resolve("posts", &fields(json!({"id": " "})), Position::Index(2), None);
        assert_eq!(blank.id(), "POST[2]");
        assert!(blank.is_synthesized());
    }

    #[test]
    fn test_positional_synthesis() {
        let resolver = IdentityResolver::new(IdSynthesis::Positional);
        let empty = Map::new();
        assert_eq!(
            resolver.resolve("addresses", &empty, Position::Index(0), Some("U1")).id(),
            "ADDRESS[0]"
        );
        assert_eq!(
            resolver.resolve("profile", &empty, Position::Single, Some("U1")).id(),
            "ProfileId"
        );
    }

    #[test]
    fn test_scoped_synthesis() {
        let resolver = IdentityResolver::new(IdSynthesis::Scoped);
        let empty = Map::new();
        assert_eq!(
            resolver.resolve("addresses", &empty, Position::Index(1), Some("U1")).id(),
            "U1/ADDRESS[1]"
        );
        assert_eq!(
            resolver.resolve("addresses", &empty, Position::Index(1), None).id(),
            "ADDRESS[1]"
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = IdentityResolver::default();
        let object = fields(json!({"street": "Main"}));
        let first = resolver.resolve("address", &object, Position::Single, Some("U1"));
        let second = resolver.resolve("address", &object, Position::Single, Some("U1"));
        assert_eq!(first, second);
    }
}
