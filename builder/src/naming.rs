//! Field-key to entity naming rules.

const ES_SUFFIXES: [&str; 5] = ["sses", "shes", "ches", "xes", "zes"];
const KEEP_SUFFIXES: [&str; 3] = ["ss", "us", "is"];
const FALLBACK_ITEM_FIELD: &str = "value";

/// Naive English singular: `orders` -> `order`, `addresses` -> `address`,
/// `categories` -> `category`. Unknown shapes are returned unchanged.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let strip = |n: usize| word[..word.len() - n].to_string();

    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", strip(3));
    }
    if ES_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return strip(2);
    }
    if lower.len() <= 1 || KEEP_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return word.to_string();
    }
    if lower.ends_with('s') {
        return strip(1);
    }
    word.to_string()
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Entity name for the objects found under `field_key`.
pub fn entity_name(field_key: &str) -> String {
    singularize(field_key).to_uppercase()
}

/// Secondary identity field checked after `id`: `orders` -> `orderId`.
pub fn id_candidate_field(field_key: &str) -> String {
    format!("{}Id", singularize(field_key))
}

/// Field name given to a non-object array item when it is wrapped into an entity.
pub fn item_field_name(field_key: &str) -> String {
    let singular = singularize(field_key);
    if singular.is_empty() {
        FALLBACK_ITEM_FIELD.to_string()
    } else {
        singular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("orders"), "order");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("orderHistory"), "orderHistory");
        assert_eq!(singularize("s"), "s");
        assert_eq!(singularize(""), "");
    }

    #[test]
    fn test_entity_naming() {
        assert_eq!(entity_name("orders"), "ORDER");
        assert_eq!(entity_name("user"), "USER");
        assert_eq!(entity_name("orderHistory"), "ORDERHISTORY");
        assert_eq!(capitalize("addresses"), "Addresses");
        assert_eq!(id_candidate_field("orders"), "orderId");
        assert_eq!(item_field_name("tags"), "tag");
        assert_eq!(item_field_name(""), "value");
    }
}
