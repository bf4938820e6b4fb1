//! Query descriptors: equality predicates and single-field ordering.
//!
//! This is the whole query language the application needs — the hosted
//! store the surface mirrors supports nothing richer for these flows.

use std::cmp::Ordering;

use serde_json::Value;

use crate::document::Document;

/// Metadata field name that orders by the store-assigned creation
/// timestamp rather than a user field.
pub const CREATED_AT: &str = "createdAt";

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A filtered, optionally ordered read over one collection.
///
/// Equality predicates compare whole JSON values, so filtering on an
/// object field (e.g. an identity snapshot) compares every member.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order: Option<(String, Direction)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push((field.into(), value));
        self
    }

    /// Order results by a single field. [`CREATED_AT`] orders by document
    /// metadata.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    pub(crate) fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| doc.field(field) == Some(value))
    }

    pub(crate) fn apply(&self, docs: &mut Vec<Document>) {
        docs.retain(|doc| self.matches(doc));
        if let Some((field, direction)) = &self.order {
            docs.sort_by(|a, b| {
                let ord = if field == CREATED_AT {
                    a.created_at.cmp(&b.created_at)
                } else {
                    compare_values(a.field(field), b.field(field))
                };
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
    }
}

/// Total-enough ordering over the JSON values the application sorts on.
/// Missing fields sort first; mixed types compare as equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn doc(fields: Value, secs: i64) -> Document {
        Document {
            id: Uuid::new_v4(),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            fields,
        }
    }

    #[test]
    fn equality_filter_matches_whole_objects() {
        let owner = json!({"name": "Ana", "email": "ana@example.com", "image": ""});
        let query = Query::new().where_eq("user", owner.clone());

        assert!(query.matches(&doc(json!({"user": owner}), 0)));
        assert!(!query.matches(&doc(
            json!({"user": {"name": "Bea", "email": "bea@example.com", "image": ""}}),
            0
        )));
        assert!(!query.matches(&doc(json!({"task": "no user field"}), 0)));
    }

    #[test]
    fn order_by_created_at_desc() {
        let query = Query::new().order_by(CREATED_AT, Direction::Desc);
        let mut docs = vec![
            doc(json!({"task": "old"}), 10),
            doc(json!({"task": "new"}), 30),
            doc(json!({"task": "mid"}), 20),
        ];
        query.apply(&mut docs);

        let bodies: Vec<_> = docs.iter().map(|d| d.field("task").cloned()).collect();
        assert_eq!(
            bodies,
            vec![Some(json!("new")), Some(json!("mid")), Some(json!("old"))]
        );
    }

    #[test]
    fn order_by_user_field_asc() {
        let query = Query::new().order_by("rank", Direction::Asc);
        let mut docs = vec![
            doc(json!({"rank": 3}), 0),
            doc(json!({"rank": 1}), 0),
            doc(json!({"rank": 2}), 0),
        ];
        query.apply(&mut docs);

        let ranks: Vec<_> = docs.iter().map(|d| d.field("rank").cloned()).collect();
        assert_eq!(ranks, vec![Some(json!(1)), Some(json!(2)), Some(json!(3))]);
    }
}
