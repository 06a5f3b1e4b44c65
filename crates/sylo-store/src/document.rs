//! JSON document storage used by command handlers

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::Result;

/// A stored JSON object
///
/// Serializes as the document body with `id`, `created_at` and `updated_at`
/// merged in, which is the shape handlers return to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: impl Into<String>, body: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            body,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge `patch` into the body; a `null` value removes the key
    pub fn apply_patch(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            if value.is_null() {
                self.body.remove(&key);
            } else {
                self.body.insert(key, value);
            }
        }
        self.updated_at = Utc::now();
    }

    pub fn to_value(&self) -> Value {
        let mut object = self.body.clone();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        object.insert("created_at".to_string(), Value::String(self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)));
        object.insert("updated_at".to_string(), Value::String(self.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true)));
        Value::Object(object)
    }
}

impl Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Equality filter plus paging for `list`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Every field must equal the given value
    pub equals: Vec<(String, Value)>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.equals.push((field.into(), value));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.equals
            .iter()
            .all(|(field, expected)| doc.body.get(field) == Some(expected))
    }

    /// Filter and page documents already sorted by creation order
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let matching = docs.into_iter().filter(|doc| self.matches(doc)).skip(self.offset);
        match self.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `body` under a fresh id
    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Documents in creation order
    async fn list(&self, collection: &str, filter: &ListFilter) -> Result<Vec<Document>>;

    /// Merge `patch` into an existing document; `None` if it does not exist
    async fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> Result<Option<Document>>;

    /// Returns false if nothing was deleted
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;
}

/// Generate a time-ordered document id
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_patch_merges_and_removes() {
        let mut doc = Document::new("d1", body(json!({"name": "A", "status": "draft"})));
        doc.apply_patch(body(json!({"status": "active", "name": null, "tags": ["x"]})));
        assert_eq!(doc.body, body(json!({"status": "active", "tags": ["x"]})));
        assert!(doc.updated_at >= doc.created_at);
    }

    #[test]
    fn test_serializes_flat() {
        let doc = Document::new("d1", body(json!({"name": "A"})));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], json!("d1"));
        assert_eq!(value["name"], json!("A"));
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn test_filter_and_paging() {
        let docs: Vec<_> = (0..5)
            .map(|i| {
                Document::new(
                    format!("d{i}"),
                    body(json!({"status": if i % 2 == 0 { "active" } else { "draft" }})),
                )
            })
            .collect();
        let filter = ListFilter::new().field_eq("status", json!("active")).offset(1).limit(1);
        let page = filter.apply(docs);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "d2");
    }
}
