//! Firestore REST API types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Firestore document value types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ReferenceValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    /// Create time
    pub create_time: Option<String>,
    /// Update time
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// The document id (last path segment of the resource name).
    pub fn doc_id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }
}

/// List documents response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    pub documents: Option<Vec<Document>>,
    pub next_page_token: Option<String>,
}

// ============================================================================
// Structured Query Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_descendants: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    FieldFilter(FieldFilter),
    CompositeFilter(CompositeFilter),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    /// One of EQUAL, IN, ARRAY_CONTAINS, ...
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeFilter {
    /// AND or OR
    pub op: String,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

impl StructuredQuery {
    /// Query a single collection with an optional equality filter.
    pub fn collection(collection_id: impl Into<String>) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.into(),
                all_descendants: None,
            }],
            filter: None,
            limit: None,
        }
    }

    /// Add an EQUAL field filter, ANDed with any existing filter.
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        let next = Filter::FieldFilter(FieldFilter {
            field: FieldReference {
                field_path: field.into(),
            },
            op: "EQUAL".to_string(),
            value,
        });
        self.filter = Some(match self.filter.take() {
            None => next,
            Some(Filter::CompositeFilter(mut cf)) if cf.op == "AND" => {
                cf.filters.push(next);
                Filter::CompositeFilter(cf)
            }
            Some(existing) => Filter::CompositeFilter(CompositeFilter {
                op: "AND".to_string(),
                filters: vec![existing, next],
            }),
        });
        self
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// Batch Get Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetDocumentsRequest {
    pub documents: Vec<String>,
}

/// One element of the batchGet response array; exactly one of `found` or
/// `missing` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetDocumentsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

// ============================================================================
// Batch Write Types (for atomic multi-document operations)
// ============================================================================

/// A single write operation in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    /// Update or insert a document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Document>,

    /// Delete a document by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,

    /// Field mask for partial updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMask>,

    /// Precondition for the write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_document: Option<Precondition>,
}

impl Write {
    /// An insert that fails if the document already exists.
    pub fn create(doc_name: String, fields: HashMap<String, Value>) -> Self {
        Self {
            update: Some(Document {
                name: Some(doc_name),
                fields: Some(fields),
                create_time: None,
                update_time: None,
            }),
            delete: None,
            update_mask: None,
            current_document: Some(Precondition {
                exists: Some(false),
                update_time: None,
            }),
        }
    }

    /// A full-document upsert.
    pub fn upsert(doc_name: String, fields: HashMap<String, Value>) -> Self {
        Self {
            update: Some(Document {
                name: Some(doc_name),
                fields: Some(fields),
                create_time: None,
                update_time: None,
            }),
            delete: None,
            update_mask: None,
            current_document: None,
        }
    }

    /// An idempotent delete.
    pub fn delete(doc_name: String) -> Self {
        Self {
            update: None,
            delete: Some(doc_name),
            update_mask: None,
            current_document: None,
        }
    }
}

/// Document field mask for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    pub field_paths: Vec<String>,
}

/// Precondition for a write operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precondition {
    /// Document must exist (or must not, for inserts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,

    /// Document must have this update time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Batch write request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteRequest {
    pub writes: Vec<Write>,
}

/// Result of a single write in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub update_time: Option<String>,
}

/// Status of a single write in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// gRPC status code (0 = OK, 6 = ALREADY_EXISTS).
    pub code: Option<i32>,
    pub message: Option<String>,
}

/// Batch write response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteResponse {
    pub write_results: Option<Vec<WriteResult>>,
    pub status: Option<Vec<Status>>,
}

impl BatchWriteResponse {
    /// Create an empty response for empty batch writes.
    pub fn empty() -> Self {
        Self {
            write_results: Some(vec![]),
            status: Some(vec![]),
        }
    }

    /// Check for partial failures. ALREADY_EXISTS (code 6) and
    /// FAILED_PRECONDITION (code 9) surface as their dedicated variants so
    /// callers can turn them into duplicate errors.
    pub fn check_for_errors(&self) -> crate::error::FirestoreResult<()> {
        if let Some(statuses) = &self.status {
            for (i, status) in statuses.iter().enumerate() {
                match status.code {
                    None | Some(0) => {}
                    Some(6) => {
                        return Err(crate::error::FirestoreError::AlreadyExists(format!(
                            "batch write index {}",
                            i
                        )))
                    }
                    Some(9) => {
                        return Err(crate::error::FirestoreError::PreconditionFailed(format!(
                            "batch write index {}",
                            i
                        )))
                    }
                    Some(code) => {
                        let msg = status.message.as_deref().unwrap_or("Unknown error");
                        return Err(crate::error::FirestoreError::request_failed(format!(
                            "Batch write failed at index {}: {} (code {})",
                            i, msg, code
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Value Conversion
// ============================================================================

/// Convert a Rust value to Firestore Value.
pub trait ToFirestoreValue {
    fn to_firestore_value(&self) -> Value;
}

impl ToFirestoreValue for String {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.clone())
    }
}

impl ToFirestoreValue for &str {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.to_string())
    }
}

impl ToFirestoreValue for i64 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToFirestoreValue for i32 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue((*self as i64).to_string())
    }
}

impl ToFirestoreValue for u64 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue((*self as i64).to_string())
    }
}

impl ToFirestoreValue for f64 {
    fn to_firestore_value(&self) -> Value {
        Value::DoubleValue(*self)
    }
}

impl ToFirestoreValue for bool {
    fn to_firestore_value(&self) -> Value {
        Value::BooleanValue(*self)
    }
}

impl ToFirestoreValue for DateTime<Utc> {
    fn to_firestore_value(&self) -> Value {
        Value::TimestampValue(self.to_rfc3339())
    }
}

impl<T: ToFirestoreValue> ToFirestoreValue for Option<T> {
    fn to_firestore_value(&self) -> Value {
        match self {
            Some(v) => v.to_firestore_value(),
            None => Value::NullValue(()),
        }
    }
}

impl<T: ToFirestoreValue> ToFirestoreValue for Vec<T> {
    fn to_firestore_value(&self) -> Value {
        Value::ArrayValue(ArrayValue {
            values: Some(self.iter().map(|v| v.to_firestore_value()).collect()),
        })
    }
}

/// Convert Firestore Value to Rust type.
pub trait FromFirestoreValue: Sized {
    fn from_firestore_value(value: &Value) -> Option<Self>;
}

impl FromFirestoreValue for String {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromFirestoreValue for i64 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as i64),
            _ => None,
        }
    }
}

impl FromFirestoreValue for i32 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        i64::from_firestore_value(value).map(|v| v as i32)
    }
}

impl FromFirestoreValue for u64 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(f) => Some(*f as u64),
            _ => None,
        }
    }
}

impl FromFirestoreValue for f64 {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::DoubleValue(f) => Some(*f),
            Value::IntegerValue(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromFirestoreValue for bool {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::BooleanValue(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromFirestoreValue for DateTime<Utc> {
    fn from_firestore_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimestampValue(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.into()),
            _ => None,
        }
    }
}

// ============================================================================
// Serde Bridge
// ============================================================================

/// Convert a JSON value to its Firestore wire form.
pub fn json_to_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::NullValue(()),
        serde_json::Value::Bool(b) => Value::BooleanValue(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::IntegerValue(i.to_string())
            } else {
                Value::DoubleValue(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::StringValue(s.clone()),
        serde_json::Value::Array(items) => Value::ArrayValue(ArrayValue {
            values: Some(items.iter().map(json_to_value).collect()),
        }),
        serde_json::Value::Object(map) => Value::MapValue(MapValue {
            fields: Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), json_to_value(v)))
                    .collect(),
            ),
        }),
    }
}

/// Convert a Firestore wire value back to JSON.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::NullValue(()) => serde_json::Value::Null,
        Value::BooleanValue(b) => serde_json::Value::Bool(*b),
        Value::IntegerValue(s) => s
            .parse::<i64>()
            .map(|i| serde_json::json!(i))
            .unwrap_or(serde_json::Value::Null),
        Value::DoubleValue(f) => serde_json::json!(f),
        Value::TimestampValue(s) | Value::StringValue(s) | Value::ReferenceValue(s) => {
            serde_json::Value::String(s.clone())
        }
        Value::ArrayValue(arr) => serde_json::Value::Array(
            arr.values
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(value_to_json)
                .collect(),
        ),
        Value::MapValue(map) => serde_json::Value::Object(
            map.fields
                .as_ref()
                .map(|f| {
                    f.iter()
                        .map(|(k, v)| (k.clone(), value_to_json(v)))
                        .collect()
                })
                .unwrap_or_default(),
        ),
    }
}

/// Serialize a model into Firestore document fields.
pub fn to_fields<T: Serialize>(model: &T) -> Result<HashMap<String, Value>, serde_json::Error> {
    let json = serde_json::to_value(model)?;
    match json {
        serde_json::Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), json_to_value(v)))
            .collect()),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Deserialize a model from a Firestore document.
pub fn from_document<T: serde::de::DeserializeOwned>(
    doc: &Document,
) -> Result<T, serde_json::Error> {
    let map = doc
        .fields
        .as_ref()
        .map(|fields| {
            fields
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect()
        })
        .unwrap_or_default();
    serde_json::from_value(serde_json::Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_last_path_segment() {
        let doc = Document {
            name: Some("projects/p/databases/(default)/documents/users/u-42".to_string()),
            fields: None,
            create_time: None,
            update_time: None,
        };
        assert_eq!(doc.doc_id(), Some("u-42"));
    }

    #[test]
    fn where_eq_composes_into_and_filter() {
        let q = StructuredQuery::collection("jobs")
            .where_eq("posted_by", Value::StringValue("e1".into()))
            .where_eq("status", Value::StringValue("Active".into()))
            .where_eq("disability_friendly", Value::BooleanValue(true));
        match q.filter.unwrap() {
            Filter::CompositeFilter(cf) => {
                assert_eq!(cf.op, "AND");
                assert_eq!(cf.filters.len(), 3);
            }
            _ => panic!("expected composite filter"),
        }
    }

    #[test]
    fn batch_status_code_six_maps_to_already_exists() {
        let resp = BatchWriteResponse {
            write_results: None,
            status: Some(vec![
                Status {
                    code: Some(0),
                    message: None,
                },
                Status {
                    code: Some(6),
                    message: Some("already exists".to_string()),
                },
            ]),
        };
        assert!(matches!(
            resp.check_for_errors(),
            Err(crate::error::FirestoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn integer_values_round_trip_as_strings() {
        let v = 42i64.to_firestore_value();
        assert!(matches!(&v, Value::IntegerValue(s) if s == "42"));
        assert_eq!(i64::from_firestore_value(&v), Some(42));
    }

    #[test]
    fn serde_bridge_round_trips_nested_structures() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Inner {
            tags: Vec<String>,
            weight: f64,
        }
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Outer {
            id: String,
            count: i64,
            active: bool,
            inner: Inner,
            note: Option<String>,
        }

        let original = Outer {
            id: "x1".to_string(),
            count: 7,
            active: true,
            inner: Inner {
                tags: vec!["a".to_string(), "b".to_string()],
                weight: 2.5,
            },
            note: None,
        };

        let fields = to_fields(&original).unwrap();
        let doc = Document::new(fields);
        let back: Outer = from_document(&doc).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn to_fields_rejects_non_objects() {
        assert!(to_fields(&42i64).is_err());
    }
}
