//! Feed record types and content digests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A single feed record as it travels through the queue
///
/// The envelope is deliberately thin: `id` is advisory producer metadata and
/// is never used for dedup or routing, while `payload` carries the actual
/// document and may have any JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Optional producer-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Arbitrary JSON document body
    pub payload: Value,
}

impl Record {
    /// Create a record with no producer id
    pub fn new(payload: Value) -> Self {
        Self { id: None, payload }
    }

    /// Attach a producer-assigned id
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// SHA-256 content digest over the canonical JSON text of the envelope
    ///
    /// The digest is a pure function of record content: object key order and
    /// processing time never change it, so reprocessing the same record
    /// always yields the same value.
    pub fn digest(&self) -> String {
        let mut out = String::new();
        out.push('{');
        if let Some(id) = &self.id {
            out.push_str("\"id\":");
            write_escaped_string(id, &mut out);
            out.push(',');
        }
        out.push_str("\"payload\":");
        write_canonical(&self.payload, &mut out);
        out.push('}');
        hex::encode(Sha256::digest(out.as_bytes()))
    }
}

/// Result of successfully transforming one record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedRecord {
    /// The original record
    pub record: Record,
    /// Content digest, hex-encoded SHA-256
    pub digest: String,
    /// Offset of the record within its batch
    pub position: usize,
    /// Trace id of the batch that processed this record
    pub trace_id: Uuid,
    /// Transform completion time
    pub processed_at: DateTime<Utc>,
}

/// Render a JSON value in canonical form: object keys sorted at every
/// nesting level, arrays in order, serde_json's own number and string
/// formatting
///
/// The sort is explicit rather than relying on serde_json's map ordering, so
/// the digest stays stable even if a dependency enables `preserve_order`.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_escaped_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_escaped_string(key, out);
                out.push(':');
                if let Some(v) = map.get(key) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
    }
}

/// JSON string escaping matching serde_json's compact output: quote,
/// backslash, and control characters only
fn write_escaped_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{20}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
