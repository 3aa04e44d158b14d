//! JSON:API rendering of bins and captured requests.
//!
//! Pure functions from persisted entities to response documents: same
//! entity and same base URL, same output. Links are computed from the
//! configured public base URL; nothing here touches the database.

use std::collections::{BTreeMap, HashMap};

use bintrap_core::models::{Bin, CapturedRequest};
use serde::Serialize;
use serde_json::{Map, Value};

/// Resource type tag for bins.
pub const BIN_TYPE: &str = "bin";

/// Resource type tag for captured requests.
pub const REQUEST_TYPE: &str = "request";

/// Top-level document wrapping a single resource.
#[derive(Debug, Serialize)]
pub struct Document {
    /// The rendered resource.
    pub data: Resource,
}

/// Top-level document wrapping a resource collection.
#[derive(Debug, Serialize)]
pub struct CollectionDocument {
    /// Rendered resources, ordering preserved from input.
    pub data: Vec<Resource>,
    /// Collection-level metadata.
    pub meta: CollectionMeta,
}

/// Metadata attached to collection documents.
#[derive(Debug, Serialize)]
pub struct CollectionMeta {
    /// Number of resources in `data`.
    pub count: usize,
}

/// One rendered entity in the JSON:API shape.
#[derive(Debug, Serialize)]
pub struct Resource {
    /// Entity identifier.
    pub id: String,
    /// Resource type tag.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Entity attributes.
    pub attributes: Map<String, Value>,
    /// Related URLs, computed from the configured base URL.
    pub links: BTreeMap<&'static str, String>,
    /// Resource-level metadata.
    pub meta: Map<String, Value>,
}

/// Top-level error document.
#[derive(Debug, Serialize)]
pub struct ErrorDocument {
    /// One entry per error; this service only ever reports one.
    pub errors: Vec<ErrorObject>,
}

/// A single rendered error.
#[derive(Debug, Serialize)]
pub struct ErrorObject {
    /// HTTP status the error maps to, as a string per the JSON:API shape.
    pub status: String,
    /// Human-readable description.
    pub detail: String,
}

/// Structured view of a stored body, derived at render time.
///
/// The parsed form is never persisted; storage keeps one copy of the raw
/// text and presentation re-derives this on demand.
#[derive(Debug, PartialEq)]
pub enum RenderedBody {
    /// The stored text is valid JSON; render the structured value.
    Parsed(Value),
    /// Anything else passes through unchanged.
    Raw(String),
}

impl RenderedBody {
    /// Derives the rendered form of a stored body.
    ///
    /// Returns `None` for an empty body, which is omitted from the
    /// document entirely.
    pub fn from_stored(body: &str) -> Option<Self> {
        if body.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(body) {
            Ok(value) => Some(Self::Parsed(value)),
            Err(_) => Some(Self::Raw(body.to_string())),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Parsed(value) => value,
            Self::Raw(text) => Value::String(text),
        }
    }
}

fn trimmed(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

fn created_meta(created_at: chrono::DateTime<chrono::Utc>) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert("created".to_string(), Value::String(created_at.to_rfc3339()));
    meta
}

/// Renders one bin.
///
/// When `stats` is supplied (single-bin reads), counters land in `meta`
/// with the `requests` counter zero-defaulted; collections skip counters.
pub fn bin_resource(base_url: &str, bin: &Bin, stats: Option<&HashMap<String, i64>>) -> Resource {
    let base = trimmed(base_url);

    let mut links = BTreeMap::new();
    links.insert("self", format!("{base}/bins/{}", bin.id));
    links.insert("requests", format!("{base}/bins/{}/requests", bin.id));

    let mut meta = created_meta(bin.created_at);
    if let Some(counters) = stats {
        meta.insert("requests".to_string(), Value::from(0));
        for (counter, value) in counters {
            meta.insert(counter.clone(), Value::from(*value));
        }
    }

    Resource {
        id: bin.id.to_string(),
        kind: BIN_TYPE,
        attributes: Map::new(),
        links,
        meta,
    }
}

/// Renders one bin as a complete document.
pub fn bin_document(base_url: &str, bin: &Bin, stats: Option<&HashMap<String, i64>>) -> Document {
    Document { data: bin_resource(base_url, bin, stats) }
}

/// Renders a sequence of bins, order preserved.
pub fn bin_collection(base_url: &str, bins: &[Bin]) -> CollectionDocument {
    let data: Vec<Resource> = bins.iter().map(|bin| bin_resource(base_url, bin, None)).collect();
    let count = data.len();

    CollectionDocument { data, meta: CollectionMeta { count } }
}

/// Renders one captured request.
///
/// `attributes.body` is the parsed JSON value when the stored text parses,
/// the raw string otherwise, and omitted entirely when the body is empty.
pub fn request_resource(base_url: &str, request: &CapturedRequest) -> Resource {
    let base = trimmed(base_url);

    let mut attributes = Map::new();
    attributes.insert("method".to_string(), Value::String(request.method.clone()));
    attributes.insert("protocol".to_string(), Value::String(request.protocol.clone()));
    attributes.insert("content_length".to_string(), Value::from(request.content_length));
    attributes.insert("user_agent".to_string(), Value::String(request.user_agent.clone()));
    attributes.insert("remote_addr".to_string(), Value::String(request.remote_addr.clone()));
    if let Some(body) = RenderedBody::from_stored(&request.body) {
        attributes.insert("body".to_string(), body.into_value());
    }

    let mut links = BTreeMap::new();
    links.insert("self", format!("{base}/bins/{}/requests/{}", request.bin_id, request.id));
    links.insert("bin", format!("{base}/bins/{}", request.bin_id));

    Resource {
        id: request.id.to_string(),
        kind: REQUEST_TYPE,
        attributes,
        links,
        meta: created_meta(request.created_at),
    }
}

/// Renders one captured request as a complete document.
pub fn request_document(base_url: &str, request: &CapturedRequest) -> Document {
    Document { data: request_resource(base_url, request) }
}

/// Renders a sequence of captured requests, order preserved.
pub fn request_collection(base_url: &str, requests: &[CapturedRequest]) -> CollectionDocument {
    let data: Vec<Resource> =
        requests.iter().map(|request| request_resource(base_url, request)).collect();
    let count = data.len();

    CollectionDocument { data, meta: CollectionMeta { count } }
}

/// Renders an error as a top-level `errors` document.
pub fn error_document(status: u16, detail: impl Into<String>) -> ErrorDocument {
    ErrorDocument {
        errors: vec![ErrorObject { status: status.to_string(), detail: detail.into() }],
    }
}
