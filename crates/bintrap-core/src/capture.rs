//! Request capture service.
//!
//! Converts a raw inbound HTTP request into a persisted record. The one
//! piece of the pipeline with real failure-tolerance nuance: a body that
//! cannot be read must not cost us the rest of the record.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    error::{BodyReadError, CoreError, Result},
    ids::IdGenerator,
    models::{BinId, CapturedRequest, RequestId},
    storage::{Storage, REQUESTS_COUNTER},
};

/// Outcome of reading the inbound body stream.
///
/// The stream is consumed at most once; there is no retry. When the read
/// fails, nothing of the body is kept and the error travels with the
/// capture as a soft signal.
#[derive(Debug)]
pub enum BodyPayload {
    /// The body was read to completion.
    Read(Bytes),

    /// The read failed; the capture proceeds with an empty body.
    Failed {
        /// What went wrong with the stream.
        error: BodyReadError,
    },
}

/// Metadata and body of an inbound request, decoupled from any HTTP stack.
///
/// Extraction of these fields never fails: absent values arrive here
/// already defaulted to empty strings or zero.
#[derive(Debug)]
pub struct InboundRequest {
    /// HTTP method, e.g. `POST`.
    pub method: String,

    /// Protocol version, e.g. `HTTP/1.1`.
    pub protocol: String,

    /// `User-Agent` header value; empty when absent.
    pub user_agent: String,

    /// Peer address; empty when unknown.
    pub remote_addr: String,

    /// Declared `Content-Length`; zero when absent or unparseable.
    pub content_length: i64,

    /// The body read outcome.
    pub body: BodyPayload,
}

/// A persisted capture plus the optional soft error from the body read.
///
/// Both halves together let callers decide whether partial capture is a
/// warning or a failure; this crate only decides that it is never fatal.
#[derive(Debug)]
pub struct Capture {
    /// The durable record.
    pub request: CapturedRequest,

    /// Present when the body stream could not be read.
    pub body_error: Option<BodyReadError>,
}

/// Builds the record that will be persisted for an inbound request.
///
/// Pure: all fallible work (existence check, persistence) stays in
/// [`CaptureService::capture`]. Body bytes are stored as text via lossy
/// UTF-8 conversion, and a failed read yields an empty body while every
/// metadata field is preserved.
pub fn build_record(
    id: RequestId,
    bin_id: BinId,
    inbound: InboundRequest,
    created_at: DateTime<Utc>,
) -> (CapturedRequest, Option<BodyReadError>) {
    let (body, body_error) = match inbound.body {
        BodyPayload::Read(bytes) => (String::from_utf8_lossy(&bytes).into_owned(), None),
        BodyPayload::Failed { error } => (String::new(), Some(error)),
    };

    let request = CapturedRequest {
        id,
        bin_id,
        method: inbound.method,
        protocol: inbound.protocol,
        user_agent: inbound.user_agent,
        remote_addr: inbound.remote_addr,
        content_length: inbound.content_length,
        body,
        created_at,
    };

    (request, body_error)
}

/// Service that turns inbound requests into durable records.
#[derive(Clone)]
pub struct CaptureService {
    storage: Storage,
    ids: Arc<dyn IdGenerator>,
}

impl CaptureService {
    /// Creates a new capture service.
    pub fn new(storage: Storage, ids: Arc<dyn IdGenerator>) -> Self {
        Self { storage, ids }
    }

    /// Captures one inbound request for a bin.
    ///
    /// The bin must exist; when it does not, no row is written and
    /// `CoreError::NotFound` is returned. A failed body read does not
    /// abort the capture: the record persists with an empty body and the
    /// soft error is handed back for the caller to log.
    ///
    /// The row write and the counter increment form one logical operation
    /// with best-effort consistency: if the increment fails after the row
    /// is durable, the divergence is logged and the capture still
    /// succeeds. The reverse (counter without row) cannot happen.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown bin and
    /// `CoreError::Database`/`ConstraintViolation` when persisting the row
    /// fails.
    pub async fn capture(&self, bin_id: &BinId, inbound: InboundRequest) -> Result<Capture> {
        let bin = self
            .storage
            .bins
            .find_by_id(bin_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("bin {bin_id} does not exist")))?;

        let (request, body_error) =
            build_record(self.ids.request_id(), bin.id.clone(), inbound, Utc::now());

        self.storage.requests.create(&request).await?;

        if let Err(e) = self.storage.stats.increment(&bin.id, REQUESTS_COUNTER).await {
            warn!(
                bin_id = %bin.id,
                request_id = %request.id,
                error = %e,
                "request persisted but counter increment failed"
            );
        }

        Ok(Capture { request, body_error })
    }
}
