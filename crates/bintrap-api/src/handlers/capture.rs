//! The capture endpoint: any request to a bin's URL becomes a record.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::{header, StatusCode},
    Json,
};
use bintrap_core::{models::BinId, BodyPayload, BodyReadError, InboundRequest};
use tracing::{instrument, warn};

use crate::{
    error::ApiResult,
    render::{self, Document},
    server::AppState,
};

/// Captures one inbound request for a bin, any method.
///
/// Metadata extraction never fails; absent headers default to empty or
/// zero. The body is read exactly once, and a failed read is downgraded to
/// a warning: the record still persists with everything but the payload.
///
/// # Errors
///
/// - 404: bin does not exist (no record is written)
/// - 500: persistence failure
#[instrument(name = "capture_request", skip(state, request), fields(bin_id = %id))]
pub async fn capture_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let (parts, body) = request.into_parts();

    let user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let content_length = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(0);

    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    // The stream is not re-readable; one attempt, then capture what we have.
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => BodyPayload::Read(bytes),
        Err(e) => BodyPayload::Failed { error: BodyReadError(e.to_string()) },
    };

    let inbound = InboundRequest {
        method: parts.method.to_string(),
        protocol: format!("{:?}", parts.version),
        user_agent,
        remote_addr,
        content_length,
        body,
    };

    let bin_id = BinId::from(id);
    let capture = state.capture.capture(&bin_id, inbound).await?;

    if let Some(error) = &capture.body_error {
        warn!(
            bin_id = %bin_id,
            request_id = %capture.request.id,
            error = %error,
            "captured request without body"
        );
    }

    let document = render::request_document(state.base_url(), &capture.request);

    Ok((StatusCode::CREATED, Json(document)))
}
