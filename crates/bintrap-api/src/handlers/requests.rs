//! Retrieval handlers for captured requests.

use axum::{
    extract::{Path, State},
    Json,
};
use bintrap_core::models::{BinId, RequestId};
use tracing::instrument;

use crate::{
    error::{ApiError, ApiResult},
    render::{self, CollectionDocument, Document},
    server::AppState,
};

/// Lists all requests captured for a bin, oldest first.
#[instrument(name = "list_requests", skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CollectionDocument>> {
    let bin_id = BinId::from(id);

    // Listing against an unknown bin is a 404, not an empty collection.
    state.bins.get(&bin_id).await?;

    let requests = state.storage.requests.list_for_bin(&bin_id).await?;

    Ok(Json(render::request_collection(state.base_url(), &requests)))
}

/// Fetches one captured request, scoped to its bin.
#[instrument(name = "get_request", skip(state))]
pub async fn get_request(
    State(state): State<AppState>,
    Path((id, request_id)): Path<(String, String)>,
) -> ApiResult<Json<Document>> {
    let bin_id = BinId::from(id);
    state.bins.get(&bin_id).await?;

    // An unparseable ID can't name any stored request.
    let request_id = RequestId::parse(&request_id)
        .ok_or_else(|| ApiError::NotFound(format!("request {request_id} does not exist")))?;

    let request = state
        .storage
        .requests
        .find_for_bin(&bin_id, request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("request {request_id} does not exist")))?;

    Ok(Json(render::request_document(state.base_url(), &request)))
}
