//! Bin creation and retrieval handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bintrap_core::models::BinId;
use tracing::instrument;

use crate::{
    error::ApiResult,
    render::{self, CollectionDocument, Document},
    server::AppState,
};

/// Creates a new bin.
///
/// No request body: bins carry no caller-supplied fields. Returns 201 with
/// the rendered bin, counters zeroed.
#[instrument(name = "create_bin", skip_all)]
pub async fn create_bin(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<Document>)> {
    let bin = state.bins.create().await?;

    let stats = std::collections::HashMap::new();
    let document = render::bin_document(state.base_url(), &bin, Some(&stats));

    Ok((StatusCode::CREATED, Json(document)))
}

/// Lists all bins in creation order.
#[instrument(name = "list_bins", skip_all)]
pub async fn list_bins(State(state): State<AppState>) -> ApiResult<Json<CollectionDocument>> {
    let bins = state.bins.list().await?;

    Ok(Json(render::bin_collection(state.base_url(), &bins)))
}

/// Fetches one bin, counters included in `meta`.
#[instrument(name = "get_bin", skip(state))]
pub async fn get_bin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let bin_id = BinId::from(id);
    let bin = state.bins.get(&bin_id).await?;
    let stats = state.bins.stats(&bin_id).await?;

    Ok(Json(render::bin_document(state.base_url(), &bin, Some(&stats))))
}
