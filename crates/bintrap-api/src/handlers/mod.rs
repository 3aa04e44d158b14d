//! HTTP request handlers for the bintrap API.
//!
//! Handlers follow one pattern: extract path parameters, delegate to the
//! core services, render the result as a JSON:API document. Errors bubble
//! as [`crate::ApiError`] and become `errors` documents with the mapped
//! status.

use axum::{extract::State, Json};
use serde_json::{json, Value};

pub mod bins;
pub mod capture;
pub mod health;
pub mod requests;

pub use bins::{create_bin, get_bin, list_bins};
pub use capture::capture_request;
pub use health::{health_check, liveness_check, readiness_check};
pub use requests::{get_request, list_requests};

use crate::server::AppState;

/// Service descriptor served at the API root.
///
/// Mirrors the rendered-document shape so clients can discover the bins
/// collection without hardcoding paths.
pub async fn get_root(State(state): State<AppState>) -> Json<Value> {
    let base = state.base_url();

    Json(json!({
        "data": {
            "id": env!("CARGO_PKG_NAME"),
            "type": "service",
            "attributes": {
                "version": env!("CARGO_PKG_VERSION"),
            },
            "links": {
                "self": base,
                "bins": format!("{base}/bins"),
            },
        }
    }))
}
