//! Bintrap HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod server;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use server::{create_router, start_server, AppState};
