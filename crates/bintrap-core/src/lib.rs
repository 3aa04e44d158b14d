//! Core domain types and capture pipeline.
//!
//! Provides the bin and request models, the error taxonomy, identifier
//! generation, storage repositories, and the services that turn an inbound
//! HTTP request into a durable record. The API crate depends on these types
//! and adds the HTTP surface on top.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bins;
pub mod capture;
pub mod error;
pub mod ids;
pub mod models;
pub mod storage;

pub use bins::BinService;
pub use capture::{BodyPayload, Capture, CaptureService, InboundRequest};
pub use error::{BodyReadError, CoreError, Result};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use models::{Bin, BinId, CapturedRequest, RequestId};
pub use storage::{Storage, REQUESTS_COUNTER};
