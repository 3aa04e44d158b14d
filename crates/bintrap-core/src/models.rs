//! Domain models and strongly-typed identifiers.
//!
//! Defines bins, captured requests, and newtype ID wrappers with the sqlx
//! traits needed to move them through PostgreSQL rows unchanged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Strongly-typed bin identifier.
///
/// Wraps the random alphanumeric token that doubles as the routing key in
/// the public capture URL. Immutable once assigned; the `bins` primary key
/// is the last line of defense against the improbable collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinId(pub String);

impl BinId {
    /// Token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BinId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for BinId {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl sqlx::Type<PgDb> for BinId {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for BinId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let token = <String as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(token))
    }
}

impl sqlx::Encode<'_, PgDb> for BinId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <String as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Strongly-typed captured-request identifier.
///
/// UUID v4, assigned once at capture time. Requests are immutable after
/// capture and this ID follows them through retrieval and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Parses a request ID from its canonical string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl sqlx::Type<PgDb> for RequestId {
    fn type_info() -> PgTypeInfo {
        <Uuid as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for RequestId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl sqlx::Encode<'_, PgDb> for RequestId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <Uuid as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// A bin is an inbound endpoint that accumulates captured requests.
///
/// Bins carry no caller-supplied fields; identity and creation time are all
/// there is. Counters live in `bin_stats` and are joined in at render time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bin {
    /// Unique token identifying this bin.
    pub id: BinId,

    /// When the bin was created.
    pub created_at: DateTime<Utc>,
}

/// A durable record of one HTTP request received by a bin.
///
/// Metadata fields are verbatim copies of what the inbound request carried,
/// defaulted to empty or zero when absent. The body is stored as text; the
/// structured view is derived at render time, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CapturedRequest {
    /// Unique identifier assigned at capture.
    pub id: RequestId,

    /// Owning bin. Weak back-reference: requests never outlive the scope
    /// where bins are deleted, and nothing cascades.
    pub bin_id: BinId,

    /// HTTP method, e.g. `POST`.
    pub method: String,

    /// Protocol version as sent, e.g. `HTTP/1.1`.
    pub protocol: String,

    /// `User-Agent` header value; empty when absent.
    pub user_agent: String,

    /// Peer address the request arrived from; empty when unknown.
    pub remote_addr: String,

    /// Declared `Content-Length`; zero when absent or unparseable.
    pub content_length: i64,

    /// Raw payload as text; empty when the body could not be read.
    pub body: String,

    /// When the request was captured.
    pub created_at: DateTime<Utc>,
}
