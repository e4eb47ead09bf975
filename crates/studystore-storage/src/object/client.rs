//! Minimal object-store client surface used by the object-storage adapter.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Entity tag reported by the backend.
    pub etag: Option<String>,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Result of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    /// Objects directly matching the prefix (including a marker equal to it).
    pub objects: Vec<ObjectInfo>,
    /// Key prefixes rolled up at the delimiter, each ending with it.
    pub common_prefixes: Vec<String>,
}

impl ObjectListing {
    /// Whether the listing found nothing at all.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.common_prefixes.is_empty()
    }
}

/// Errors raised by object-store clients. Translated to `AppError` by the
/// adapter and never returned past it.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// The request exceeded its operation timeout.
    #[error("request timed out during {0}")]
    Timeout(String),
    /// The request could not be dispatched (DNS, TLS, connection refused).
    #[error("transport failure: {0}")]
    Transport(String),
    /// Credentials were rejected.
    #[error("access denied: {0}")]
    AccessDenied(String),
    /// The bucket does not exist.
    #[error("bucket '{0}' does not exist")]
    NoSuchBucket(String),
    /// The backend is temporarily unavailable.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Any other error response.
    #[error("service error (status {status}): {message}")]
    Service {
        /// HTTP status of the response.
        status: u16,
        /// Backend message.
        message: String,
    },
}

/// The object-store operations the adapter relies on.
///
/// Implementations must emulate S3 listing semantics: with a delimiter,
/// keys below the prefix that contain the delimiter after it are rolled up
/// into `common_prefixes`.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync + std::fmt::Debug + 'static {
    /// Store `body` under `key`, replacing any existing object.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), ObjectStoreError>;

    /// Fetch an object's metadata, or `None` if no object has exactly this key.
    async fn head_object(&self, bucket: &str, key: &str)
    -> Result<Option<ObjectInfo>, ObjectStoreError>;

    /// Fetch an object's content, or `None` if it does not exist.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, ObjectStoreError>;

    /// List objects under `prefix`, rolling up at `delimiter` when given.
    /// Implementations follow continuation tokens and return every page.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<char>,
    ) -> Result<ObjectListing, ObjectStoreError>;
}
