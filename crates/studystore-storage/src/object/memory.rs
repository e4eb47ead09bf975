//! In-process object store with S3 listing semantics.
//!
//! Used for tests and offline runs. Counters expose how many requests and
//! mutations reached the store so callers can assert that an operation did
//! or did not touch the backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::client::{ObjectInfo, ObjectListing, ObjectStoreClient, ObjectStoreError};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    etag: String,
    last_modified: DateTime<Utc>,
}

/// An object store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, StoredObject>>>,
    unavailable: AtomicBool,
    requests: AtomicU64,
    mutations: AtomicU64,
}

impl InMemoryObjectStore {
    /// Create an empty store with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already contains the given bucket.
    pub fn with_bucket(bucket: &str) -> Self {
        let mut buckets = BTreeMap::new();
        buckets.insert(bucket.to_string(), BTreeMap::new());
        Self {
            buckets: RwLock::new(buckets),
            ..Self::default()
        }
    }

    /// Create a bucket if it does not exist.
    pub async fn create_bucket(&self, bucket: &str) {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
    }

    /// Remove an object behind the adapter's back. Returns whether it existed.
    pub async fn remove_object(&self, bucket: &str, key: &str) -> bool {
        self.buckets
            .write()
            .await
            .get_mut(bucket)
            .map(|objects| objects.remove(key).is_some())
            .unwrap_or(false)
    }

    /// All keys in a bucket, in order.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make every subsequent request fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of requests received, including failed ones.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of successful writes.
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    fn begin(&self, operation: &str) -> Result<(), ObjectStoreError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ObjectStoreError::Unavailable(format!(
                "{operation} rejected: store offline"
            )));
        }
        Ok(())
    }
}

fn info(key: &str, object: &StoredObject) -> ObjectInfo {
    ObjectInfo {
        key: key.to_string(),
        size: object.body.len() as u64,
        etag: Some(object.etag.clone()),
        last_modified: Some(object.last_modified),
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), ObjectStoreError> {
        self.begin("put_object")?;
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        let sequence = self.mutations.fetch_add(1, Ordering::SeqCst) + 1;
        objects.insert(
            key.to_string(),
            StoredObject {
                etag: format!("\"{:x}-{}\"", sequence, body.len()),
                body,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectInfo>, ObjectStoreError> {
        self.begin("head_object")?;
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(objects.get(key).map(|object| info(key, object)))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, ObjectStoreError> {
        self.begin("get_object")?;
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(objects.get(key).map(|object| object.body.clone()))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<char>,
    ) -> Result<ObjectListing, ObjectStoreError> {
        self.begin("list_objects")?;
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;

        let mut listing = ObjectListing::default();
        for (key, object) in objects.range(prefix.to_string()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };
            let rolled_up = delimiter.and_then(|d| rest.find(d).map(|idx| idx + d.len_utf8()));
            match rolled_up {
                Some(end) => {
                    let common = format!("{prefix}{}", &rest[..end]);
                    if listing.common_prefixes.last() != Some(&common) {
                        listing.common_prefixes.push(common);
                    }
                }
                None => listing.objects.push(info(key, object)),
            }
        }
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryObjectStore {
        let store = InMemoryObjectStore::with_bucket("bkt");
        for key in ["a/", "a/one.txt", "a/b/", "a/b/two.txt", "a/c/three.txt", "ab.txt"] {
            store
                .put_object("bkt", key, Bytes::from_static(b"x"))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_list_with_delimiter_rolls_up_children() {
        let store = seeded().await;
        let listing = store.list_objects("bkt", "a/", Some('/')).await.unwrap();
        let keys: Vec<_> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a/", "a/one.txt"]);
        assert_eq!(listing.common_prefixes, vec!["a/b/", "a/c/"]);
    }

    #[tokio::test]
    async fn test_list_without_delimiter_is_recursive() {
        let store = seeded().await;
        let listing = store.list_objects("bkt", "a/", None).await.unwrap();
        assert_eq!(listing.objects.len(), 5);
        assert!(listing.common_prefixes.is_empty());
    }

    #[tokio::test]
    async fn test_missing_bucket_and_offline_store() {
        let store = InMemoryObjectStore::new();
        assert!(matches!(
            store.head_object("nope", "k").await,
            Err(ObjectStoreError::NoSuchBucket(_))
        ));

        store.create_bucket("bkt").await;
        store.set_unavailable(true);
        assert!(matches!(
            store.list_objects("bkt", "", None).await,
            Err(ObjectStoreError::Unavailable(_))
        ));
        assert_eq!(store.mutation_count(), 0);
        assert_eq!(store.request_count(), 2);
    }
}
