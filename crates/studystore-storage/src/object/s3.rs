//! S3-compatible object-store client backed by `aws-sdk-s3`.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use studystore_core::config::IntegrationConfig;

use super::client::{ObjectInfo, ObjectListing, ObjectStoreClient, ObjectStoreError};

/// Object-store client talking to AWS S3 or any S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    integration: String,
}

impl S3ObjectStore {
    /// Build a client from an integration entry.
    ///
    /// Static credentials are used when an access key is configured, otherwise
    /// the ambient AWS credential chain. Every operation is bounded by
    /// `operation_timeout`.
    pub async fn from_integration(integration: &IntegrationConfig, operation_timeout: Duration) -> Self {
        info!(
            integration = %integration.name,
            endpoint = %integration.endpoint,
            region = %integration.region,
            "Initializing S3 object store client"
        );

        let timeouts = TimeoutConfig::builder()
            .operation_timeout(operation_timeout)
            .build();

        let mut builder = if integration.access_key.is_empty() {
            let shared = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(integration.region.clone()))
                .load()
                .await;
            aws_sdk_s3::config::Builder::from(&shared)
        } else {
            let credentials = Credentials::new(
                &integration.access_key,
                &integration.secret_key,
                None,
                None,
                "studystore",
            );
            aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .credentials_provider(credentials)
                .region(Region::new(integration.region.clone()))
        };

        builder = builder
            .timeout_config(timeouts)
            .force_path_style(integration.force_path_style);
        if !integration.endpoint.is_empty() {
            builder = builder.endpoint_url(&integration.endpoint);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            integration: integration.name.clone(),
        }
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: aws_sdk_s3::Client, integration: impl Into<String>) -> Self {
        Self {
            client,
            integration: integration.into(),
        }
    }
}

fn to_chrono(value: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

fn map_sdk_error<E>(operation: &str, bucket: &str, err: SdkError<E>) -> ObjectStoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::TimeoutError(_) => ObjectStoreError::Timeout(operation.to_string()),
        SdkError::DispatchFailure(_) => {
            ObjectStoreError::Transport(format!("{operation}: {}", DisplayErrorContext(&err)))
        }
        SdkError::ServiceError(service) => {
            let status = service.raw().status().as_u16();
            let code = service.err().code().unwrap_or_default();
            let message = service
                .err()
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
            match (status, code) {
                (_, "NoSuchBucket") => ObjectStoreError::NoSuchBucket(bucket.to_string()),
                (403, _) => ObjectStoreError::AccessDenied(message),
                (503, _) => ObjectStoreError::Unavailable(message),
                _ => ObjectStoreError::Service { status, message },
            }
        }
        SdkError::ResponseError(response) => ObjectStoreError::Service {
            status: response.raw().status().as_u16(),
            message: DisplayErrorContext(&err).to_string(),
        },
        _ => ObjectStoreError::Service {
            status: 0,
            message: format!("{operation}: {}", DisplayErrorContext(&err)),
        },
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), ObjectStoreError> {
        debug!(integration = %self.integration, bucket, key, size = body.len(), "S3 put_object");
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| map_sdk_error("put_object", bucket, e))?;
        Ok(())
    }

    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectInfo>, ObjectStoreError> {
        let result = self.client.head_object().bucket(bucket).key(key).send().await;
        match result {
            Ok(output) => Ok(Some(ObjectInfo {
                key: key.to_string(),
                size: output.content_length().unwrap_or(0).max(0) as u64,
                etag: output.e_tag().map(str::to_string),
                last_modified: output.last_modified().and_then(to_chrono),
            })),
            Err(SdkError::ServiceError(service)) if service.err().is_not_found() => Ok(None),
            Err(e) => Err(map_sdk_error("head_object", bucket, e)),
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, ObjectStoreError> {
        let result = self.client.get_object().bucket(bucket).key(key).send().await;
        match result {
            Ok(output) => {
                let body = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| ObjectStoreError::Transport(format!("reading body of {key}: {e}")))?;
                Ok(Some(body.into_bytes()))
            }
            Err(SdkError::ServiceError(service)) if service.err().is_no_such_key() => Ok(None),
            Err(e) => Err(map_sdk_error("get_object", bucket, e)),
        }
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<char>,
    ) -> Result<ObjectListing, ObjectStoreError> {
        let mut listing = ObjectListing::default();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(delimiter) = delimiter {
                request = request.delimiter(delimiter.to_string());
            }
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let output = request
                .send()
                .await
                .map_err(|e| map_sdk_error("list_objects_v2", bucket, e))?;

            for object in output.contents.unwrap_or_default() {
                let Some(key) = object.key else { continue };
                listing.objects.push(ObjectInfo {
                    key,
                    size: object.size.unwrap_or(0).max(0) as u64,
                    etag: object.e_tag,
                    last_modified: object.last_modified.as_ref().and_then(to_chrono),
                });
            }
            listing.common_prefixes.extend(
                output
                    .common_prefixes
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|p| p.prefix),
            );

            if output.is_truncated.unwrap_or(false) {
                continuation_token = output.next_continuation_token;
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        debug!(
            integration = %self.integration,
            bucket,
            prefix,
            objects = listing.objects.len(),
            prefixes = listing.common_prefixes.len(),
            "S3 list_objects_v2"
        );
        Ok(listing)
    }
}
