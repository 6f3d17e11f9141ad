//! Object storage gateway — bucket provisioning and object publishing.
//!
//! Talks to the configured MinIO endpoint through the S3 API with path-style
//! addressing. The bucket check-and-create runs before every publish and is
//! idempotent. Storage failures are absorbed here and surface as `None`.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use std::path::Path;

use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Region assigned to newly created buckets
const BUCKET_REGION: &str = "local";

/// Content type written when the fetch produced none
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Trait for publishing staged files into object storage
///
/// The migration pipeline is written against this seam so tests can swap in
/// an in-memory fake; [`S3ObjectStore`] is the real implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write the file at `local_path` under `key` and return its public URL.
    /// Returns `None` on any storage failure — errors never propagate.
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: Option<&str>,
    ) -> Option<String>;

    /// Base URL under which published objects are reachable; used by the
    /// record processor's skip check.
    fn public_base(&self) -> &str;
}

/// Object store backed by an S3-compatible endpoint
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base: String,
}

impl S3ObjectStore {
    /// Build a client for the configured endpoint with static credentials
    /// and path-style addressing (required by MinIO).
    pub fn new(storage: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &storage.access_key,
            &storage.secret_key,
            None,
            None,
            "plant-mirror-env",
        );

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(storage.endpoint_url())
            .region(Region::new(BUCKET_REGION))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket: storage.bucket.clone(),
            public_base: storage.public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL of an object under the configured bucket
    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, key)
    }

    /// Check that the target bucket exists, creating it with a public-read
    /// policy if it doesn't. Safe to repeat on every publish.
    async fn ensure_bucket(&self) -> Result<()> {
        let head = self.client.head_bucket().bucket(&self.bucket).send().await;

        match head {
            Ok(_) => Ok(()),
            Err(err) => {
                let not_found = err.as_service_error().is_some_and(
                    aws_sdk_s3::operation::head_bucket::HeadBucketError::is_not_found,
                );
                if !not_found {
                    return Err(Error::Storage(format!(
                        "failed to check bucket '{}': {}",
                        self.bucket,
                        DisplayErrorContext(&err)
                    )));
                }

                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| {
                        Error::Storage(format!(
                            "failed to create bucket '{}': {}",
                            self.bucket,
                            DisplayErrorContext(&e)
                        ))
                    })?;

                let policy = serde_json::to_string(&BucketPolicy::public_read(&self.bucket))?;
                self.client
                    .put_bucket_policy()
                    .bucket(&self.bucket)
                    .policy(policy)
                    .send()
                    .await
                    .map_err(|e| {
                        Error::Storage(format!(
                            "failed to set policy on bucket '{}': {}",
                            self.bucket,
                            DisplayErrorContext(&e)
                        ))
                    })?;

                tracing::info!(bucket = %self.bucket, "created bucket with public-read policy");
                Ok(())
            }
        }
    }

    async fn publish_inner(
        &self,
        local_path: &Path,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<String> {
        self.ensure_bucket().await?;

        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            Error::Storage(format!(
                "failed to read staged file '{}': {}",
                local_path.display(),
                e
            ))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type.unwrap_or(DEFAULT_CONTENT_TYPE))
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "failed to upload object '{}': {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(self.object_url(key))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: Option<&str>,
    ) -> Option<String> {
        match self.publish_inner(local_path, key, content_type).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to publish object");
                None
            }
        }
    }

    fn public_base(&self) -> &str {
        &self.public_base
    }
}

/// S3 bucket policy document
#[derive(Debug, Serialize)]
struct BucketPolicy {
    #[serde(rename = "Version")]
    version: &'static str,
    #[serde(rename = "Statement")]
    statement: Vec<PolicyStatement>,
}

/// One statement of a bucket policy
#[derive(Debug, Serialize)]
struct PolicyStatement {
    #[serde(rename = "Effect")]
    effect: &'static str,
    #[serde(rename = "Principal")]
    principal: PolicyPrincipal,
    #[serde(rename = "Action")]
    action: Vec<&'static str>,
    #[serde(rename = "Resource")]
    resource: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PolicyPrincipal {
    #[serde(rename = "AWS")]
    aws: Vec<&'static str>,
}

impl BucketPolicy {
    /// Policy allowing anonymous `GetObject` on every key in `bucket`
    fn public_read(bucket: &str) -> Self {
        Self {
            version: "2012-10-17",
            statement: vec![PolicyStatement {
                effect: "Allow",
                principal: PolicyPrincipal { aws: vec!["*"] },
                action: vec!["s3:GetObject"],
                resource: vec![format!("arn:aws:s3:::{}/*", bucket)],
            }],
        }
    }
}
