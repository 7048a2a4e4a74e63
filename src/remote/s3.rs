//! S3 implementation of the object-store boundary.
//!
//! Credentials come from the standard AWS credential chain (environment,
//! shared config, instance metadata). A custom endpoint URL switches the
//! client to path-style addressing for compatibility with S3-compatible
//! services (MinIO, Backblaze B2, and the like).

use crate::remote::{FetchError, ListError, ListedObject, ObjectPage, ObjectStore};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;

/// Object store backed by the AWS SDK.
#[derive(Debug, Clone)]
pub struct S3Store {
    s3: aws_sdk_s3::Client,
    sts: aws_sdk_sts::Client,
}

impl S3Store {
    /// Build a client from the ambient AWS configuration.
    ///
    /// # Arguments
    ///
    /// * `region` - Region override; falls back to the credential chain's
    ///   default when absent.
    /// * `endpoint_url` - Custom endpoint for S3-compatible services.
    pub async fn connect(region: Option<String>, endpoint_url: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(4));
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(url) = endpoint_url.clone() {
            loader = loader.endpoint_url(url);
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if endpoint_url.is_some() {
            // Path-style addressing for non-AWS services.
            builder = builder.force_path_style(true);
        }
        let s3 = aws_sdk_s3::Client::from_conf(builder.build());
        let sts = aws_sdk_sts::Client::new(&shared);
        Self { s3, sts }
    }
}

fn code_and_message<E>(err: &E) -> String
where
    E: ProvideErrorMetadata,
{
    format!(
        "{} - {}",
        err.code().unwrap_or("unknown"),
        err.message().unwrap_or("no further detail")
    )
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn is_authenticated(&self) -> bool {
        match self.sts.get_caller_identity().send().await {
            Ok(identity) => {
                log::debug!(
                    "Authenticated as {}",
                    identity.arn().unwrap_or("<unknown identity>")
                );
                true
            }
            Err(err) => {
                log::error!("AWS credential check failed: {}", code_and_message(&err));
                false
            }
        }
    }

    async fn list_page(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ListError> {
        let mut request = self.s3.list_objects_v2().bucket(bucket);
        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }

        let output = request.send().await.map_err(|err| match err.code() {
            Some("AccessDenied") => ListError::AccessDenied(bucket.to_string()),
            Some("NoSuchBucket") => ListError::NotFound(bucket.to_string()),
            _ => ListError::Other(code_and_message(&err)),
        })?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?.to_string();
                // The listing API returns ETags wrapped in quotes.
                let etag = object.e_tag().unwrap_or_default().trim_matches('"').to_string();
                let storage_class = object.storage_class().map(|class| class.as_str().to_string());
                Some(ListedObject {
                    key,
                    etag,
                    storage_class,
                })
            })
            .collect();

        Ok(ObjectPage {
            objects,
            next: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .s3
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err.code() {
                Some("AccessDenied") => FetchError::AccessDenied,
                _ => FetchError::Other(code_and_message(&err)),
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|err| FetchError::Other(format!("failed to read object body: {err}")))?;
        Ok(body.into_bytes().to_vec())
    }
}
