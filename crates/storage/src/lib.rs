//! S3 object helper: ensure-bucket, put/get with a bounded retry on
//! transport hiccups, and presigned download URLs.

use backoff::backoff::Backoff;
use bytes::Bytes;
use rusoto_core::credential::AwsCredentials;
use rusoto_core::{ByteStream, Region, RusotoError};
use rusoto_s3::util::{PreSignedRequest, PreSignedRequestOption};
use rusoto_s3::{GetObjectRequest, PutObjectRequest, S3Client, S3};
use std::sync::Arc;
use std::time::Duration;

pub mod error;

use crate::error::{Error, Result};

pub struct ObjectStore {
  client: Arc<S3Client>,
  bucket: String,
}

impl ObjectStore {
  pub fn new(client: Arc<S3Client>, bucket: impl Into<String>) -> Self {
    ObjectStore {
      client,
      bucket: bucket.into(),
    }
  }

  pub fn bucket(&self) -> &str {
    &self.bucket
  }

  /// Creates the bucket if it does not exist yet; already-owned and
  /// already-exists conflicts count as success.
  pub async fn ensure_bucket(&self) -> Result<()> {
    use rusoto_s3::{CreateBucketError, CreateBucketRequest};

    match self
      .client
      .create_bucket(CreateBucketRequest {
        bucket: self.bucket.clone(),
        ..Default::default()
      })
      .await
    {
      Ok(_) => {
        tracing::info!(bucket = %self.bucket, "bucket created");
        Ok(())
      }
      Err(RusotoError::Service(CreateBucketError::BucketAlreadyOwnedByYou(_)))
      | Err(RusotoError::Service(CreateBucketError::BucketAlreadyExists(_))) => {
        tracing::debug!(bucket = %self.bucket, "bucket already exists");
        Ok(())
      }
      Err(err) => Err(Error::provider("create bucket", err)),
    }
  }

  /// Uploads one object. Transport-level failures are retried with
  /// exponential backoff until the budget runs out; provider rejections
  /// fail immediately.
  pub async fn put_object(
    &self,
    key: &str,
    data: Bytes,
    content_type: Option<String>,
  ) -> Result<()> {
    use futures::stream;

    let span = tracing::info_span!("put_object", bucket = %self.bucket, key);
    let mut backoff = backoff::ExponentialBackoff {
      max_elapsed_time: Some(Duration::from_secs(60)),
      ..Default::default()
    };

    loop {
      let req = PutObjectRequest {
        bucket: self.bucket.clone(),
        key: key.to_string(),
        body: Some(ByteStream::new_with_size(
          stream::iter(Some(Ok(data.clone()))),
          data.len(),
        )),
        content_type: content_type.clone(),
        ..Default::default()
      };

      match self.client.put_object(req).await {
        Ok(_) => {
          span.in_scope(|| tracing::info!("uploaded: {} bytes", data.len()));
          return Ok(());
        }
        Err(RusotoError::HttpDispatch(err)) => {
          span.in_scope(|| tracing::warn!("http: {}", err));
        }
        Err(RusotoError::Unknown(resp)) => {
          span.in_scope(|| tracing::warn!("unknown: {}", resp.status));
        }
        Err(err) => return Err(Error::provider("put object", err)),
      }

      match backoff.next_backoff() {
        Some(delay) => tokio::time::sleep(delay).await,
        None => return Err(Error::provider("put object", "retries exhausted")),
      }
    }
  }

  pub async fn get_object(&self, key: &str) -> Result<Bytes> {
    use rusoto_s3::GetObjectError;
    use tokio::io::AsyncReadExt;

    let output = self
      .client
      .get_object(GetObjectRequest {
        bucket: self.bucket.clone(),
        key: key.to_string(),
        ..Default::default()
      })
      .await
      .map_err(|err| match err {
        RusotoError::Service(GetObjectError::NoSuchKey(_)) => Error::NotFound {
          key: key.to_string(),
        },
        err => Error::provider("get object", err),
      })?;

    let mut buf = Vec::new();
    if let Some(body) = output.body {
      body.into_async_read().read_to_end(&mut buf).await?;
    }
    Ok(buf.into())
  }

  /// Time-limited capability URL for downloading one object, no
  /// further authentication required. Signing is local; no provider
  /// call is made.
  pub fn presigned_get_url(
    &self,
    key: &str,
    expires_in: Duration,
    region: &Region,
    credentials: &AwsCredentials,
  ) -> String {
    GetObjectRequest {
      bucket: self.bucket.clone(),
      key: key.to_string(),
      ..Default::default()
    }
    .get_presigned_url(region, credentials, &PreSignedRequestOption { expires_in })
  }
}
