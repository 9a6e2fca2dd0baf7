//! Destination-bucket provisioning. Buckets are ready as soon as
//! creation returns, so there is no readiness wait here.

use crate::api::BucketApi;
use crate::error::Result;
use crate::stream::Ensure;

/// `Ok(true)` when the bucket exists. NotFound maps to `Ok(false)`;
/// any other provider failure propagates.
pub async fn exists(api: &impl BucketApi, name: &str) -> Result<bool> {
  match api.head(name).await {
    Ok(()) => Ok(true),
    Err(err) if err.is_not_found() => Ok(false),
    Err(err) => Err(err),
  }
}

pub async fn ensure_bucket(api: &impl BucketApi, name: &str) -> Result<Ensure> {
  if exists(api, name).await? {
    tracing::debug!(bucket = name, "bucket already exists");
    return Ok(Ensure::AlreadyExists);
  }

  api.create(name).await?;
  tracing::info!(bucket = name, "bucket created");
  Ok(Ensure::Created)
}
