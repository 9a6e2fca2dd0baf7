//! Partitioned-stream provisioning.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::StreamApi;
use crate::error::Result;
use crate::poll::{self, PollOpts};
use crate::resource::ResourceKind;

/// Outcome of an ensure call: either this call started creation, or
/// the resource was already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensure {
  Created,
  AlreadyExists,
}

/// `Ok(true)` when a stream with this name exists. NotFound maps to
/// `Ok(false)`; any other provider failure propagates.
pub async fn exists(api: &impl StreamApi, name: &str) -> Result<bool> {
  match api.summary(name).await {
    Ok(_) => Ok(true),
    Err(err) if err.is_not_found() => Ok(false),
    Err(err) => Err(err),
  }
}

/// Creates the stream unless it already exists. Creation is
/// asynchronous on the provider side; follow with [`wait_until_active`].
pub async fn ensure_stream(api: &impl StreamApi, name: &str, shard_count: i64) -> Result<Ensure> {
  if exists(api, name).await? {
    tracing::debug!(stream = name, "stream already exists");
    return Ok(Ensure::AlreadyExists);
  }

  api.create(name, shard_count).await?;
  tracing::info!(stream = name, shard_count, "stream creation started");
  Ok(Ensure::Created)
}

pub async fn stream_arn(api: &impl StreamApi, name: &str) -> Result<String> {
  Ok(api.summary(name).await?.arn)
}

pub async fn wait_until_active(
  api: &impl StreamApi,
  name: &str,
  interval: Duration,
  token: &CancellationToken,
) -> Result<()> {
  let opts = PollOpts::with_interval(interval);
  poll::wait_until_active(
    ResourceKind::Stream,
    name,
    || async { Ok(api.summary(name).await?.status) },
    &opts,
    token,
  )
  .await
}
