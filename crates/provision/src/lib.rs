//! Provisioning core for the streaming pipeline: a partitioned stream,
//! a buffered delivery stream into S3 (optionally through a transform
//! function), the IAM roles that connect them, and the readiness
//! polling that blocks until each piece is usable.

pub mod api;
pub mod bucket;
pub mod delivery;
pub mod error;
pub mod policy;
pub mod poll;
pub mod resource;
pub mod role;
pub mod stream;
pub mod transform;

#[cfg(test)]
pub(crate) mod testkit;

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use sluice_client::AwsClients;
use sluice_config::PipelineConfig;

pub use delivery::{DeliverySpec, Source, TransformConfig};
pub use error::{Error, Result};
pub use poll::PollOpts;
pub use resource::{ResourceKind, ResourceStatus};
pub use stream::Ensure;

/// How the delivery stream is fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
  DirectPut,
  StreamSource,
}

/// ARNs of the provisioned pipeline, all provider-assigned.
#[derive(Debug, Clone)]
pub struct PipelineArns {
  pub stream_arn: Option<String>,
  pub delivery_stream_arn: String,
  pub transform_arn: Option<String>,
}

/// Drives the full provisioning sequence against one environment.
///
/// The sequence is not transactional; instead every step is idempotent,
/// so re-running after a partial failure converges on the same
/// resources instead of leaving unreachable state.
pub struct Provisioner {
  clients: AwsClients,
  config: PipelineConfig,
  token: CancellationToken,
}

impl Provisioner {
  pub fn new(clients: AwsClients, config: PipelineConfig) -> Self {
    Provisioner {
      clients,
      config,
      token: CancellationToken::new(),
    }
  }

  /// Token aborting any wait this provisioner is blocked in.
  pub fn cancellation_token(&self) -> CancellationToken {
    self.token.clone()
  }

  /// Destination bucket → stream (unless direct put) → wait active →
  /// transform function (when enabled) → delivery stream → wait
  /// active.
  pub async fn ensure_pipeline(&self, source: SourceKind) -> Result<PipelineArns> {
    let kinesis = self.clients.kinesis.as_ref();
    let firehose = self.clients.firehose.as_ref();
    let iam = self.clients.iam.as_ref();
    let lambda = self.clients.lambda.as_ref();
    let s3 = self.clients.s3.as_ref();

    bucket::ensure_bucket(s3, &self.config.delivery.bucket).await?;

    let stream_arn = match source {
      SourceKind::DirectPut => None,
      SourceKind::StreamSource => {
        let name = &self.config.stream.name;
        stream::ensure_stream(kinesis, name, self.config.stream.shard_count).await?;
        stream::wait_until_active(
          kinesis,
          name,
          Duration::from_secs(self.config.stream.poll_interval_secs),
          &self.token,
        )
        .await?;
        Some(stream::stream_arn(kinesis, name).await?)
      }
    };

    let transform_arn = if self.config.delivery.transform.enabled {
      Some(transform::ensure_function(lambda, iam, &self.config.delivery.transform).await?)
    } else {
      None
    };

    let spec = DeliverySpec {
      name: self.config.delivery.name.clone(),
      bucket_arn: self.config.delivery.bucket_arn(),
      role_name: self.config.delivery.role_name.clone(),
      source: match &stream_arn {
        Some(arn) => Source::Stream { arn: arn.clone() },
        None => Source::DirectPut,
      },
      buffer_interval_seconds: self.config.delivery.buffer_interval_seconds,
      transform: transform_arn.clone().map(TransformConfig::new),
    };

    let delivery_stream_arn = delivery::ensure_delivery_stream(firehose, iam, &spec).await?;
    delivery::wait_until_active(
      firehose,
      &self.config.delivery.name,
      Duration::from_secs(self.config.delivery.poll_interval_secs),
      &self.token,
    )
    .await?;

    Ok(PipelineArns {
      stream_arn,
      delivery_stream_arn,
      transform_arn,
    })
  }
}
