//! Delivery-stream provisioning: a buffered pipe from either direct
//! puts or a source stream into an S3 bucket, optionally through a
//! transform function.

use rusoto_firehose::{
  BufferingHints, CreateDeliveryStreamInput, ExtendedS3DestinationConfiguration,
  KinesisStreamSourceConfiguration, ProcessingConfiguration, Processor, ProcessorParameter,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::{DeliveryApi, RoleApi};
use crate::error::Result;
use crate::policy::{self, InlinePolicy};
use crate::poll::{self, PollOpts};
use crate::resource::{ResourceKind, ResourceStatus};
use crate::role;

pub const DEFAULT_BUFFER_INTERVAL_SECONDS: i64 = 60;

/// Where the delivery stream reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
  DirectPut,
  Stream { arn: String },
}

impl Source {
  pub fn delivery_stream_type(&self) -> &'static str {
    match self {
      Source::DirectPut => "DirectPut",
      Source::Stream { .. } => "KinesisStreamAsSource",
    }
  }
}

/// Transform stage parameters. Immutable once attached to a delivery
/// stream; the defaults match the provider's processor parameters
/// NumberOfRetries=3, BufferSizeInMBs=1, BufferIntervalInSeconds=60.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
  pub function_arn: String,
  pub max_retries: i64,
  pub buffer_size_mbs: i64,
  pub buffer_interval_seconds: i64,
}

impl TransformConfig {
  pub fn new(function_arn: String) -> Self {
    TransformConfig {
      function_arn,
      max_retries: 3,
      buffer_size_mbs: 1,
      buffer_interval_seconds: 60,
    }
  }
}

/// Everything needed to create one delivery stream.
#[derive(Debug, Clone)]
pub struct DeliverySpec {
  pub name: String,
  pub bucket_arn: String,
  pub role_name: String,
  pub source: Source,
  pub buffer_interval_seconds: i64,
  pub transform: Option<TransformConfig>,
}

pub async fn exists(api: &impl DeliveryApi, name: &str) -> Result<bool> {
  match api.summary(name).await {
    Ok(_) => Ok(true),
    Err(err) if err.is_not_found() => Ok(false),
    Err(err) => Err(err),
  }
}

pub async fn delivery_stream_arn(api: &impl DeliveryApi, name: &str) -> Result<String> {
  Ok(api.summary(name).await?.arn)
}

/// Destination configuration for the S3 side of the delivery stream.
/// With a transform attached this carries exactly one processor of
/// type "Lambda".
pub fn destination_config(
  bucket_arn: &str,
  role_arn: &str,
  buffer_interval_seconds: i64,
  transform: Option<&TransformConfig>,
) -> ExtendedS3DestinationConfiguration {
  ExtendedS3DestinationConfiguration {
    bucket_arn: bucket_arn.to_string(),
    role_arn: role_arn.to_string(),
    buffering_hints: Some(BufferingHints {
      interval_in_seconds: Some(buffer_interval_seconds),
      size_in_m_bs: None,
    }),
    processing_configuration: transform.map(|t| processing_configuration(t, role_arn)),
    ..Default::default()
  }
}

fn processing_configuration(
  transform: &TransformConfig,
  role_arn: &str,
) -> ProcessingConfiguration {
  let parameter = |name: &str, value: String| ProcessorParameter {
    parameter_name: name.to_string(),
    parameter_value: value,
  };

  ProcessingConfiguration {
    enabled: Some(true),
    processors: Some(vec![Processor {
      type_: "Lambda".to_string(),
      parameters: Some(vec![
        parameter("LambdaArn", transform.function_arn.clone()),
        parameter("NumberOfRetries", transform.max_retries.to_string()),
        parameter("RoleArn", role_arn.to_string()),
        parameter("BufferSizeInMBs", transform.buffer_size_mbs.to_string()),
        parameter(
          "BufferIntervalInSeconds",
          transform.buffer_interval_seconds.to_string(),
        ),
      ]),
    }]),
  }
}

/// Creates the delivery stream unless it already exists, provisioning
/// the IAM role first so its inline policies match the actual data
/// flow (bucket access always, stream read only for a stream source).
///
/// Side effects are non-transactional: a failure partway through
/// leaves the role and earlier policies in place, and a re-run adopts
/// them.
pub async fn ensure_delivery_stream(
  firehose: &impl DeliveryApi,
  iam: &impl RoleApi,
  spec: &DeliverySpec,
) -> Result<String> {
  match firehose.summary(&spec.name).await {
    Ok(summary) => {
      tracing::debug!(delivery_stream = %spec.name, "delivery stream already exists");
      return Ok(summary.arn);
    }
    Err(err) if err.is_not_found() => {}
    Err(err) => return Err(err),
  }

  let mut policies = vec![InlinePolicy::s3_access(&spec.bucket_arn)];
  if let Source::Stream { arn } = &spec.source {
    policies.push(InlinePolicy::stream_read(arn));
  }
  let role_arn = role::ensure_role(
    iam,
    &spec.role_name,
    policy::FIREHOSE_PRINCIPAL,
    &policies,
  )
  .await?;

  let input = CreateDeliveryStreamInput {
    delivery_stream_name: spec.name.clone(),
    delivery_stream_type: Some(spec.source.delivery_stream_type().to_string()),
    kinesis_stream_source_configuration: match &spec.source {
      Source::Stream { arn } => Some(KinesisStreamSourceConfiguration {
        kinesis_stream_arn: arn.clone(),
        role_arn: role_arn.clone(),
      }),
      Source::DirectPut => None,
    },
    extended_s3_destination_configuration: Some(destination_config(
      &spec.bucket_arn,
      &role_arn,
      spec.buffer_interval_seconds,
      spec.transform.as_ref(),
    )),
    ..Default::default()
  };

  let arn = firehose.create(input).await?;
  tracing::info!(delivery_stream = %spec.name, arn = %arn, "delivery stream creation started");
  Ok(arn)
}

pub async fn wait_until_active(
  api: &impl DeliveryApi,
  name: &str,
  interval: Duration,
  token: &CancellationToken,
) -> Result<()> {
  // CREATING_FAILED is terminal for delivery streams
  let opts = PollOpts::with_interval(interval)
    .fatal_status(ResourceStatus::Unknown("CREATING_FAILED".to_string()));
  poll::wait_until_active(
    ResourceKind::DeliveryStream,
    name,
    || async { Ok(api.summary(name).await?.status) },
    &opts,
    token,
  )
  .await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testkit::{FakeDelivery, FakeRoles};

  fn spec(source: Source, transform: Option<TransformConfig>) -> DeliverySpec {
    DeliverySpec {
      name: "orders-to-s3".to_string(),
      bucket_arn: "arn:aws:s3:::orders".to_string(),
      role_name: "orders-role".to_string(),
      source,
      buffer_interval_seconds: DEFAULT_BUFFER_INTERVAL_SECONDS,
      transform,
    }
  }

  #[test]
  fn destination_without_transform_has_no_processing_block() {
    let config = destination_config("arn:aws:s3:::orders", "role-arn", 60, None);
    assert!(config.processing_configuration.is_none());
    assert_eq!(
      config.buffering_hints.unwrap().interval_in_seconds,
      Some(60)
    );
  }

  #[test]
  fn destination_with_transform_has_one_lambda_processor() {
    let transform = TransformConfig::new("function-arn".to_string());
    let config = destination_config("arn:aws:s3:::orders", "role-arn", 60, Some(&transform));
    let processing = config.processing_configuration.unwrap();
    assert_eq!(processing.enabled, Some(true));
    let processors = processing.processors.unwrap();
    assert_eq!(processors.len(), 1);
    assert_eq!(processors[0].type_, "Lambda");

    let parameters = processors[0].parameters.clone().unwrap();
    let value = |name: &str| {
      parameters
        .iter()
        .find(|p| p.parameter_name == name)
        .map(|p| p.parameter_value.clone())
    };
    assert_eq!(value("LambdaArn").unwrap(), "function-arn");
    assert_eq!(value("NumberOfRetries").unwrap(), "3");
    assert_eq!(value("RoleArn").unwrap(), "role-arn");
    assert_eq!(value("BufferSizeInMBs").unwrap(), "1");
    assert_eq!(value("BufferIntervalInSeconds").unwrap(), "60");
  }

  #[tokio::test]
  async fn stream_source_carries_source_configuration_and_both_policies() {
    let firehose = FakeDelivery::default();
    let iam = FakeRoles::default();
    let stream_arn = "arn:aws:kinesis:us-east-1:000000000000:stream/orders";

    let arn = ensure_delivery_stream(
      &firehose,
      &iam,
      &spec(
        Source::Stream {
          arn: stream_arn.to_string(),
        },
        Some(TransformConfig::new("function-arn".to_string())),
      ),
    )
    .await
    .unwrap();
    assert!(arn.ends_with("deliverystream/orders-to-s3"));

    let created = firehose.created();
    assert_eq!(created.len(), 1);
    let input = &created[0];
    assert_eq!(
      input.delivery_stream_type.as_deref(),
      Some("KinesisStreamAsSource")
    );
    let source = input.kinesis_stream_source_configuration.clone().unwrap();
    assert_eq!(source.kinesis_stream_arn, stream_arn);
    assert!(input
      .extended_s3_destination_configuration
      .clone()
      .unwrap()
      .processing_configuration
      .is_some());

    let role = iam.role("orders-role");
    assert_eq!(role.inline.len(), 2);
  }

  #[tokio::test]
  async fn direct_put_has_no_source_configuration_and_one_policy() {
    let firehose = FakeDelivery::default();
    let iam = FakeRoles::default();

    ensure_delivery_stream(&firehose, &iam, &spec(Source::DirectPut, None))
      .await
      .unwrap();

    let created = firehose.created();
    assert_eq!(created[0].delivery_stream_type.as_deref(), Some("DirectPut"));
    assert!(created[0].kinesis_stream_source_configuration.is_none());
    assert_eq!(iam.role("orders-role").inline.len(), 1);
  }

  #[tokio::test]
  async fn probe_flips_once_created() {
    let firehose = FakeDelivery::default();
    let iam = FakeRoles::default();
    assert!(!exists(&firehose, "orders-to-s3").await.unwrap());

    ensure_delivery_stream(&firehose, &iam, &spec(Source::DirectPut, None))
      .await
      .unwrap();
    assert!(exists(&firehose, "orders-to-s3").await.unwrap());
  }

  #[tokio::test]
  async fn existing_delivery_stream_returns_its_arn() {
    let firehose = FakeDelivery::default().with_existing("orders-to-s3", "existing-arn");
    let iam = FakeRoles::default();

    let arn = ensure_delivery_stream(&firehose, &iam, &spec(Source::DirectPut, None))
      .await
      .unwrap();
    assert_eq!(arn, "existing-arn");
    assert!(firehose.created().is_empty());
    assert_eq!(iam.create_calls(), 0);
  }
}
