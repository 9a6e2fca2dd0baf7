//! Narrow seams over the provider calls the provisioners actually
//! make, implemented once for the rusoto clients and again by
//! in-memory doubles in tests. Service errors are mapped into the
//! structured [`Error`](crate::error::Error) here so everything above
//! this layer is provider-agnostic.

use async_trait::async_trait;
use bytes::Bytes;
use rusoto_core::RusotoError;
use rusoto_firehose::{CreateDeliveryStreamInput, KinesisFirehose, KinesisFirehoseClient};
use rusoto_iam::{Iam, IamClient};
use rusoto_kinesis::{Kinesis, KinesisClient};
use rusoto_lambda::{Lambda, LambdaClient};
use rusoto_s3::{S3Client, S3};

use crate::error::{Error, Result};
use crate::resource::{ResourceKind, ResourceStatus};

#[derive(Debug, Clone)]
pub struct StreamSummary {
  pub name: String,
  pub arn: String,
  pub status: ResourceStatus,
  pub shard_count: i64,
}

#[derive(Debug, Clone)]
pub struct DeliverySummary {
  pub name: String,
  pub arn: String,
  pub status: ResourceStatus,
}

/// Settings for deploying the transform function. The deployment
/// package bytes are passed separately.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
  pub name: String,
  pub handler: String,
  pub runtime: String,
  pub role_arn: String,
}

/// Control plane and data plane of the partitioned stream.
#[async_trait]
pub trait StreamApi: Send + Sync {
  async fn summary(&self, name: &str) -> Result<StreamSummary>;
  async fn create(&self, name: &str, shard_count: i64) -> Result<()>;
  async fn put_record(&self, name: &str, data: Bytes, partition_key: &str) -> Result<String>;
}

/// Control plane of the buffered delivery stream. Creation takes the
/// full provider input so the destination configuration built by
/// [`delivery`](crate::delivery) reaches the wire unmodified.
#[async_trait]
pub trait DeliveryApi: Send + Sync {
  async fn summary(&self, name: &str) -> Result<DeliverySummary>;
  async fn create(&self, input: CreateDeliveryStreamInput) -> Result<String>;
}

#[async_trait]
pub trait RoleApi: Send + Sync {
  async fn role_arn(&self, name: &str) -> Result<String>;
  async fn create_role(&self, name: &str, trust_document: &str) -> Result<String>;
  async fn put_inline_policy(&self, role: &str, policy_name: &str, document: &str) -> Result<()>;
  async fn attach_managed_policy(&self, role: &str, policy_arn: &str) -> Result<()>;
}

/// Control plane of the destination bucket. `head` reports NotFound
/// for an absent bucket; `create` treats ownership conflicts as
/// success so concurrent ensures converge.
#[async_trait]
pub trait BucketApi: Send + Sync {
  async fn head(&self, name: &str) -> Result<()>;
  async fn create(&self, name: &str) -> Result<()>;
}

#[async_trait]
pub trait FunctionApi: Send + Sync {
  async fn function_arn(&self, name: &str) -> Result<String>;
  async fn create_function(&self, spec: &FunctionSpec, package: Bytes) -> Result<String>;
}

#[async_trait]
impl StreamApi for KinesisClient {
  async fn summary(&self, name: &str) -> Result<StreamSummary> {
    use rusoto_kinesis::{DescribeStreamSummaryError, DescribeStreamSummaryInput};

    let output = Kinesis::describe_stream_summary(
      self,
      DescribeStreamSummaryInput {
        stream_name: name.to_string(),
      },
    )
    .await
    .map_err(|err| match err {
      RusotoError::Service(DescribeStreamSummaryError::ResourceNotFound(_)) => Error::NotFound {
        resource: ResourceKind::Stream,
        name: name.to_string(),
      },
      err => Error::provider("describe stream summary", err),
    })?;

    let summary = output.stream_description_summary;
    Ok(StreamSummary {
      name: summary.stream_name,
      arn: summary.stream_arn,
      status: ResourceStatus::parse(&summary.stream_status),
      shard_count: summary.open_shard_count,
    })
  }

  async fn create(&self, name: &str, shard_count: i64) -> Result<()> {
    use rusoto_kinesis::CreateStreamInput;

    Kinesis::create_stream(
      self,
      CreateStreamInput {
        stream_name: name.to_string(),
        shard_count,
      },
    )
    .await
    .map_err(|err| Error::provider("create stream", err))
  }

  async fn put_record(&self, name: &str, data: Bytes, partition_key: &str) -> Result<String> {
    use rusoto_kinesis::PutRecordInput;

    let output = Kinesis::put_record(
      self,
      PutRecordInput {
        data,
        explicit_hash_key: None,
        partition_key: partition_key.to_string(),
        sequence_number_for_ordering: None,
        stream_name: name.to_string(),
      },
    )
    .await
    .map_err(|err| Error::provider("put record", err))?;

    Ok(output.sequence_number)
  }
}

#[async_trait]
impl DeliveryApi for KinesisFirehoseClient {
  async fn summary(&self, name: &str) -> Result<DeliverySummary> {
    use rusoto_firehose::{DescribeDeliveryStreamError, DescribeDeliveryStreamInput};

    let output = KinesisFirehose::describe_delivery_stream(
      self,
      DescribeDeliveryStreamInput {
        delivery_stream_name: name.to_string(),
        ..Default::default()
      },
    )
    .await
    .map_err(|err| match err {
      RusotoError::Service(DescribeDeliveryStreamError::ResourceNotFound(_)) => Error::NotFound {
        resource: ResourceKind::DeliveryStream,
        name: name.to_string(),
      },
      err => Error::provider("describe delivery stream", err),
    })?;

    let description = output.delivery_stream_description;
    Ok(DeliverySummary {
      name: description.delivery_stream_name,
      arn: description.delivery_stream_arn,
      status: ResourceStatus::parse(&description.delivery_stream_status),
    })
  }

  async fn create(&self, input: CreateDeliveryStreamInput) -> Result<String> {
    let output = KinesisFirehose::create_delivery_stream(self, input)
      .await
      .map_err(|err| Error::provider("create delivery stream", err))?;

    output
      .delivery_stream_arn
      .ok_or(Error::MissingField("DeliveryStreamARN"))
  }
}

#[async_trait]
impl RoleApi for IamClient {
  async fn role_arn(&self, name: &str) -> Result<String> {
    use rusoto_iam::{GetRoleError, GetRoleRequest};

    let output = Iam::get_role(
      self,
      GetRoleRequest {
        role_name: name.to_string(),
      },
    )
    .await
    .map_err(|err| match err {
      RusotoError::Service(GetRoleError::NoSuchEntity(_)) => Error::NotFound {
        resource: ResourceKind::Role,
        name: name.to_string(),
      },
      err => Error::provider("get role", err),
    })?;

    Ok(output.role.arn)
  }

  async fn create_role(&self, name: &str, trust_document: &str) -> Result<String> {
    use rusoto_iam::CreateRoleRequest;

    let output = Iam::create_role(
      self,
      CreateRoleRequest {
        role_name: name.to_string(),
        assume_role_policy_document: trust_document.to_string(),
        ..Default::default()
      },
    )
    .await
    .map_err(|err| Error::provider("create role", err))?;

    Ok(output.role.arn)
  }

  async fn put_inline_policy(&self, role: &str, policy_name: &str, document: &str) -> Result<()> {
    use rusoto_iam::PutRolePolicyRequest;

    Iam::put_role_policy(
      self,
      PutRolePolicyRequest {
        role_name: role.to_string(),
        policy_name: policy_name.to_string(),
        policy_document: document.to_string(),
      },
    )
    .await
    .map_err(|err| Error::provider("put role policy", err))
  }

  async fn attach_managed_policy(&self, role: &str, policy_arn: &str) -> Result<()> {
    use rusoto_iam::AttachRolePolicyRequest;

    Iam::attach_role_policy(
      self,
      AttachRolePolicyRequest {
        role_name: role.to_string(),
        policy_arn: policy_arn.to_string(),
      },
    )
    .await
    .map_err(|err| Error::provider("attach role policy", err))
  }
}

#[async_trait]
impl BucketApi for S3Client {
  async fn head(&self, name: &str) -> Result<()> {
    use rusoto_s3::{HeadBucketError, HeadBucketRequest};

    S3::head_bucket(
      self,
      HeadBucketRequest {
        bucket: name.to_string(),
        ..Default::default()
      },
    )
    .await
    .map_err(|err| match err {
      RusotoError::Service(HeadBucketError::NoSuchBucket(_)) => Error::NotFound {
        resource: ResourceKind::Bucket,
        name: name.to_string(),
      },
      // HEAD responses carry no body, so the provider's NoSuchBucket
      // often arrives as a bare 404
      RusotoError::Unknown(resp) if resp.status.as_u16() == 404 => Error::NotFound {
        resource: ResourceKind::Bucket,
        name: name.to_string(),
      },
      err => Error::provider("head bucket", err),
    })
  }

  async fn create(&self, name: &str) -> Result<()> {
    use rusoto_s3::{CreateBucketError, CreateBucketRequest};

    match S3::create_bucket(
      self,
      CreateBucketRequest {
        bucket: name.to_string(),
        ..Default::default()
      },
    )
    .await
    {
      Ok(_) => Ok(()),
      Err(RusotoError::Service(CreateBucketError::BucketAlreadyOwnedByYou(_)))
      | Err(RusotoError::Service(CreateBucketError::BucketAlreadyExists(_))) => Ok(()),
      Err(err) => Err(Error::provider("create bucket", err)),
    }
  }
}

#[async_trait]
impl FunctionApi for LambdaClient {
  async fn function_arn(&self, name: &str) -> Result<String> {
    use rusoto_lambda::{GetFunctionError, GetFunctionRequest};

    let output = Lambda::get_function(
      self,
      GetFunctionRequest {
        function_name: name.to_string(),
        qualifier: None,
      },
    )
    .await
    .map_err(|err| match err {
      RusotoError::Service(GetFunctionError::ResourceNotFound(_)) => Error::NotFound {
        resource: ResourceKind::Function,
        name: name.to_string(),
      },
      err => Error::provider("get function", err),
    })?;

    output
      .configuration
      .and_then(|c| c.function_arn)
      .ok_or(Error::MissingField("FunctionArn"))
  }

  async fn create_function(&self, spec: &FunctionSpec, package: Bytes) -> Result<String> {
    use rusoto_lambda::{CreateFunctionRequest, FunctionCode};

    let output = Lambda::create_function(
      self,
      CreateFunctionRequest {
        function_name: spec.name.clone(),
        handler: Some(spec.handler.clone()),
        runtime: Some(spec.runtime.clone()),
        role: spec.role_arn.clone(),
        code: FunctionCode {
          zip_file: Some(package),
          ..Default::default()
        },
        ..Default::default()
      },
    )
    .await
    .map_err(|err| Error::provider("create function", err))?;

    output.function_arn.ok_or(Error::MissingField("FunctionArn"))
  }
}
