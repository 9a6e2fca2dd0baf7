//! IAM policy documents. The JSON shapes here are wire contracts with
//! the provider's policy schema and must not be reshaped.

use serde_json::{json, Value};

pub const FIREHOSE_PRINCIPAL: &str = "firehose.amazonaws.com";
pub const LAMBDA_PRINCIPAL: &str = "lambda.amazonaws.com";

pub const S3_ACCESS_POLICY_NAME: &str = "firehose_s3_access";
pub const STREAM_READ_POLICY_NAME: &str = "firehose_kinesis_access";

pub const LAMBDA_BASIC_EXECUTION_POLICY_ARN: &str =
  "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// Trust policy allowing `service_principal` to assume the role.
pub fn assume_role_policy(service_principal: &str) -> Value {
  json!({
    "Version": "2012-10-17",
    "Statement": [
      {
        "Sid": "",
        "Effect": "Allow",
        "Principal": {
          "Service": service_principal
        },
        "Action": "sts:AssumeRole"
      }
    ]
  })
}

/// Read/write/list/multipart-abort access scoped to the destination
/// bucket and its objects.
pub fn s3_access_policy(bucket_arn: &str) -> Value {
  json!({
    "Version": "2012-10-17",
    "Statement": [
      {
        "Sid": "",
        "Effect": "Allow",
        "Action": [
          "s3:AbortMultipartUpload",
          "s3:GetBucketLocation",
          "s3:GetObject",
          "s3:ListBucket",
          "s3:ListBucketMultipartUploads",
          "s3:PutObject"
        ],
        "Resource": [
          format!("{}/*", bucket_arn),
          bucket_arn
        ]
      }
    ]
  })
}

/// Read access to the source stream, needed when the delivery stream
/// consumes a stream rather than direct puts.
pub fn stream_read_policy(stream_arn: &str) -> Value {
  json!({
    "Version": "2012-10-17",
    "Statement": [
      {
        "Sid": "",
        "Effect": "Allow",
        "Action": [
          "kinesis:DescribeStream",
          "kinesis:GetShardIterator",
          "kinesis:GetRecords"
        ],
        "Resource": [
          stream_arn
        ]
      }
    ]
  })
}

/// An inline policy ready to attach: provider-visible name plus the
/// serialized document.
#[derive(Debug, Clone)]
pub struct InlinePolicy {
  pub name: &'static str,
  pub document: Value,
}

impl InlinePolicy {
  pub fn s3_access(bucket_arn: &str) -> Self {
    InlinePolicy {
      name: S3_ACCESS_POLICY_NAME,
      document: s3_access_policy(bucket_arn),
    }
  }

  pub fn stream_read(stream_arn: &str) -> Self {
    InlinePolicy {
      name: STREAM_READ_POLICY_NAME,
      document: stream_read_policy(stream_arn),
    }
  }
}
