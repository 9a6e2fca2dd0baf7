use rusoto_core::credential::{AwsCredentials, StaticProvider};
use rusoto_core::request::HttpClient;
use rusoto_core::Region;
use rusoto_firehose::KinesisFirehoseClient;
use rusoto_iam::IamClient;
use rusoto_kinesis::KinesisClient;
use rusoto_lambda::LambdaClient;
use rusoto_s3::S3Client;
use std::sync::Arc;

use sluice_config::ConnectionConfig;

pub mod error;

use error::*;

/// Service clients for one environment, built once from configuration
/// and passed down by reference. Clients are cheap to clone through the
/// `Arc`s and safe to share across tasks.
#[derive(Clone)]
pub struct AwsClients {
  pub kinesis: Arc<KinesisClient>,
  pub firehose: Arc<KinesisFirehoseClient>,
  pub iam: Arc<IamClient>,
  pub lambda: Arc<LambdaClient>,
  pub s3: Arc<S3Client>,
  region: Region,
  credentials: AwsCredentials,
}

impl AwsClients {
  pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
    let region = resolve_region(config)?;
    let credentials = AwsCredentials::new(
      config.access_key_id.clone(),
      config.secret_access_key.clone(),
      None,
      None,
    );
    let provider = || {
      StaticProvider::new(
        config.access_key_id.clone(),
        config.secret_access_key.clone(),
        None,
        None,
      )
    };

    Ok(AwsClients {
      kinesis: Arc::new(KinesisClient::new_with(
        HttpClient::new()?,
        provider(),
        region.clone(),
      )),
      firehose: Arc::new(KinesisFirehoseClient::new_with(
        HttpClient::new()?,
        provider(),
        region.clone(),
      )),
      iam: Arc::new(IamClient::new_with(
        HttpClient::new()?,
        provider(),
        region.clone(),
      )),
      lambda: Arc::new(LambdaClient::new_with(
        HttpClient::new()?,
        provider(),
        region.clone(),
      )),
      s3: Arc::new(S3Client::new_with(
        HttpClient::new()?,
        provider(),
        region.clone(),
      )),
      region,
      credentials,
    })
  }

  pub fn region(&self) -> &Region {
    &self.region
  }

  /// Static credentials, needed for request presigning.
  pub fn credentials(&self) -> &AwsCredentials {
    &self.credentials
  }
}

fn resolve_region(config: &ConnectionConfig) -> Result<Region> {
  if config.endpoint.is_empty() {
    config
      .region
      .parse()
      .map_err(|_| Error::InvalidRegion(config.region.clone()))
  } else {
    Ok(Region::Custom {
      name: config.region.clone(),
      endpoint: config.endpoint.trim_end_matches('/').to_string(),
    })
  }
}
