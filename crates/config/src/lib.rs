use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub mod error;

use error::*;

pub const CONFIG_FILE: &str = "sluice.toml";

/// Full pipeline configuration: connection, stream, delivery and
/// producer settings. Every field has a working default aimed at a
/// local emulator endpoint, so `PipelineConfig::default()` is enough
/// to run the demo flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  pub connection: ConnectionConfig,
  pub stream: StreamConfig,
  pub delivery: DeliveryConfig,
  pub producer: ProducerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
  pub endpoint: String,
  pub region: String,
  pub access_key_id: String,
  pub secret_access_key: String,
}

impl Default for ConnectionConfig {
  fn default() -> Self {
    ConnectionConfig {
      endpoint: "http://localhost.localstack.cloud:4566".to_string(),
      region: "us-east-1".to_string(),
      access_key_id: "test".to_string(),
      secret_access_key: "test".to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
  pub name: String,
  pub shard_count: i64,
  /// Initial interval between readiness probes.
  pub poll_interval_secs: u64,
}

impl Default for StreamConfig {
  fn default() -> Self {
    StreamConfig {
      name: "kinesis_test_stream".to_string(),
      shard_count: 1,
      poll_interval_secs: 5,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
  pub name: String,
  pub bucket: String,
  pub role_name: String,
  pub buffer_interval_seconds: i64,
  pub poll_interval_secs: u64,
  pub transform: TransformFunctionConfig,
}

impl Default for DeliveryConfig {
  fn default() -> Self {
    DeliveryConfig {
      name: "firehose_to_s3_stream".to_string(),
      bucket: "kinesis-poc-storage".to_string(),
      role_name: "firehose-delivery-role".to_string(),
      buffer_interval_seconds: 60,
      poll_interval_secs: 2,
      transform: Default::default(),
    }
  }
}

impl DeliveryConfig {
  pub fn bucket_arn(&self) -> String {
    format!("arn:aws:s3:::{}", self.bucket)
  }
}

/// Settings for the record-transform function inserted between the
/// delivery stream and the bucket. The deployment package is expected
/// to be prebuilt; packaging is not this tool's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformFunctionConfig {
  pub enabled: bool,
  pub function_name: String,
  pub handler: String,
  pub runtime: String,
  pub role_name: String,
  pub package_path: PathBuf,
}

impl Default for TransformFunctionConfig {
  fn default() -> Self {
    TransformFunctionConfig {
      enabled: true,
      function_name: "record-transform".to_string(),
      handler: "transform.handler".to_string(),
      runtime: "python3.8".to_string(),
      role_name: "lambda-role".to_string(),
      package_path: PathBuf::from("transform.zip"),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
  pub count: usize,
  pub interval_ms: u64,
  pub partition_key: String,
}

impl Default for ProducerConfig {
  fn default() -> Self {
    ProducerConfig {
      count: 9,
      interval_ms: 500,
      partition_key: "name".to_string(),
    }
  }
}

impl PipelineConfig {
  pub fn from_env() -> Result<Self> {
    let mut config = PipelineConfig::default();

    config.apply_env();

    Ok(config)
  }

  pub fn load() -> Result<Self> {
    let mut config: PipelineConfig = toml::from_str(&fs::read_to_string(CONFIG_FILE)?)?;

    config.apply_env();

    Ok(config)
  }

  /// `load()`, falling back to defaults when no config file is present.
  pub fn load_or_default() -> Result<Self> {
    match fs::read_to_string(CONFIG_FILE) {
      Ok(content) => {
        let mut config: PipelineConfig = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
      }
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::from_env(),
      Err(err) => Err(err.into()),
    }
  }

  pub fn save(&self) -> Result<()> {
    fs::write(CONFIG_FILE, toml::to_string_pretty(self)?).map_err(Into::into)
  }

  fn apply_env(&mut self) {
    use std::env;

    if let Ok(endpoint) = env::var("SLUICE_ENDPOINT") {
      self.connection.endpoint = endpoint;
    }

    if let Ok(region) = env::var("SLUICE_REGION") {
      self.connection.region = region;
    }

    if let Ok(key_id) = env::var("AWS_ACCESS_KEY_ID") {
      self.connection.access_key_id = key_id;
    }

    if let Ok(secret) = env::var("AWS_SECRET_ACCESS_KEY") {
      self.connection.secret_access_key = secret;
    }

    if let Ok(name) = env::var("SLUICE_STREAM_NAME") {
      self.stream.name = name;
    }

    if let Ok(name) = env::var("SLUICE_DELIVERY_STREAM_NAME") {
      self.delivery.name = name;
    }

    if let Ok(bucket) = env::var("SLUICE_BUCKET") {
      self.delivery.bucket = bucket;
    }
  }
}
