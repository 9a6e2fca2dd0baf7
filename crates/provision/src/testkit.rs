//! In-memory doubles for the provider seams, shared by the unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use rusoto_firehose::CreateDeliveryStreamInput;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::{DeliveryApi, DeliverySummary, FunctionApi, FunctionSpec, StreamApi, StreamSummary};
use crate::api::{BucketApi, RoleApi};
use crate::error::{Error, Result};
use crate::resource::{ResourceKind, ResourceStatus};

#[derive(Default)]
pub struct FakeStreams {
  streams: Mutex<HashMap<String, i64>>,
  statuses: Mutex<HashMap<String, VecDeque<ResourceStatus>>>,
  records: Mutex<Vec<(String, Bytes, String)>>,
  create_calls: AtomicUsize,
  fail_describe: Option<&'static str>,
}

impl FakeStreams {
  pub fn failing(mut self, operation: &'static str) -> Self {
    self.fail_describe = Some(operation);
    self
  }

  pub fn push_statuses(&self, name: &str, statuses: Vec<ResourceStatus>) {
    self
      .statuses
      .lock()
      .unwrap()
      .insert(name.to_string(), statuses.into());
  }

  pub fn create_calls(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }

  pub fn records(&self) -> Vec<(String, Bytes, String)> {
    self.records.lock().unwrap().clone()
  }
}

#[async_trait]
impl StreamApi for FakeStreams {
  async fn summary(&self, name: &str) -> Result<StreamSummary> {
    if let Some(operation) = self.fail_describe {
      return Err(Error::provider(operation, "injected failure"));
    }
    let shard_count = *self
      .streams
      .lock()
      .unwrap()
      .get(name)
      .ok_or(Error::NotFound {
        resource: ResourceKind::Stream,
        name: name.to_string(),
      })?;
    let status = self
      .statuses
      .lock()
      .unwrap()
      .get_mut(name)
      .and_then(|queue| queue.pop_front())
      .unwrap_or(ResourceStatus::Active);
    Ok(StreamSummary {
      name: name.to_string(),
      arn: format!("arn:aws:kinesis:us-east-1:000000000000:stream/{}", name),
      status,
      shard_count,
    })
  }

  async fn create(&self, name: &str, shard_count: i64) -> Result<()> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);
    self
      .streams
      .lock()
      .unwrap()
      .insert(name.to_string(), shard_count);
    Ok(())
  }

  async fn put_record(&self, name: &str, data: Bytes, partition_key: &str) -> Result<String> {
    let mut records = self.records.lock().unwrap();
    records.push((name.to_string(), data, partition_key.to_string()));
    Ok(records.len().to_string())
  }
}

#[derive(Default)]
pub struct FakeBuckets {
  buckets: Mutex<std::collections::HashSet<String>>,
  create_calls: AtomicUsize,
  fail_head: bool,
}

impl FakeBuckets {
  pub fn failing(mut self) -> Self {
    self.fail_head = true;
    self
  }

  pub fn create_calls(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl BucketApi for FakeBuckets {
  async fn head(&self, name: &str) -> Result<()> {
    if self.fail_head {
      return Err(Error::provider("head bucket", "injected failure"));
    }
    if self.buckets.lock().unwrap().contains(name) {
      Ok(())
    } else {
      Err(Error::NotFound {
        resource: ResourceKind::Bucket,
        name: name.to_string(),
      })
    }
  }

  async fn create(&self, name: &str) -> Result<()> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);
    self.buckets.lock().unwrap().insert(name.to_string());
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct FakeRole {
  pub arn: String,
  pub trust: String,
  pub inline: Vec<(String, String)>,
  pub managed: Vec<String>,
}

#[derive(Default)]
pub struct FakeRoles {
  roles: Mutex<HashMap<String, FakeRole>>,
  create_calls: AtomicUsize,
  fail_put_policy: bool,
}

impl FakeRoles {
  pub fn failing_policy_attachment(mut self) -> Self {
    self.fail_put_policy = true;
    self
  }

  pub fn role(&self, name: &str) -> FakeRole {
    self.roles.lock().unwrap().get(name).cloned().unwrap_or_default()
  }

  pub fn create_calls(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl RoleApi for FakeRoles {
  async fn role_arn(&self, name: &str) -> Result<String> {
    self
      .roles
      .lock()
      .unwrap()
      .get(name)
      .map(|role| role.arn.clone())
      .ok_or(Error::NotFound {
        resource: ResourceKind::Role,
        name: name.to_string(),
      })
  }

  async fn create_role(&self, name: &str, trust_document: &str) -> Result<String> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);
    let arn = format!("arn:aws:iam::000000000000:role/{}", name);
    self.roles.lock().unwrap().insert(
      name.to_string(),
      FakeRole {
        arn: arn.clone(),
        trust: trust_document.to_string(),
        inline: vec![],
        managed: vec![],
      },
    );
    Ok(arn)
  }

  async fn put_inline_policy(&self, role: &str, policy_name: &str, document: &str) -> Result<()> {
    if self.fail_put_policy {
      return Err(Error::provider("put role policy", "injected failure"));
    }
    let mut roles = self.roles.lock().unwrap();
    let role = roles.get_mut(role).ok_or(Error::NotFound {
      resource: ResourceKind::Role,
      name: role.to_string(),
    })?;
    role
      .inline
      .push((policy_name.to_string(), document.to_string()));
    Ok(())
  }

  async fn attach_managed_policy(&self, role: &str, policy_arn: &str) -> Result<()> {
    let mut roles = self.roles.lock().unwrap();
    let role = roles.get_mut(role).ok_or(Error::NotFound {
      resource: ResourceKind::Role,
      name: role.to_string(),
    })?;
    if !role.managed.contains(&policy_arn.to_string()) {
      role.managed.push(policy_arn.to_string());
    }
    Ok(())
  }
}

#[derive(Default)]
pub struct FakeDelivery {
  existing: Mutex<HashMap<String, String>>,
  created: Mutex<Vec<CreateDeliveryStreamInput>>,
}

impl FakeDelivery {
  pub fn with_existing(self, name: &str, arn: &str) -> Self {
    self
      .existing
      .lock()
      .unwrap()
      .insert(name.to_string(), arn.to_string());
    self
  }

  pub fn created(&self) -> Vec<CreateDeliveryStreamInput> {
    self.created.lock().unwrap().clone()
  }
}

#[async_trait]
impl DeliveryApi for FakeDelivery {
  async fn summary(&self, name: &str) -> Result<DeliverySummary> {
    self
      .existing
      .lock()
      .unwrap()
      .get(name)
      .map(|arn| DeliverySummary {
        name: name.to_string(),
        arn: arn.clone(),
        status: ResourceStatus::Active,
      })
      .ok_or(Error::NotFound {
        resource: ResourceKind::DeliveryStream,
        name: name.to_string(),
      })
  }

  async fn create(&self, input: CreateDeliveryStreamInput) -> Result<String> {
    let arn = format!(
      "arn:aws:firehose:us-east-1:000000000000:deliverystream/{}",
      input.delivery_stream_name
    );
    self
      .existing
      .lock()
      .unwrap()
      .insert(input.delivery_stream_name.clone(), arn.clone());
    self.created.lock().unwrap().push(input);
    Ok(arn)
  }
}

#[derive(Default)]
pub struct FakeFunctions {
  functions: Mutex<HashMap<String, String>>,
  created: Mutex<Vec<(FunctionSpec, usize)>>,
}

impl FakeFunctions {
  pub fn created(&self) -> Vec<(FunctionSpec, usize)> {
    self.created.lock().unwrap().clone()
  }
}

#[async_trait]
impl FunctionApi for FakeFunctions {
  async fn function_arn(&self, name: &str) -> Result<String> {
    self
      .functions
      .lock()
      .unwrap()
      .get(name)
      .cloned()
      .ok_or(Error::NotFound {
        resource: ResourceKind::Function,
        name: name.to_string(),
      })
  }

  async fn create_function(&self, spec: &FunctionSpec, package: Bytes) -> Result<String> {
    let arn = format!("arn:aws:lambda:us-east-1:000000000000:function:{}", spec.name);
    self
      .functions
      .lock()
      .unwrap()
      .insert(spec.name.clone(), arn.clone());
    self
      .created
      .lock()
      .unwrap()
      .push((spec.clone(), package.len()));
    Ok(arn)
  }
}
