//! Demo record producer: pushes synthetic JSON records into the stream
//! at a fixed cadence. All records use one partition key, so they land
//! on one shard and keep FIFO order there; nothing here is
//! correctness-critical.

use bytes::Bytes;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use sluice_config::ProducerConfig;
use sluice_provision::api::StreamApi;

pub mod error;

use error::*;

const FIRST_NAMES: &[&str] = &[
  "Ada", "Bruno", "Carmen", "Dmitri", "Elena", "Farid", "Greta", "Hugo", "Ingrid", "Jonas",
  "Keiko", "Luis", "Mara", "Nilufar", "Omar", "Priya",
];

const LAST_NAMES: &[&str] = &[
  "Alvarez", "Bergström", "Chen", "Dubois", "Eriksen", "Fontaine", "García", "Haddad", "Ivanov",
  "Jansen", "Kowalski", "Larsen", "Moretti", "Novak", "Okafor", "Petrov",
];

const CITIES: &[&str] = &[
  "Amsterdam", "Bogotá", "Casablanca", "Dresden", "Edinburgh", "Fukuoka", "Gothenburg", "Hanoi",
  "Istanbul", "Jaipur", "Kampala", "Lisbon", "Montevideo", "Nairobi", "Oslo", "Porto",
];

/// One synthetic record as it goes over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoRecord {
  pub name: String,
  pub city: String,
  pub phone: String,
  pub id: String,
}

impl DemoRecord {
  pub fn synth(rng: &mut impl Rng) -> Self {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
    let city = CITIES[rng.gen_range(0..CITIES.len())];
    DemoRecord {
      name: format!("{} {}", first, last),
      city: city.to_string(),
      phone: format!(
        "+1-{:03}-{:03}-{:04}",
        rng.gen_range(200..1000),
        rng.gen_range(200..1000),
        rng.gen_range(0..10000)
      ),
      id: Uuid::new_v4().to_string(),
    }
  }
}

/// Raw record-put entry point: opaque payload, caller-chosen partition
/// key. Returns the provider-assigned sequence number.
pub async fn put_record(
  api: &impl StreamApi,
  stream_name: &str,
  data: Bytes,
  partition_key: &str,
) -> Result<String> {
  Ok(api.put_record(stream_name, data, partition_key).await?)
}

/// Generates `config.count` records and puts each one, pausing
/// `config.interval_ms` before every put. Returns the number of
/// records sent.
pub async fn run(
  api: &impl StreamApi,
  stream_name: &str,
  config: &ProducerConfig,
) -> Result<usize> {
  let interval = Duration::from_millis(config.interval_ms);
  let mut rng = rand::thread_rng();

  for i in 0..config.count {
    let record = DemoRecord::synth(&mut rng);
    let data = serde_json::to_vec(&record)?;

    tokio::time::sleep(interval).await;
    let sequence_number = put_record(api, stream_name, data.into(), &config.partition_key).await?;
    tracing::info!(
      n = i + 1,
      total = config.count,
      name = %record.name,
      city = %record.city,
      sequence_number = %sequence_number,
      "record sent"
    );
  }

  Ok(config.count)
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use std::sync::Mutex;

  use sluice_provision::api::StreamSummary;

  #[derive(Default)]
  struct RecordingStream {
    puts: Mutex<Vec<(String, Bytes, String)>>,
  }

  #[async_trait]
  impl StreamApi for RecordingStream {
    async fn summary(&self, _name: &str) -> sluice_provision::Result<StreamSummary> {
      unreachable!("producer never describes the stream")
    }

    async fn create(&self, _name: &str, _shard_count: i64) -> sluice_provision::Result<()> {
      unreachable!("producer never creates the stream")
    }

    async fn put_record(
      &self,
      name: &str,
      data: Bytes,
      partition_key: &str,
    ) -> sluice_provision::Result<String> {
      let mut puts = self.puts.lock().unwrap();
      puts.push((name.to_string(), data, partition_key.to_string()));
      Ok(puts.len().to_string())
    }
  }

  fn fast_config(count: usize) -> ProducerConfig {
    ProducerConfig {
      count,
      interval_ms: 1,
      partition_key: "name".to_string(),
    }
  }

  #[test]
  fn synth_records_are_well_formed() {
    let mut rng = rand::thread_rng();
    let a = DemoRecord::synth(&mut rng);
    let b = DemoRecord::synth(&mut rng);
    assert!(a.name.contains(' '));
    assert!(a.phone.starts_with("+1-"));
    assert_ne!(a.id, b.id);
  }

  #[tokio::test]
  async fn sends_the_configured_number_of_records() {
    let api = RecordingStream::default();
    let sent = run(&api, "orders", &fast_config(3)).await.unwrap();
    assert_eq!(sent, 3);

    let puts = api.puts.lock().unwrap();
    assert_eq!(puts.len(), 3);
    for (stream, data, key) in puts.iter() {
      assert_eq!(stream, "orders");
      assert_eq!(key, "name");
      let record: DemoRecord = serde_json::from_slice(data).unwrap();
      assert!(!record.id.is_empty());
    }
  }

  #[tokio::test]
  async fn put_record_returns_the_sequence_number() {
    let api = RecordingStream::default();
    let seq = put_record(&api, "orders", Bytes::from_static(b"{}"), "name")
      .await
      .unwrap();
    assert_eq!(seq, "1");
  }
}
