use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

use sluice_client::AwsClients;
use sluice_config::PipelineConfig;
use sluice_storage::ObjectStore;

#[derive(Debug, StructOpt)]
pub struct UploadOpt {
  /// File to upload.
  pub file: PathBuf,

  /// Object key; defaults to the file name.
  #[structopt(long)]
  pub key: Option<String>,

  #[structopt(long)]
  pub content_type: Option<String>,

  /// Presigned URL validity in seconds.
  #[structopt(long, default_value = "300")]
  pub expires_secs: u64,
}

pub async fn upload(
  clients: &AwsClients,
  config: &PipelineConfig,
  opt: &UploadOpt,
) -> anyhow::Result<()> {
  let data = tokio::fs::read(&opt.file)
    .await
    .with_context(|| format!("read {:?}", opt.file))?;

  let key = opt.key.clone().unwrap_or_else(|| {
    opt
      .file
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "upload".to_string())
  });

  let store = ObjectStore::new(clients.s3.clone(), config.delivery.bucket.clone());
  store.ensure_bucket().await?;
  store
    .put_object(&key, data.into(), opt.content_type.clone())
    .await?;

  let url = store.presigned_get_url(
    &key,
    Duration::from_secs(opt.expires_secs),
    clients.region(),
    clients.credentials(),
  );
  println!("{}", url);

  Ok(())
}
