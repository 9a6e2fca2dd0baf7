use structopt::StructOpt;

use sluice_client::AwsClients;
use sluice_config::PipelineConfig;
use sluice_provision::api::{DeliveryApi, StreamApi};
use sluice_provision::{PipelineArns, Provisioner, SourceKind};

#[derive(Debug, StructOpt)]
pub struct ProvisionOpt {
  /// Feed the delivery stream by direct puts instead of a source stream.
  #[structopt(long)]
  pub direct_put: bool,

  /// Skip the transform stage.
  #[structopt(long)]
  pub no_transform: bool,
}

#[derive(Debug, StructOpt)]
pub struct ProduceOpt {
  /// Number of records to send.
  #[structopt(long)]
  pub count: Option<usize>,

  /// Pause between records, in milliseconds.
  #[structopt(long)]
  pub interval_ms: Option<u64>,
}

#[derive(Debug, StructOpt)]
pub struct RunOpt {
  #[structopt(flatten)]
  pub provision: ProvisionOpt,

  #[structopt(flatten)]
  pub produce: ProduceOpt,
}

pub async fn provision(
  clients: &AwsClients,
  config: &PipelineConfig,
  opt: &ProvisionOpt,
) -> anyhow::Result<PipelineArns> {
  let mut config = config.clone();
  if opt.no_transform {
    config.delivery.transform.enabled = false;
  }

  let provisioner = Provisioner::new(clients.clone(), config);
  let token = provisioner.cancellation_token();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      tracing::warn!("interrupted, aborting wait");
      token.cancel();
    }
  });

  let source = if opt.direct_put {
    SourceKind::DirectPut
  } else {
    SourceKind::StreamSource
  };
  let arns = provisioner.ensure_pipeline(source).await?;

  if let Some(arn) = &arns.stream_arn {
    println!("stream:          {}", arn);
  }
  if let Some(arn) = &arns.transform_arn {
    println!("transform:       {}", arn);
  }
  println!("delivery stream: {}", arns.delivery_stream_arn);

  Ok(arns)
}

pub async fn produce(
  clients: &AwsClients,
  config: &PipelineConfig,
  opt: &ProduceOpt,
) -> anyhow::Result<()> {
  let mut producer_config = config.producer.clone();
  if let Some(count) = opt.count {
    producer_config.count = count;
  }
  if let Some(interval_ms) = opt.interval_ms {
    producer_config.interval_ms = interval_ms;
  }

  let sent = sluice_producer::run(
    clients.kinesis.as_ref(),
    &config.stream.name,
    &producer_config,
  )
  .await?;
  println!("{} records sent to {}", sent, config.stream.name);

  Ok(())
}

pub async fn run(
  clients: &AwsClients,
  config: &PipelineConfig,
  opt: &RunOpt,
) -> anyhow::Result<()> {
  provision(clients, config, &opt.provision).await?;
  produce(clients, config, &opt.produce).await?;
  Ok(())
}

pub async fn status(clients: &AwsClients, config: &PipelineConfig) -> anyhow::Result<()> {
  match clients.kinesis.summary(&config.stream.name).await {
    Ok(summary) => println!(
      "stream {}: {} ({} shards)",
      summary.name, summary.status, summary.shard_count
    ),
    Err(err) if err.is_not_found() => println!("stream {}: not created", config.stream.name),
    Err(err) => return Err(err.into()),
  }

  match clients.firehose.summary(&config.delivery.name).await {
    Ok(summary) => println!("delivery stream {}: {}", summary.name, summary.status),
    Err(err) if err.is_not_found() => {
      println!("delivery stream {}: not created", config.delivery.name)
    }
    Err(err) => return Err(err.into()),
  }

  Ok(())
}
