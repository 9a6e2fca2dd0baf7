use structopt::StructOpt;

use sluice_client::AwsClients;
use sluice_config::PipelineConfig;

mod object;
mod pipeline;

#[derive(Debug, StructOpt)]
enum Opt {
  /// Provision the stream, delivery stream and supporting roles.
  Provision(pipeline::ProvisionOpt),
  /// Send synthetic records into the stream.
  Produce(pipeline::ProduceOpt),
  /// Provision, then produce: the full demo flow.
  Run(pipeline::RunOpt),
  /// Show the current status of the pipeline resources.
  Status,
  /// Upload a file to the bucket and print a presigned download URL.
  Upload(object::UploadOpt),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv::dotenv().ok();
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  let opt = Opt::from_args();
  let config = PipelineConfig::load_or_default()?;
  let clients = AwsClients::from_config(&config.connection)?;

  match opt {
    Opt::Provision(opt) => {
      pipeline::provision(&clients, &config, &opt).await?;
    }
    Opt::Produce(opt) => {
      pipeline::produce(&clients, &config, &opt).await?;
    }
    Opt::Run(opt) => {
      pipeline::run(&clients, &config, &opt).await?;
    }
    Opt::Status => {
      pipeline::status(&clients, &config).await?;
    }
    Opt::Upload(opt) => {
      object::upload(&clients, &config, &opt).await?;
    }
  }

  Ok(())
}
