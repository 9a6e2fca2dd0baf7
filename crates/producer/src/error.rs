use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("put record: {0}")]
  Put(#[from] sluice_provision::Error),

  #[error("encode record: {0}")]
  Encode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
