use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("tls: {0}")]
  Tls(#[from] rusoto_core::request::TlsError),

  #[error("invalid region: {0:?}")]
  InvalidRegion(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
