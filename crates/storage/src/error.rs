use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("{operation}: {message}")]
  Provider {
    operation: &'static str,
    message: String,
  },

  #[error("object {key:?} not found")]
  NotFound { key: String },

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  pub fn provider<E: std::fmt::Display>(operation: &'static str, err: E) -> Self {
    Error::Provider {
      operation,
      message: err.to_string(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
