use std::path::PathBuf;
use thiserror::Error;

use crate::resource::{ResourceKind, ResourceStatus};

/// Structured provisioning error. NotFound is a distinct kind so
/// existence probes can treat it as a normal negative while every other
/// provider failure stays visible to the caller.
#[derive(Error, Debug)]
pub enum Error {
  #[error("{resource} {name:?} not found")]
  NotFound { resource: ResourceKind, name: String },

  #[error("{operation}: {message}")]
  Provider {
    operation: &'static str,
    message: String,
  },

  #[error("{resource} {name:?} entered fatal status {status}")]
  FatalStatus {
    resource: ResourceKind,
    name: String,
    status: ResourceStatus,
  },

  #[error("{resource} {name:?} did not become active in time")]
  Deadline { resource: ResourceKind, name: String },

  #[error("wait cancelled")]
  Cancelled,

  #[error("read deployment package {path:?}: {source}")]
  Package {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("provider response missing {0}")]
  MissingField(&'static str),
}

impl Error {
  pub fn provider<E: std::fmt::Display>(operation: &'static str, err: E) -> Self {
    Error::Provider {
      operation,
      message: err.to_string(),
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::NotFound { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
