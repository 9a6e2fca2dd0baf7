//! Readiness polling for asynchronously provisioned resources.
//!
//! The provider acknowledges a create call long before the resource is
//! usable, so callers block here re-reading the status until it turns
//! ACTIVE. The wait is bounded: exponential backoff with jitter up to
//! `max_elapsed_time`, and a cancellation token aborts it from outside.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::resource::{ResourceKind, ResourceStatus};

#[derive(Debug, Clone)]
pub struct PollOpts {
  /// Interval before the first re-read; grows from here.
  pub initial_interval: Duration,
  pub max_interval: Duration,
  /// Overall budget for the wait. `None` waits forever.
  pub max_elapsed_time: Option<Duration>,
  /// Statuses that terminate the wait as failures.
  pub fatal: Vec<ResourceStatus>,
}

impl Default for PollOpts {
  fn default() -> Self {
    PollOpts {
      initial_interval: Duration::from_secs(2),
      max_interval: Duration::from_secs(30),
      max_elapsed_time: Some(Duration::from_secs(300)),
      fatal: vec![ResourceStatus::Deleting],
    }
  }
}

impl PollOpts {
  pub fn with_interval(interval: Duration) -> Self {
    PollOpts {
      initial_interval: interval,
      ..Default::default()
    }
  }

  pub fn fatal_status(mut self, status: ResourceStatus) -> Self {
    self.fatal.push(status);
    self
  }
}

/// Re-reads a resource's status until it reaches ACTIVE.
///
/// Returns `Ok(())` once ACTIVE is observed. Terminates with an error
/// on the first fatal status, the first describe error (not retried),
/// backoff exhaustion, or cancellation.
pub async fn wait_until_active<F, Fut>(
  resource: ResourceKind,
  name: &str,
  mut describe: F,
  opts: &PollOpts,
  token: &CancellationToken,
) -> Result<()>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<ResourceStatus>>,
{
  let mut backoff = ExponentialBackoff {
    initial_interval: opts.initial_interval,
    max_interval: opts.max_interval,
    max_elapsed_time: opts.max_elapsed_time,
    ..Default::default()
  };

  loop {
    let status = describe().await?;

    if status.is_active() {
      tracing::info!(%resource, name, "active");
      return Ok(());
    }

    if opts.fatal.contains(&status) {
      tracing::error!(%resource, name, %status, "fatal status while waiting");
      return Err(Error::FatalStatus {
        resource,
        name: name.to_string(),
        status,
      });
    }

    let delay = match backoff.next_backoff() {
      Some(delay) => delay,
      None => {
        tracing::error!(%resource, name, "wait budget exhausted");
        return Err(Error::Deadline {
          resource,
          name: name.to_string(),
        });
      }
    };

    tracing::debug!(%resource, name, %status, ?delay, "not active yet");

    tokio::select! {
      _ = token.cancelled() => return Err(Error::Cancelled),
      _ = tokio::time::sleep(delay) => {}
    }
  }
}
