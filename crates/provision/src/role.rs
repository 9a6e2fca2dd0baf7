//! IAM role provisioning.
//!
//! An existing role is returned as-is: its policies are never
//! reconciled or removed, the policy set is additive only. A failed
//! policy attachment aborts without rolling back the role or the
//! policies attached so far; re-running converges because the role is
//! then found and adopted.

use crate::api::RoleApi;
use crate::error::Result;
use crate::policy::{self, InlinePolicy};

pub async fn exists(api: &impl RoleApi, name: &str) -> Result<bool> {
  match api.role_arn(name).await {
    Ok(_) => Ok(true),
    Err(err) if err.is_not_found() => Ok(false),
    Err(err) => Err(err),
  }
}

/// Returns the ARN of the role, creating it with a trust document for
/// `trust_principal` and attaching `policies` when absent.
pub async fn ensure_role(
  api: &impl RoleApi,
  name: &str,
  trust_principal: &str,
  policies: &[InlinePolicy],
) -> Result<String> {
  match api.role_arn(name).await {
    Ok(arn) => {
      tracing::debug!(role = name, "role already exists");
      return Ok(arn);
    }
    Err(err) if err.is_not_found() => {}
    Err(err) => return Err(err),
  }

  let trust = policy::assume_role_policy(trust_principal).to_string();
  let arn = api.create_role(name, &trust).await?;

  for policy in policies {
    api
      .put_inline_policy(name, policy.name, &policy.document.to_string())
      .await?;
  }

  tracing::info!(role = name, policies = policies.len(), "role created");
  Ok(arn)
}
