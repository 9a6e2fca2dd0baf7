//! Transform-function deployment. The deployment package is read from
//! disk as-is; building it is someone else's job.

use crate::api::{FunctionApi, FunctionSpec, RoleApi};
use crate::error::{Error, Result};
use crate::policy;
use crate::role;
use sluice_config::TransformFunctionConfig;

pub async fn exists(api: &impl FunctionApi, name: &str) -> Result<bool> {
  match api.function_arn(name).await {
    Ok(_) => Ok(true),
    Err(err) if err.is_not_found() => Ok(false),
    Err(err) => Err(err),
  }
}

/// Returns the ARN of the transform function, deploying it (and its
/// execution role) when absent.
pub async fn ensure_function(
  lambda: &impl FunctionApi,
  iam: &impl RoleApi,
  config: &TransformFunctionConfig,
) -> Result<String> {
  match lambda.function_arn(&config.function_name).await {
    Ok(arn) => {
      tracing::debug!(function = %config.function_name, "function already exists");
      return Ok(arn);
    }
    Err(err) if err.is_not_found() => {}
    Err(err) => return Err(err),
  }

  let role_arn = role::ensure_role(iam, &config.role_name, policy::LAMBDA_PRINCIPAL, &[]).await?;
  iam
    .attach_managed_policy(&config.role_name, policy::LAMBDA_BASIC_EXECUTION_POLICY_ARN)
    .await?;

  let package = tokio::fs::read(&config.package_path)
    .await
    .map_err(|source| Error::Package {
      path: config.package_path.clone(),
      source,
    })?;

  let spec = FunctionSpec {
    name: config.function_name.clone(),
    handler: config.handler.clone(),
    runtime: config.runtime.clone(),
    role_arn,
  };
  let arn = lambda.create_function(&spec, package.into()).await?;
  tracing::info!(function = %config.function_name, arn = %arn, "function deployed");
  Ok(arn)
}
