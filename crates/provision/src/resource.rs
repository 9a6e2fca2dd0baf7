use std::fmt;

/// Kinds of provider resources this crate manages, used in errors and
/// log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
  Stream,
  DeliveryStream,
  Role,
  Function,
  Bucket,
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ResourceKind::Stream => "stream",
      ResourceKind::DeliveryStream => "delivery stream",
      ResourceKind::Role => "role",
      ResourceKind::Function => "function",
      ResourceKind::Bucket => "bucket",
    };
    f.write_str(s)
  }
}

/// Lifecycle status as reported by the provider. Transitions are owned
/// by the provider; this crate only ever observes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
  Creating,
  Active,
  Deleting,
  Unknown(String),
}

impl ResourceStatus {
  pub fn parse(status: &str) -> Self {
    match status {
      "CREATING" => ResourceStatus::Creating,
      "ACTIVE" => ResourceStatus::Active,
      "DELETING" => ResourceStatus::Deleting,
      other => ResourceStatus::Unknown(other.to_string()),
    }
  }

  pub fn is_active(&self) -> bool {
    matches!(self, ResourceStatus::Active)
  }
}

impl fmt::Display for ResourceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ResourceStatus::Creating => f.write_str("CREATING"),
      ResourceStatus::Active => f.write_str("ACTIVE"),
      ResourceStatus::Deleting => f.write_str("DELETING"),
      ResourceStatus::Unknown(s) => f.write_str(s),
    }
  }
}
