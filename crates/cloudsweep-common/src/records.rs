//! Read-only snapshots of discovered resources
//!
//! Records are fetched fresh every session and never mutated locally; the
//! only thing cloudsweep does with them is delete the remote resource.

use crate::pagination::PageItem;
use crate::resource_kind::ResourceKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lambda function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub runtime: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// CloudWatch Logs log group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogGroup {
    pub name: String,
    pub stored_bytes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// API Gateway REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestApi {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// S3 bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// CloudFront distribution summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub id: String,
    pub domain_name: String,
    pub comment: String,
    pub enabled: bool,
    /// Deployment status ("Deployed" or "InProgress")
    pub status: String,
    pub last_modified: DateTime<Utc>,
}

/// IAM role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub name: String,
    pub arn: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

/// Managed policy attached to a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedPolicy {
    pub name: String,
    pub arn: String,
}

/// A discovered resource of any kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Resource {
    Function(Function),
    LogGroup(LogGroup),
    RestApi(RestApi),
    Bucket(Bucket),
    Distribution(Distribution),
    Role(Role),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Function(_) => ResourceKind::Function,
            Resource::LogGroup(_) => ResourceKind::LogGroup,
            Resource::RestApi(_) => ResourceKind::RestApi,
            Resource::Bucket(_) => ResourceKind::Bucket,
            Resource::Distribution(_) => ResourceKind::Distribution,
            Resource::Role(_) => ResourceKind::Role,
        }
    }

    /// Identifier passed to the provider's delete call (name or id)
    pub fn key(&self) -> &str {
        match self {
            Resource::Function(f) => &f.name,
            Resource::LogGroup(g) => &g.name,
            Resource::RestApi(a) => &a.id,
            Resource::Bucket(b) => &b.name,
            Resource::Distribution(d) => &d.id,
            Resource::Role(r) => &r.name,
        }
    }

    /// Natural timestamp of the kind: creation or last modification
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Resource::Function(f) => f.last_modified,
            Resource::LogGroup(g) => g.created_at,
            Resource::RestApi(a) => a.created_at,
            Resource::Bucket(b) => b.created_at,
            Resource::Distribution(d) => d.last_modified,
            Resource::Role(r) => r.created_at,
        }
    }

    /// One-line description shown in the selection prompt
    pub fn label(&self) -> String {
        let when = self.timestamp().format("%Y-%m-%d %H:%M");
        match self {
            Resource::Function(f) => match &f.runtime {
                Some(runtime) => format!("{} ({runtime}, modified {when})", f.name),
                None => format!("{} (modified {when})", f.name),
            },
            Resource::LogGroup(g) => format!("{} (created {when})", g.name),
            Resource::RestApi(a) => format!("{} [{}] (created {when})", a.name, a.id),
            Resource::Bucket(b) => format!("{} (created {when})", b.name),
            Resource::Distribution(d) => {
                let state = if d.enabled { "enabled" } else { "disabled" };
                let name = if d.comment.is_empty() {
                    d.domain_name.as_str()
                } else {
                    d.comment.as_str()
                };
                format!("{} {name} ({state}, {}, modified {when})", d.id, d.status)
            }
            Resource::Role(r) => format!("{} (created {when})", r.name),
        }
    }
}

impl PageItem for Resource {
    fn page_key(&self) -> &str {
        self.key()
    }
}

macro_rules! page_key {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(impl PageItem for $ty {
            fn page_key(&self) -> &str {
                &self.$field
            }
        })*
    };
}

page_key! {
    Function => name,
    LogGroup => name,
    RestApi => id,
    Bucket => name,
    Distribution => id,
    Role => name,
    AttachedPolicy => arn,
}

/// Sort resources newest first by their natural timestamp.
///
/// The sort is stable, so records with equal timestamps keep the order the
/// provider returned them in.
pub fn sort_newest_first(resources: &mut [Resource]) {
    resources.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}
