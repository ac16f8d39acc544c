//! Resource kinds and their labels
//!
//! The set is closed: listing, sorting and the deletion protocol for a
//! resource are all chosen by an exhaustive match on [`ResourceKind`].

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Types of AWS resources cloudsweep can discover and delete
///
/// Declaration order is the order kinds are presented to the operator and
/// the order deletion tasks run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Lambda function
    Function,
    /// CloudWatch Logs log group
    LogGroup,
    /// API Gateway REST API (deletion is rate limited)
    RestApi,
    /// S3 bucket (must be emptied before deletion)
    Bucket,
    /// CloudFront distribution (disabled first, deleted on a later run)
    Distribution,
    /// IAM role (policies must be cleared before deletion)
    Role,
}

/// Returned when a kind id on the command line doesn't name a known kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unknown resource kind '{kind}' (expected one of: {ids})",
    kind = .0,
    ids = ResourceKind::ids().join(", ")
)]
pub struct UnknownResourceKind(pub String);

impl ResourceKind {
    /// Every kind, in presentation order
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Function,
        ResourceKind::LogGroup,
        ResourceKind::RestApi,
        ResourceKind::Bucket,
        ResourceKind::Distribution,
        ResourceKind::Role,
    ];

    /// Stable identifier used on the command line and in JSON output
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Function => "function",
            ResourceKind::LogGroup => "log-group",
            ResourceKind::RestApi => "rest-api",
            ResourceKind::Bucket => "bucket",
            ResourceKind::Distribution => "distribution",
            ResourceKind::Role => "role",
        }
    }

    /// Human-readable singular label
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Function => "Lambda function",
            ResourceKind::LogGroup => "log group",
            ResourceKind::RestApi => "REST API",
            ResourceKind::Bucket => "S3 bucket",
            ResourceKind::Distribution => "CloudFront distribution",
            ResourceKind::Role => "IAM role",
        }
    }

    /// Human-readable plural label
    pub fn plural_label(self) -> &'static str {
        match self {
            ResourceKind::Function => "Lambda functions",
            ResourceKind::LogGroup => "log groups",
            ResourceKind::RestApi => "REST APIs",
            ResourceKind::Bucket => "S3 buckets",
            ResourceKind::Distribution => "CloudFront distributions",
            ResourceKind::Role => "IAM roles",
        }
    }

    /// Format a count with the matching singular or plural label, e.g. "3 S3 buckets"
    pub fn describe_count(self, count: usize) -> String {
        let label = if count == 1 {
            self.label()
        } else {
            self.plural_label()
        };
        format!("{count} {label}")
    }

    fn ids() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.as_str()).collect()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "function" | "functions" | "lambda" => Ok(ResourceKind::Function),
            "log-group" | "log-groups" | "logs" => Ok(ResourceKind::LogGroup),
            "rest-api" | "rest-apis" | "apigateway" => Ok(ResourceKind::RestApi),
            "bucket" | "buckets" | "s3" => Ok(ResourceKind::Bucket),
            "distribution" | "distributions" | "cloudfront" => Ok(ResourceKind::Distribution),
            "role" | "roles" | "iam" => Ok(ResourceKind::Role),
            _ => Err(UnknownResourceKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("s3".parse(), Ok(ResourceKind::Bucket));
        assert_eq!(" Lambda ".parse(), Ok(ResourceKind::Function));
        assert_eq!("cloudfront".parse(), Ok(ResourceKind::Distribution));
    }

    #[test]
    fn test_unknown_kind() {
        let err = "dynamodb".parse::<ResourceKind>().unwrap_err();
        assert_eq!(err, UnknownResourceKind("dynamodb".to_string()));
        assert_eq!(
            err.to_string(),
            "Unknown resource kind 'dynamodb' (expected one of: function, log-group, \
             rest-api, bucket, distribution, role)"
        );
    }

    #[test]
    fn test_ordering_follows_declaration() {
        let mut kinds = vec![ResourceKind::Role, ResourceKind::Function, ResourceKind::Bucket];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![ResourceKind::Function, ResourceKind::Bucket, ResourceKind::Role]
        );
    }

    #[test]
    fn test_describe_count() {
        assert_eq!(ResourceKind::Bucket.describe_count(1), "1 S3 bucket");
        assert_eq!(ResourceKind::Role.describe_count(4), "4 IAM roles");
        assert_eq!(ResourceKind::LogGroup.describe_count(0), "0 log groups");
    }
}
