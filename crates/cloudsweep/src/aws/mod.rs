//! AWS client modules
//!
//! This module provides adapters around the AWS SDK clients for:
//! - Lambda, CloudWatch Logs, API Gateway: functions, log groups, REST APIs
//! - S3: buckets and their objects
//! - CloudFront: distributions
//! - IAM: roles and everything attached to them
//! - STS: caller identity, via [`AwsContext::caller_identity`]
//!
//! Each service module defines an operations trait implemented by
//! [`AwsClients`]. Discovery and deletion only see [`CloudOperations`], so
//! tests can substitute mocks.

pub mod apigateway;
pub mod clients;
pub mod cloudfront;
pub mod context;
pub mod error;
pub mod iam;
pub mod lambda;
pub mod logs;
pub mod retry;
pub mod s3;

// Core clients
pub use clients::AwsClients;
pub use context::{AwsContext, CallerIdentity, FromAwsContext};

// Operation traits
pub use apigateway::RestApiOperations;
pub use cloudfront::{DistributionConfigSnapshot, DistributionOperations};
pub use iam::RoleOperations;
pub use lambda::FunctionOperations;
pub use logs::LogGroupOperations;
pub use s3::{BucketOperations, VersionCursor, VersionPage, VersionedKey};

#[cfg(test)]
pub use apigateway::MockRestApiOperations;
#[cfg(test)]
pub use cloudfront::MockDistributionOperations;
#[cfg(test)]
pub use iam::MockRoleOperations;
#[cfg(test)]
pub use lambda::MockFunctionOperations;
#[cfg(test)]
pub use logs::MockLogGroupOperations;
#[cfg(test)]
pub use s3::MockBucketOperations;

// Error handling
pub use error::{AwsError, classify_anyhow_error, classify_aws_error, sdk_error};
pub use retry::RetryPolicy;

/// Every operation discovery and deletion need, across all services
pub trait CloudOperations:
    FunctionOperations
    + LogGroupOperations
    + RestApiOperations
    + BucketOperations
    + DistributionOperations
    + RoleOperations
{
}

impl<T> CloudOperations for T where
    T: FunctionOperations
        + LogGroupOperations
        + RestApiOperations
        + BucketOperations
        + DistributionOperations
        + RoleOperations
{
}
