//! Default values shared by discovery and deletion
//!
//! These constants keep page sizes, the retry policy and the role filter
//! consistent between the listers, the deletion protocols and the tests.

use std::time::Duration;

/// Page size hint for `ListFunctions` (service maximum is 50)
pub const FUNCTION_PAGE_SIZE: i32 = 50;

/// Page size hint for `DescribeLogGroups` (service maximum is 50)
pub const LOG_GROUP_PAGE_SIZE: i32 = 50;

/// Page size hint for `GetRestApis` (service maximum is 500)
pub const REST_API_PAGE_SIZE: i32 = 100;

/// Page size hint for `ListBuckets`
pub const BUCKET_PAGE_SIZE: i32 = 1000;

/// Page size hint for `ListRoles` and the per-role policy listings
pub const ROLE_PAGE_SIZE: i32 = 100;

/// Maximum number of keys accepted by a single `DeleteObjects` call
pub const DELETE_OBJECTS_BATCH: usize = 1000;

/// Name prefixes of IAM roles managed by AWS itself.
///
/// Service-linked roles, IAM Identity Center roles and Control Tower roles
/// are never deployment artifacts and can't be deleted by the account owner.
pub const RESERVED_ROLE_PREFIXES: &[&str] = &[
    "AWSServiceRoleFor",
    "AWSReservedSSO_",
    "AWSControlTower",
    "aws-controltower-",
];

/// Total attempts for rate-limited deletion calls (first call included)
pub const RETRY_MAX_ATTEMPTS: usize = 3;

/// Delay before the first retry of a rate-limited call
pub const RETRY_INITIAL_DELAY: Duration = Duration::from_secs(60);

/// Multiplier applied to the delay between consecutive retries
pub const RETRY_FACTOR: f32 = 2.0;

/// Returns true if the role name belongs to an AWS-managed role
pub fn is_reserved_role(name: &str) -> bool {
    RESERVED_ROLE_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_roles() {
        assert!(is_reserved_role("AWSServiceRoleForECS"));
        assert!(is_reserved_role("AWSReservedSSO_AdministratorAccess_0123abcd"));
        assert!(is_reserved_role("aws-controltower-AuditReadOnlyRole"));
        assert!(!is_reserved_role("my-app-lambda-role"));
        // Prefix match is case sensitive
        assert!(!is_reserved_role("awsservicerolefor-lookalike"));
    }
}
