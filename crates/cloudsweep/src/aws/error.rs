//! AWS error classification and handling
//!
//! SDK errors are classified once, at the call site, using the `.code()`
//! and `.message()` metadata every SDK error carries. The classified
//! [`AwsError`] travels inside the `anyhow` chain and is recovered with
//! [`classify_anyhow_error`] wherever a decision depends on it (retry,
//! "already deleted").

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

/// AWS error categories for retry and cleanup logic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AwsError {
    /// Resource was not found (already deleted)
    #[error("{message}")]
    NotFound { code: String, message: String },

    /// Provider rate limit hit (the only class that is retried)
    #[error("Too many requests: {message}")]
    TooManyRequests { message: String },

    /// Resource still has dependents (non-empty bucket, attached policy, enabled distribution)
    #[error("{code}: {message}")]
    DependencyViolation { code: String, message: String },

    /// Any other AWS SDK error with code and message
    #[error("{}: {message}", .code.as_deref().unwrap_or("AWS error"))]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this error should be retried with backoff
    pub fn is_too_many_requests(&self) -> bool {
        matches!(self, AwsError::TooManyRequests { .. })
    }

    /// Check if a prerequisite (emptying, detaching, disabling) was not cleared
    pub fn is_dependency_violation(&self) -> bool {
        matches!(self, AwsError::DependencyViolation { .. })
    }

    /// What the operator can do about this error, if anything obvious
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AwsError::TooManyRequests { .. } => {
                Some("AWS is rate limiting this account; wait a few minutes and run again")
            }
            AwsError::Sdk { code: Some(code), .. } if CREDENTIAL_CODES.contains(&code.as_str()) => {
                Some("The credentials are invalid or expired; refresh them or pick another --profile")
            }
            AwsError::Sdk { code: Some(code), .. } if ACCESS_DENIED_CODES.contains(&code.as_str()) => {
                Some("The credentials lack permission for this call; pass --kinds to skip it")
            }
            _ => None,
        }
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "NotFoundException",
    "NoSuchBucket",
    "NoSuchEntity",
    "NoSuchDistribution",
];

/// Error code API Gateway (and Lambda) use for rate limiting
const TOO_MANY_REQUESTS_CODE: &str = "TooManyRequestsException";

/// Known AWS error codes for dependencies that were not cleared before deletion
const DEPENDENCY_CODES: &[&str] = &[
    "BucketNotEmpty",
    "DeleteConflict",
    "DistributionNotDisabled",
    "DependencyViolation",
];

/// Error codes for credentials STS or the service rejected outright
const CREDENTIAL_CODES: &[&str] = &[
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "UnrecognizedClientException",
    "SignatureDoesNotMatch",
];

/// Error codes for valid credentials without the needed permission
const ACCESS_DENIED_CODES: &[&str] = &["AccessDenied", "AccessDeniedException"];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(TOO_MANY_REQUESTS_CODE) => AwsError::TooManyRequests { message },
        Some(c) if DEPENDENCY_CODES.contains(&c) => AwsError::DependencyViolation {
            code: c.to_string(),
            message,
        },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an SDK error at the call site.
///
/// Intended for `.map_err(sdk_error)` right after `.send().await`. When the
/// service sent no message (timeouts, dispatch failures) the full SDK error
/// context is kept instead so nothing is lost for diagnosis.
pub fn sdk_error<E>(err: E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = match err.message() {
        Some(m) => m.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    classify_aws_error(err.code(), Some(&message))
}

/// Recover the classified error from an `anyhow` chain.
///
/// Errors that never went through [`sdk_error`] come back as
/// [`AwsError::Sdk`] without a code.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<AwsError>() {
            return e.clone();
        }
    }

    AwsError::Sdk {
        code: None,
        message: format!("{error:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn too_many_requests() {
        let err = classify_aws_error(Some("TooManyRequestsException"), Some("Too Many Requests"));
        assert!(err.is_too_many_requests());
        assert_eq!(err.to_string(), "Too many requests: Too Many Requests");
    }

    #[test]
    fn generic_throttling_is_not_retryable_class() {
        // Only the explicit TooManyRequests class is retried
        for code in ["Throttling", "ThrottlingException", "RequestLimitExceeded"] {
            let err = classify_aws_error(Some(code), Some("slow down"));
            assert!(!err.is_too_many_requests(), "{code} must not be retried");
        }
    }

    #[test]
    fn dependency_codes() {
        for code in DEPENDENCY_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(
                err.is_dependency_violation(),
                "Expected DependencyViolation for code: {code}"
            );
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, AwsError::Sdk { .. }));
        assert_eq!(err.to_string(), "SomeNewError: details");

        let err2 = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err2, AwsError::Sdk { code: None, .. }));
        assert_eq!(err2.to_string(), "AWS error: something failed");
    }

    #[test]
    fn message_is_preserved_verbatim() {
        let err = classify_aws_error(
            Some("BucketNotEmpty"),
            Some("The bucket you tried to delete is not empty"),
        );
        assert_eq!(
            err.to_string(),
            "BucketNotEmpty: The bucket you tried to delete is not empty"
        );
    }

    #[test]
    fn classify_through_anyhow_context() {
        let result: Result<(), AwsError> = Err(AwsError::TooManyRequests {
            message: "slow down".to_string(),
        });
        let err = result.context("Failed to delete REST API abc").unwrap_err();
        assert!(classify_anyhow_error(&err).is_too_many_requests());
    }

    #[test]
    fn hints_for_credentials_and_permissions() {
        let expired = classify_aws_error(Some("ExpiredToken"), Some("token expired"));
        assert!(expired.hint().unwrap().contains("--profile"));

        let denied = classify_aws_error(Some("AccessDeniedException"), Some("not allowed"));
        assert!(denied.hint().unwrap().contains("--kinds"));

        let limited = classify_aws_error(Some("TooManyRequestsException"), None);
        assert!(limited.hint().is_some());

        assert_eq!(classify_aws_error(Some("NoSuchBucket"), None).hint(), None);
        assert_eq!(classify_aws_error(None, Some("dispatch failure")).hint(), None);
    }

    #[test]
    fn classify_plain_anyhow_error() {
        let err = anyhow::anyhow!("connection refused");
        let classified = classify_anyhow_error(&err);
        assert!(matches!(classified, AwsError::Sdk { code: None, .. }));
        assert!(!classified.is_too_many_requests());
    }
}
