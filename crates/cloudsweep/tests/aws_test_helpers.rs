//! Shared utilities for AWS integration tests
//!
//! Provides region detection, unique resource names and a loaded client set.

#![allow(dead_code)]

use chrono::Utc;
use cloudsweep::aws::{AwsClients, AwsContext, FromAwsContext};

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-2
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-2".to_string())
}

/// Generate a unique name for test resources.
///
/// Format: `cloudsweep-test-{timestamp}` where timestamp is Unix seconds.
pub fn test_resource_name() -> String {
    format!("cloudsweep-test-{}", Utc::now().timestamp())
}

/// Load the AWS context and clients for the test region
pub async fn test_clients() -> (AwsContext, AwsClients) {
    let region = get_test_region();
    let ctx = AwsContext::load(Some(&region), None).await;
    let clients = AwsClients::from_context(&ctx);
    (ctx, clients)
}
