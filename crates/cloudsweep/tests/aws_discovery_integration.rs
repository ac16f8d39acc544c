//! Discovery integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_discovery_integration -- --ignored
//! ```

mod aws_test_helpers;

use aws_test_helpers::*;
use cloudsweep::catalog::Catalog;
use cloudsweep_common::ResourceKind;

/// Credentials resolve to a 12-digit account and a principal ARN
#[tokio::test]
#[ignore]
async fn test_caller_identity() {
    let (ctx, _clients) = test_clients().await;
    let identity = ctx
        .caller_identity()
        .await
        .expect("AWS credentials required - set AWS_PROFILE or AWS_ACCESS_KEY_ID");
    assert_eq!(identity.account.len(), 12);
    assert!(identity.arn.starts_with("arn:aws"));
}

/// Every kind lists without error and each list is newest first
#[tokio::test]
#[ignore]
async fn test_discover_all_kinds() {
    let (_ctx, clients) = test_clients().await;
    let catalog = Catalog::discover(&clients, &ResourceKind::ALL)
        .await
        .expect("Should list every kind");

    let kinds: Vec<_> = catalog.iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, ResourceKind::ALL.to_vec());
    for (kind, resources) in catalog.iter() {
        assert!(
            resources
                .windows(2)
                .all(|w| w[0].timestamp() >= w[1].timestamp()),
            "{kind} listing is not newest first"
        );
    }
}
