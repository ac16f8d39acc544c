//! IAM integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_iam_integration -- --ignored
//! ```

mod aws_test_helpers;

use aws_test_helpers::*;
use cloudsweep::catalog::list_roles;
use cloudsweep::tasks::protocol::{ItemOutcome, TaskProgress, unwind_and_delete_role};
use cloudsweep::tasks::LogReporter;

const LAMBDA_ASSUME_ROLE_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {
            "Effect": "Allow",
            "Principal": { "Service": "lambda.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }
    ]
}"#;

const INLINE_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        { "Effect": "Allow", "Action": "logs:CreateLogGroup", "Resource": "*" }
    ]
}"#;

/// A role with inline and managed policies is unwound and deleted
#[tokio::test]
#[ignore]
async fn test_role_unwound_and_deleted() {
    let (ctx, clients) = test_clients().await;
    let iam = aws_sdk_iam::Client::new(ctx.sdk_config());
    let role = test_resource_name();

    iam.create_role()
        .role_name(&role)
        .assume_role_policy_document(LAMBDA_ASSUME_ROLE_POLICY)
        .send()
        .await
        .expect("Should create role");
    iam.put_role_policy()
        .role_name(&role)
        .policy_name("cloudsweep-test-inline")
        .policy_document(INLINE_POLICY)
        .send()
        .await
        .expect("Should put inline policy");
    iam.attach_role_policy()
        .role_name(&role)
        .policy_arn("arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole")
        .send()
        .await
        .expect("Should attach managed policy");

    let reporter = LogReporter::new();
    let outcome = unwind_and_delete_role(&clients, &role, TaskProgress::new(&reporter, 0))
        .await
        .expect("Should unwind and delete role");
    assert_eq!(outcome, ItemOutcome::Deleted);

    let roles = list_roles(&clients).await.expect("Should list roles");
    assert!(roles.iter().all(|r| r.key() != role));
}

/// Role listing never contains AWS-managed roles
#[tokio::test]
#[ignore]
async fn test_list_roles_excludes_reserved() {
    let (_ctx, clients) = test_clients().await;
    let roles = list_roles(&clients).await.expect("Should list roles");
    assert!(
        roles
            .iter()
            .all(|r| !cloudsweep_common::defaults::is_reserved_role(r.key()))
    );
    assert!(
        roles
            .windows(2)
            .all(|w| w[0].timestamp() >= w[1].timestamp())
    );
}
