//! Shared test helpers
//!
//! Protocol tests use the per-service mocks generated next to each
//! operations trait. Discovery and task tests need one value implementing
//! every trait, which is `MockCloud`.

use crate::aws::{
    BucketOperations, DistributionConfigSnapshot, DistributionOperations, FunctionOperations,
    LogGroupOperations, RestApiOperations, RoleOperations, VersionCursor, VersionPage,
    VersionedKey, classify_aws_error,
};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use cloudsweep_common::{
    AttachedPolicy, Bucket, Distribution, Function, LogGroup, Page, RestApi, Role,
};
use mockall::mock;

mock! {
    pub Cloud {}

    impl FunctionOperations for Cloud {
        async fn list_functions(&self, marker: Option<String>) -> Result<Page<Function>>;
        async fn delete_function(&self, name: &str) -> Result<()>;
    }

    impl LogGroupOperations for Cloud {
        async fn list_log_groups(&self, next_token: Option<String>) -> Result<Page<LogGroup>>;
        async fn delete_log_group(&self, name: &str) -> Result<()>;
    }

    impl RestApiOperations for Cloud {
        async fn list_rest_apis(&self, position: Option<String>) -> Result<Page<RestApi>>;
        async fn delete_rest_api(&self, id: &str) -> Result<()>;
    }

    impl BucketOperations for Cloud {
        async fn list_buckets(&self, continuation_token: Option<String>) -> Result<Page<Bucket>>;
        async fn list_object_versions(
            &self,
            bucket: &str,
            cursor: Option<VersionCursor>,
        ) -> Result<VersionPage>;
        async fn delete_objects(&self, bucket: &str, versions: Vec<VersionedKey>) -> Result<()>;
        async fn delete_bucket(&self, bucket: &str) -> Result<()>;
    }

    impl DistributionOperations for Cloud {
        async fn list_distributions(&self, marker: Option<String>) -> Result<Page<Distribution>>;
        async fn get_distribution_config(&self, id: &str) -> Result<DistributionConfigSnapshot>;
        async fn disable_distribution(
            &self,
            id: &str,
            snapshot: DistributionConfigSnapshot,
        ) -> Result<()>;
        async fn delete_distribution(&self, id: &str, etag: &str) -> Result<()>;
    }

    impl RoleOperations for Cloud {
        async fn list_roles(&self, marker: Option<String>) -> Result<Page<Role>>;
        async fn list_inline_policies(
            &self,
            role: &str,
            marker: Option<String>,
        ) -> Result<Page<String>>;
        async fn list_attached_policies(
            &self,
            role: &str,
            marker: Option<String>,
        ) -> Result<Page<AttachedPolicy>>;
        async fn list_instance_profiles_for_role(
            &self,
            role: &str,
            marker: Option<String>,
        ) -> Result<Page<String>>;
        async fn delete_inline_policy(&self, role: &str, policy: &str) -> Result<()>;
        async fn detach_policy(&self, role: &str, policy_arn: &str) -> Result<()>;
        async fn remove_role_from_instance_profile(&self, role: &str, profile: &str) -> Result<()>;
        async fn delete_role(&self, role: &str) -> Result<()>;
    }
}

/// Timestamp `secs` after the epoch
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// The error an SDK adapter produces for `code`
pub fn aws_error(code: &str) -> anyhow::Error {
    classify_aws_error(Some(code), Some("test failure")).into()
}

/// Answer a paginated listing from `pages`: the first page for no cursor,
/// then the page after the one whose `next` equals the cursor.
pub fn serve_pages<T>(pages: Vec<Page<T>>) -> impl FnMut(Option<String>) -> Result<Page<T>> + Send
where
    T: Clone + Send + 'static,
{
    move |cursor| {
        let index = match &cursor {
            None => 0,
            Some(c) => {
                pages
                    .iter()
                    .position(|p| p.next.as_ref() == Some(c))
                    .ok_or_else(|| anyhow!("unexpected cursor {c}"))?
                    + 1
            }
        };
        Ok(pages
            .get(index)
            .cloned()
            .unwrap_or_else(|| Page::last(Vec::new())))
    }
}

/// A listing with nothing in it
pub fn no_pages<T>() -> impl FnMut(Option<String>) -> Result<Page<T>> + Send
where
    T: Clone + Send + 'static,
{
    serve_pages(Vec::new())
}
