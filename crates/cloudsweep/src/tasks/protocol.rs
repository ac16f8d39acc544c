//! Per-kind deletion protocols
//!
//! Each protocol clears whatever blocks the final delete call (object
//! versions in a bucket, policies on a role, the enabled flag on a
//! distribution) and then deletes. Protocols stop on the first error; the
//! caller decides what a failure means for the rest of the task.
//!
//! "Not found" is only read as "already deleted" when it answers a call
//! about the item itself: the lookup that opens a protocol or its final
//! delete. A policy vanishing halfway through a role's unwinding is still
//! an error.

use crate::aws::{
    BucketOperations, CloudOperations, DistributionOperations, FunctionOperations,
    LogGroupOperations, RestApiOperations, RetryPolicy, RoleOperations, classify_anyhow_error,
};
use crate::tasks::progress::TaskReporter;
use anyhow::Result;
use cloudsweep_common::defaults::DELETE_OBJECTS_BATCH;
use cloudsweep_common::{Resource, drain_pages};
use tracing::{debug, info};

/// What happened to one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Deleted,
    /// Distribution was disabled (or is still propagating) and needs another run
    Disabled,
    /// The provider no longer knows the resource
    AlreadyDeleted,
}

/// Progress sink bound to one task
#[derive(Clone, Copy)]
pub struct TaskProgress<'a> {
    reporter: &'a dyn TaskReporter,
    task: usize,
}

impl<'a> TaskProgress<'a> {
    pub fn new(reporter: &'a dyn TaskReporter, task: usize) -> Self {
        Self { reporter, task }
    }

    pub fn step(&self, message: impl Into<String>) {
        self.reporter.progress(self.task, message.into());
    }
}

/// Run the deletion protocol matching the resource's kind
pub async fn delete_item<C: CloudOperations>(
    cloud: &C,
    item: &Resource,
    retry: &RetryPolicy,
    progress: TaskProgress<'_>,
) -> Result<ItemOutcome> {
    let outcome = match item {
        Resource::Function(f) => delete_function(cloud, &f.name, progress).await,
        Resource::LogGroup(g) => delete_log_group(cloud, &g.name, progress).await,
        Resource::RestApi(a) => delete_rest_api(cloud, &a.id, retry, progress).await,
        Resource::Bucket(b) => empty_and_delete_bucket(cloud, &b.name, progress).await,
        Resource::Distribution(d) => disable_or_delete_distribution(cloud, &d.id, progress).await,
        Resource::Role(r) => unwind_and_delete_role(cloud, &r.name, progress).await,
    }?;

    if outcome == ItemOutcome::AlreadyDeleted {
        progress.step(format!("{} {} already deleted", item.kind().label(), item.key()));
    }
    Ok(outcome)
}

/// `None` when a call about the item itself says it no longer exists
fn unless_gone<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if classify_anyhow_error(&e).is_not_found() => {
            debug!(error = %e, "Resource already gone");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Outcome of a protocol's final delete call
fn deleted(result: Result<()>) -> Result<ItemOutcome> {
    Ok(match unless_gone(result)? {
        Some(()) => ItemOutcome::Deleted,
        None => ItemOutcome::AlreadyDeleted,
    })
}

pub async fn delete_function<C: FunctionOperations>(
    cloud: &C,
    name: &str,
    progress: TaskProgress<'_>,
) -> Result<ItemOutcome> {
    progress.step(format!("Deleting Lambda function {name}"));
    deleted(cloud.delete_function(name).await)
}

pub async fn delete_log_group<C: LogGroupOperations>(
    cloud: &C,
    name: &str,
    progress: TaskProgress<'_>,
) -> Result<ItemOutcome> {
    progress.step(format!("Deleting log group {name}"));
    deleted(cloud.delete_log_group(name).await)
}

/// Delete a REST API, backing off while the provider rate-limits us
pub async fn delete_rest_api<C: RestApiOperations>(
    cloud: &C,
    id: &str,
    retry: &RetryPolicy,
    progress: TaskProgress<'_>,
) -> Result<ItemOutcome> {
    progress.step(format!("Deleting REST API {id}"));
    let result = retry
        .run(
            "delete REST API",
            || cloud.delete_rest_api(id),
            |e, delay| {
                progress.step(format!(
                    "{e:#}; retrying REST API {id} in {}s",
                    delay.as_secs()
                ))
            },
        )
        .await;
    deleted(result)
}

/// Delete every object version and delete marker page by page, then the bucket
pub async fn empty_and_delete_bucket<C: BucketOperations>(
    cloud: &C,
    bucket: &str,
    progress: TaskProgress<'_>,
) -> Result<ItemOutcome> {
    progress.step(format!("Emptying bucket {bucket}"));

    let Some(mut page) = unless_gone(cloud.list_object_versions(bucket, None).await)? else {
        return Ok(ItemOutcome::AlreadyDeleted);
    };
    let mut removed = 0usize;
    loop {
        for batch in page.versions.chunks(DELETE_OBJECTS_BATCH) {
            cloud.delete_objects(bucket, batch.to_vec()).await?;
            removed += batch.len();
            progress.step(format!("Deleted {removed} objects from {bucket}"));
        }
        match page.next.take() {
            Some(cursor) => page = cloud.list_object_versions(bucket, Some(cursor)).await?,
            None => break,
        }
    }

    info!(bucket = %bucket, objects = removed, "Bucket emptied");
    progress.step(format!("Deleting bucket {bucket}"));
    deleted(cloud.delete_bucket(bucket).await)
}

/// Disable an enabled distribution, or delete one that is already disabled.
///
/// The state comes from the live config every time, so a distribution
/// disabled on an earlier run is deleted on this one. A delete rejected
/// because the disable is still deploying is reported as pending.
pub async fn disable_or_delete_distribution<C: DistributionOperations>(
    cloud: &C,
    id: &str,
    progress: TaskProgress<'_>,
) -> Result<ItemOutcome> {
    let Some(snapshot) = unless_gone(cloud.get_distribution_config(id).await)? else {
        return Ok(ItemOutcome::AlreadyDeleted);
    };

    if snapshot.enabled {
        progress.step(format!("Disabling distribution {id}"));
        cloud.disable_distribution(id, snapshot).await?;
        progress.step(format!(
            "Distribution {id} disabled; run again once it is deployed to delete it"
        ));
        return Ok(ItemOutcome::Disabled);
    }

    progress.step(format!("Deleting distribution {id}"));
    match cloud.delete_distribution(id, &snapshot.etag).await {
        Err(e) if classify_anyhow_error(&e).is_dependency_violation() => {
            progress.step(format!(
                "Distribution {id} is still being disabled; run again later to delete it"
            ));
            Ok(ItemOutcome::Disabled)
        }
        result => deleted(result),
    }
}

/// Remove everything attached to a role, then delete it
pub async fn unwind_and_delete_role<C: RoleOperations>(
    cloud: &C,
    role: &str,
    progress: TaskProgress<'_>,
) -> Result<ItemOutcome> {
    let inline = drain_pages("inline policies", |marker| {
        cloud.list_inline_policies(role, marker)
    })
    .await;
    let Some(inline) = unless_gone(inline)? else {
        return Ok(ItemOutcome::AlreadyDeleted);
    };
    for policy in &inline {
        progress.step(format!("Deleting inline policy {policy} from role {role}"));
        cloud.delete_inline_policy(role, policy).await?;
    }

    let attached = drain_pages("attached policies", |marker| {
        cloud.list_attached_policies(role, marker)
    })
    .await?;
    for policy in &attached {
        progress.step(format!("Detaching policy {} from role {role}", policy.name));
        cloud.detach_policy(role, &policy.arn).await?;
    }

    let profiles = drain_pages("instance profiles", |marker| {
        cloud.list_instance_profiles_for_role(role, marker)
    })
    .await?;
    for profile in &profiles {
        progress.step(format!("Removing role {role} from instance profile {profile}"));
        cloud.remove_role_from_instance_profile(role, profile).await?;
    }

    progress.step(format!("Deleting role {role}"));
    deleted(cloud.delete_role(role).await)
}
