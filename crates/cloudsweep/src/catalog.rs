//! Resource discovery
//!
//! One lister per resource kind drains the provider listing, wraps each
//! record in [`Resource`] and sorts newest first. The [`Catalog`] runs the
//! listers for the requested kinds concurrently and keeps the results per
//! kind, in kind order.

use crate::aws::{
    BucketOperations, CloudOperations, DistributionOperations, FunctionOperations,
    LogGroupOperations, RestApiOperations, RoleOperations,
};
use anyhow::{Context, Result};
use cloudsweep_common::defaults::is_reserved_role;
use cloudsweep_common::{Resource, ResourceKind, drain_pages, sort_newest_first};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Selected resources per kind, same shape as the catalog
pub type Selection = BTreeMap<ResourceKind, Vec<Resource>>;

fn newest_first(mut resources: Vec<Resource>) -> Vec<Resource> {
    sort_newest_first(&mut resources);
    resources
}

/// List every Lambda function
pub async fn list_functions<C: FunctionOperations>(cloud: &C) -> Result<Vec<Resource>> {
    let functions = drain_pages("Lambda functions", |marker| cloud.list_functions(marker)).await?;
    Ok(newest_first(
        functions.into_iter().map(Resource::Function).collect(),
    ))
}

/// List every CloudWatch log group
pub async fn list_log_groups<C: LogGroupOperations>(cloud: &C) -> Result<Vec<Resource>> {
    let groups = drain_pages("log groups", |token| cloud.list_log_groups(token)).await?;
    Ok(newest_first(groups.into_iter().map(Resource::LogGroup).collect()))
}

/// List every API Gateway REST API
pub async fn list_rest_apis<C: RestApiOperations>(cloud: &C) -> Result<Vec<Resource>> {
    let apis = drain_pages("REST APIs", |position| cloud.list_rest_apis(position)).await?;
    Ok(newest_first(apis.into_iter().map(Resource::RestApi).collect()))
}

/// List every S3 bucket
pub async fn list_buckets<C: BucketOperations>(cloud: &C) -> Result<Vec<Resource>> {
    let buckets = drain_pages("S3 buckets", |token| cloud.list_buckets(token)).await?;
    Ok(newest_first(buckets.into_iter().map(Resource::Bucket).collect()))
}

/// List every CloudFront distribution
pub async fn list_distributions<C: DistributionOperations>(cloud: &C) -> Result<Vec<Resource>> {
    let distributions =
        drain_pages("CloudFront distributions", |marker| cloud.list_distributions(marker)).await?;
    Ok(newest_first(
        distributions
            .into_iter()
            .map(Resource::Distribution)
            .collect(),
    ))
}

/// List IAM roles, leaving out roles managed by AWS itself
pub async fn list_roles<C: RoleOperations>(cloud: &C) -> Result<Vec<Resource>> {
    let roles = drain_pages("IAM roles", |marker| cloud.list_roles(marker)).await?;
    let total = roles.len();
    let roles: Vec<Resource> = roles
        .into_iter()
        .filter(|role| !is_reserved_role(&role.name))
        .map(Resource::Role)
        .collect();
    debug!(
        skipped = total - roles.len(),
        "Excluded AWS-managed roles from listing"
    );
    Ok(newest_first(roles))
}

/// Run the lister for one kind
pub async fn list_kind<C: CloudOperations>(cloud: &C, kind: ResourceKind) -> Result<Vec<Resource>> {
    match kind {
        ResourceKind::Function => list_functions(cloud).await,
        ResourceKind::LogGroup => list_log_groups(cloud).await,
        ResourceKind::RestApi => list_rest_apis(cloud).await,
        ResourceKind::Bucket => list_buckets(cloud).await,
        ResourceKind::Distribution => list_distributions(cloud).await,
        ResourceKind::Role => list_roles(cloud).await,
    }
}

/// Everything discovered in one session, per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<ResourceKind, Vec<Resource>>,
}

impl Catalog {
    /// List the given kinds concurrently.
    ///
    /// Fails as a whole if any lister fails, with the kind named in the
    /// error context. Requested kinds with nothing in them are kept as empty
    /// entries.
    pub async fn discover<C: CloudOperations>(cloud: &C, kinds: &[ResourceKind]) -> Result<Self> {
        let listings = try_join_all(kinds.iter().map(|&kind| async move {
            let resources = list_kind(cloud, kind)
                .await
                .with_context(|| format!("Failed to list {}", kind.plural_label()))?;
            info!(kind = %kind, count = resources.len(), "Discovered resources");
            Ok::<_, anyhow::Error>((kind, resources))
        }))
        .await?;

        Ok(Self {
            entries: listings.into_iter().collect(),
        })
    }

    /// Resources of one kind, newest first
    pub fn get(&self, kind: ResourceKind) -> &[Resource] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Kinds with their resources, in kind order
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &[Resource])> {
        self.entries
            .iter()
            .map(|(kind, resources)| (*kind, resources.as_slice()))
    }

    /// Total number of resources across all kinds
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Build a selection from per-kind indices into this catalog.
    ///
    /// Indices are applied in catalog order, so the selection stays newest
    /// first regardless of the order they were picked in. Out-of-range
    /// indices and kinds with no picks are ignored.
    pub fn select(&self, picks: &BTreeMap<ResourceKind, Vec<usize>>) -> Selection {
        let mut selection = Selection::new();
        for (kind, indices) in picks {
            let resources = self.get(*kind);
            let chosen: Vec<Resource> = resources
                .iter()
                .enumerate()
                .filter(|(i, _)| indices.contains(i))
                .map(|(_, r)| r.clone())
                .collect();
            if !chosen.is_empty() {
                selection.insert(*kind, chosen);
            }
        }
        selection
    }

    /// Select every discovered resource
    pub fn select_all(&self) -> Selection {
        self.entries
            .iter()
            .filter(|(_, resources)| !resources.is_empty())
            .map(|(kind, resources)| (*kind, resources.clone()))
            .collect()
    }
}
