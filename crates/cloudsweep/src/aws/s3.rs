//! S3 bucket and object listing and deletion

use crate::aws::clients::{AwsClients, to_utc_or_epoch};
use crate::aws::error::sdk_error;
use anyhow::{Context, Result, bail};
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use cloudsweep_common::defaults::BUCKET_PAGE_SIZE;
use cloudsweep_common::{Bucket, Page};
use tracing::debug;

/// One object version or delete marker
///
/// Unversioned buckets report every object with the version id `"null"`,
/// which deletes it just like a plain key would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedKey {
    pub key: String,
    pub version_id: Option<String>,
}

/// Where a `ListObjectVersions` listing resumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCursor {
    pub key_marker: String,
    pub version_id_marker: Option<String>,
}

/// One page of object versions and delete markers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionPage {
    pub versions: Vec<VersionedKey>,
    /// `None` once the listing is exhausted
    pub next: Option<VersionCursor>,
}

/// Trait for S3 operations.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait BucketOperations: Send + Sync {
    /// List one page of buckets owned by the account
    async fn list_buckets(&self, continuation_token: Option<String>) -> Result<Page<Bucket>>;

    /// List one page of object versions and delete markers in a bucket
    async fn list_object_versions(
        &self,
        bucket: &str,
        cursor: Option<VersionCursor>,
    ) -> Result<VersionPage>;

    /// Permanently delete a batch of object versions (at most 1000)
    async fn delete_objects(&self, bucket: &str, versions: Vec<VersionedKey>) -> Result<()>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
}

impl BucketOperations for AwsClients {
    async fn list_buckets(&self, continuation_token: Option<String>) -> Result<Page<Bucket>> {
        let response = self
            .s3
            .list_buckets()
            .set_continuation_token(continuation_token)
            .max_buckets(BUCKET_PAGE_SIZE)
            .send()
            .await
            .map_err(sdk_error)
            .context("Failed to list S3 buckets")?;

        let buckets = response
            .buckets()
            .iter()
            .filter_map(|b| {
                Some(Bucket {
                    name: b.name()?.to_string(),
                    created_at: to_utc_or_epoch(b.creation_date()),
                })
            })
            .collect();

        Ok(Page::new(
            buckets,
            response.continuation_token().map(str::to_string),
        ))
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        cursor: Option<VersionCursor>,
    ) -> Result<VersionPage> {
        let (key_marker, version_id_marker) = match cursor {
            Some(c) => (Some(c.key_marker), c.version_id_marker),
            None => (None, None),
        };

        let client = self.s3_for_bucket(bucket).await?;
        let response = client
            .list_object_versions()
            .bucket(bucket)
            .set_key_marker(key_marker)
            .set_version_id_marker(version_id_marker)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to list objects in bucket {bucket}"))?;

        let versions = response
            .versions()
            .iter()
            .filter_map(|v| Some((v.key()?, v.version_id())))
            .chain(
                response
                    .delete_markers()
                    .iter()
                    .filter_map(|m| Some((m.key()?, m.version_id()))),
            )
            .map(|(key, version_id)| VersionedKey {
                key: key.to_string(),
                version_id: version_id.map(str::to_string),
            })
            .collect();

        let next = match (response.is_truncated(), response.next_key_marker()) {
            (Some(true), Some(key)) if !key.is_empty() => Some(VersionCursor {
                key_marker: key.to_string(),
                version_id_marker: response.next_version_id_marker().map(str::to_string),
            }),
            _ => None,
        };

        Ok(VersionPage { versions, next })
    }

    async fn delete_objects(&self, bucket: &str, versions: Vec<VersionedKey>) -> Result<()> {
        if versions.is_empty() {
            return Ok(());
        }
        debug!(bucket = %bucket, count = versions.len(), "Deleting object versions");

        let objects = versions
            .into_iter()
            .map(|v| {
                ObjectIdentifier::builder()
                    .key(v.key)
                    .set_version_id(v.version_id)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to build object identifiers")?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .context("Failed to build delete request")?;

        let client = self.s3_for_bucket(bucket).await?;
        let response = client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to delete objects in bucket {bucket}"))?;

        // A 200 response can still carry per-key failures
        if let Some(first) = response.errors().first() {
            bail!(
                "Failed to delete {} object(s) in bucket {bucket}, first: {} ({}: {})",
                response.errors().len(),
                first.key().unwrap_or("?"),
                first.code().unwrap_or("unknown"),
                first.message().unwrap_or("no message"),
            );
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        debug!(bucket = %bucket, "Deleting bucket");
        let client = self.s3_for_bucket(bucket).await?;
        client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to delete bucket {bucket}"))?;
        Ok(())
    }
}
