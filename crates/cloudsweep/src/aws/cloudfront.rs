//! CloudFront distribution listing, disabling and deletion
//!
//! A distribution can only be deleted once it is disabled and the disable
//! has finished deploying, which takes many minutes. Deletion therefore
//! spans two runs: the first disables, a later one deletes.

use crate::aws::clients::{AwsClients, to_utc};
use crate::aws::error::sdk_error;
use anyhow::{Context, Result};
use aws_sdk_cloudfront::types::DistributionConfig;
use cloudsweep_common::{Distribution, Page};
use tracing::debug;

/// Current configuration of a distribution with the ETag needed to change it
#[derive(Debug, Clone)]
pub struct DistributionConfigSnapshot {
    /// Version identifier passed as `If-Match` to update and delete
    pub etag: String,
    pub enabled: bool,
    /// Full config, sent back with `enabled = false` to disable
    pub config: Option<DistributionConfig>,
}

/// Trait for CloudFront operations.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait DistributionOperations: Send + Sync {
    /// List one page of distributions
    async fn list_distributions(&self, marker: Option<String>) -> Result<Page<Distribution>>;

    /// Fetch the current config and ETag of a distribution
    async fn get_distribution_config(&self, id: &str) -> Result<DistributionConfigSnapshot>;

    /// Send the config back with `enabled = false`
    async fn disable_distribution(
        &self,
        id: &str,
        snapshot: DistributionConfigSnapshot,
    ) -> Result<()>;

    /// Delete a disabled distribution at the given ETag
    async fn delete_distribution(&self, id: &str, etag: &str) -> Result<()>;
}

impl DistributionOperations for AwsClients {
    async fn list_distributions(&self, marker: Option<String>) -> Result<Page<Distribution>> {
        let response = self
            .cloudfront
            .list_distributions()
            .set_marker(marker)
            .send()
            .await
            .map_err(sdk_error)
            .context("Failed to list CloudFront distributions")?;

        let Some(list) = response.distribution_list() else {
            return Ok(Page::last(Vec::new()));
        };

        let distributions = list
            .items()
            .iter()
            .map(|d| Distribution {
                id: d.id().to_string(),
                domain_name: d.domain_name().to_string(),
                comment: d.comment().to_string(),
                enabled: d.enabled(),
                status: d.status().to_string(),
                last_modified: to_utc(d.last_modified_time()),
            })
            .collect();

        Ok(Page::truncated(
            distributions,
            list.is_truncated(),
            list.next_marker(),
        ))
    }

    async fn get_distribution_config(&self, id: &str) -> Result<DistributionConfigSnapshot> {
        let response = self
            .cloudfront
            .get_distribution_config()
            .id(id)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to get config of distribution {id}"))?;

        let etag = response
            .e_tag()
            .with_context(|| format!("No ETag returned for distribution {id}"))?
            .to_string();
        let config = response.distribution_config().cloned();

        Ok(DistributionConfigSnapshot {
            etag,
            enabled: config.as_ref().is_some_and(|c| c.enabled()),
            config,
        })
    }

    async fn disable_distribution(&self, id: &str, snapshot: DistributionConfigSnapshot) -> Result<()> {
        debug!(distribution = %id, "Disabling distribution");
        let mut config = snapshot
            .config
            .with_context(|| format!("No config returned for distribution {id}"))?;
        config.enabled = false;

        self.cloudfront
            .update_distribution()
            .id(id)
            .if_match(snapshot.etag)
            .distribution_config(config)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to disable distribution {id}"))?;
        Ok(())
    }

    async fn delete_distribution(&self, id: &str, etag: &str) -> Result<()> {
        debug!(distribution = %id, "Deleting distribution");
        self.cloudfront
            .delete_distribution()
            .id(id)
            .if_match(etag)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to delete distribution {id}"))?;
        Ok(())
    }
}
