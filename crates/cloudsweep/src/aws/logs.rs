//! CloudWatch Logs log group listing and deletion

use crate::aws::clients::{AwsClients, millis_to_utc};
use crate::aws::error::sdk_error;
use anyhow::{Context, Result};
use cloudsweep_common::defaults::LOG_GROUP_PAGE_SIZE;
use cloudsweep_common::{LogGroup, Page};
use tracing::debug;

/// Trait for CloudWatch Logs operations.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait LogGroupOperations: Send + Sync {
    /// List one page of log groups
    async fn list_log_groups(&self, next_token: Option<String>) -> Result<Page<LogGroup>>;

    /// Delete a log group by name
    async fn delete_log_group(&self, name: &str) -> Result<()>;
}

impl LogGroupOperations for AwsClients {
    async fn list_log_groups(&self, next_token: Option<String>) -> Result<Page<LogGroup>> {
        let response = self
            .logs
            .describe_log_groups()
            .set_next_token(next_token)
            .limit(LOG_GROUP_PAGE_SIZE)
            .send()
            .await
            .map_err(sdk_error)
            .context("Failed to list log groups")?;

        let groups = response
            .log_groups()
            .iter()
            .filter_map(|g| {
                Some(LogGroup {
                    name: g.log_group_name()?.to_string(),
                    stored_bytes: g.stored_bytes(),
                    created_at: millis_to_utc(g.creation_time()),
                })
            })
            .collect();

        Ok(Page::new(groups, response.next_token().map(str::to_string)))
    }

    async fn delete_log_group(&self, name: &str) -> Result<()> {
        debug!(log_group = %name, "Deleting log group");
        self.logs
            .delete_log_group()
            .log_group_name(name)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to delete log group {name}"))?;
        Ok(())
    }
}
