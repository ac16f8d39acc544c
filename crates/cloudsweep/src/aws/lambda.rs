//! Lambda function listing and deletion

use crate::aws::clients::AwsClients;
use crate::aws::error::sdk_error;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cloudsweep_common::defaults::FUNCTION_PAGE_SIZE;
use cloudsweep_common::{Function, Page};
use tracing::debug;

/// Lambda's `LastModified` format, e.g. `2024-03-01T12:00:00.000+0000`
const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Trait for Lambda operations.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait FunctionOperations: Send + Sync {
    /// List one page of functions
    async fn list_functions(&self, marker: Option<String>) -> Result<Page<Function>>;

    /// Delete a function by name
    async fn delete_function(&self, name: &str) -> Result<()>;
}

impl FunctionOperations for AwsClients {
    async fn list_functions(&self, marker: Option<String>) -> Result<Page<Function>> {
        let response = self
            .lambda
            .list_functions()
            .set_marker(marker)
            .max_items(FUNCTION_PAGE_SIZE)
            .send()
            .await
            .map_err(sdk_error)
            .context("Failed to list Lambda functions")?;

        let functions = response
            .functions()
            .iter()
            .filter_map(|f| {
                Some(Function {
                    name: f.function_name()?.to_string(),
                    runtime: f.runtime().map(|r| r.as_str().to_string()),
                    last_modified: parse_last_modified(f.last_modified()),
                })
            })
            .collect();

        Ok(Page::new(functions, response.next_marker().map(str::to_string)))
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        debug!(function = %name, "Deleting Lambda function");
        self.lambda
            .delete_function()
            .function_name(name)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to delete Lambda function {name}"))?;
        Ok(())
    }
}

/// Parse Lambda's string timestamp, falling back to the epoch
fn parse_last_modified(value: Option<&str>) -> DateTime<Utc> {
    value
        .and_then(|s| DateTime::parse_from_str(s, LAST_MODIFIED_FORMAT).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_modified() {
        let dt = parse_last_modified(Some("2024-03-01T12:30:45.123+0000"));
        assert_eq!(dt.to_rfc3339(), "2024-03-01T12:30:45.123+00:00");

        let offset = parse_last_modified(Some("2024-03-01T14:30:45.000+0200"));
        assert_eq!(offset.to_rfc3339(), "2024-03-01T12:30:45+00:00");
    }

    #[test]
    fn test_parse_last_modified_fallback() {
        assert_eq!(parse_last_modified(None).timestamp(), 0);
        assert_eq!(parse_last_modified(Some("yesterday")).timestamp(), 0);
    }
}
