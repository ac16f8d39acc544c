//! API Gateway REST API listing and deletion

use crate::aws::clients::{AwsClients, to_utc_or_epoch};
use crate::aws::error::sdk_error;
use anyhow::{Context, Result};
use cloudsweep_common::defaults::REST_API_PAGE_SIZE;
use cloudsweep_common::{Page, RestApi};
use tracing::debug;

/// Trait for API Gateway operations.
///
/// `DeleteRestApi` is limited to one call every 30 seconds per account, so
/// callers wrap [`RestApiOperations::delete_rest_api`] in the retry policy.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait RestApiOperations: Send + Sync {
    /// List one page of REST APIs
    async fn list_rest_apis(&self, position: Option<String>) -> Result<Page<RestApi>>;

    /// Delete a REST API by id (a single attempt; the SDK client does not retry)
    async fn delete_rest_api(&self, id: &str) -> Result<()>;
}

impl RestApiOperations for AwsClients {
    async fn list_rest_apis(&self, position: Option<String>) -> Result<Page<RestApi>> {
        let response = self
            .apigateway
            .get_rest_apis()
            .set_position(position)
            .limit(REST_API_PAGE_SIZE)
            .send()
            .await
            .map_err(sdk_error)
            .context("Failed to list REST APIs")?;

        let apis = response
            .items()
            .iter()
            .filter_map(|api| {
                let id = api.id()?.to_string();
                Some(RestApi {
                    name: api.name().unwrap_or(&id).to_string(),
                    created_at: to_utc_or_epoch(api.created_date()),
                    id,
                })
            })
            .collect();

        Ok(Page::new(apis, response.position().map(str::to_string)))
    }

    async fn delete_rest_api(&self, id: &str) -> Result<()> {
        debug!(rest_api_id = %id, "Deleting REST API");
        self.apigateway
            .delete_rest_api()
            .rest_api_id(id)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to delete REST API {id}"))?;
        Ok(())
    }
}
