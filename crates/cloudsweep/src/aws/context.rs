//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating every service client from the same config, and for checking
//! whose credentials that config carries before anything is touched.

use crate::aws::error::sdk_error;
use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;
use tracing::info;

/// Account and principal the loaded credentials belong to
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("account {account} as {arn}")]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
}

impl CallerIdentity {
    fn from_sts(account: Option<&str>, arn: Option<&str>) -> Result<Self> {
        let account = account
            .filter(|a| !a.is_empty())
            .context("STS GetCallerIdentity returned no account id")?;
        Ok(Self {
            account: account.to_string(),
            arn: arn.unwrap_or("unknown principal").to_string(),
        })
    }
}

/// Shared AWS configuration context for creating service clients.
///
/// Credentials and region come from the standard provider chain
/// (environment, shared config files, SSO, instance metadata). An explicit
/// region or profile from the command line takes precedence.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::load(Some("eu-west-1"), None).await;
/// let clients = AwsClients::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
}

impl AwsContext {
    /// Load AWS configuration, optionally pinning the region and profile.
    pub async fn load(region: Option<&str>, profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            config: Arc::new(config),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Region the provider chain resolved to, if any.
    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }

    /// Ask STS who the credentials belong to.
    ///
    /// `GetCallerIdentity` needs no IAM permissions, so an error here means
    /// the credentials are missing, expired or invalid.
    pub async fn caller_identity(&self) -> Result<CallerIdentity> {
        let response = aws_sdk_sts::Client::new(&self.config)
            .get_caller_identity()
            .send()
            .await
            .map_err(sdk_error)
            .context("Failed to resolve AWS credentials")?;

        let identity = CallerIdentity::from_sts(response.account(), response.arn())?;
        info!(account = %identity.account, arn = %identity.arn, "Resolved caller identity");
        Ok(identity)
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region())
            .finish_non_exhaustive()
    }
}

/// Construct a client wrapper from a loaded [`AwsContext`].
pub trait FromAwsContext {
    fn from_context(ctx: &AwsContext) -> Self;
}
