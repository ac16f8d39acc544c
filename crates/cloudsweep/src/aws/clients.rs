//! Service clients used by discovery and deletion
//!
//! `AwsClients` owns one SDK client per service, all built from the same
//! [`AwsContext`]. The per-service adapters (`lambda.rs`, `s3.rs`, ...)
//! implement the operation traits on it.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::sdk_error;
use anyhow::{Context, Result};
use aws_sdk_apigateway::config::retry::RetryConfig;
use aws_config::{Region, SdkConfig};
use aws_sdk_s3::primitives::DateTime as SmithyDateTime;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Region S3 reports as an empty location constraint
const S3_DEFAULT_REGION: &str = "us-east-1";

/// SDK clients for every service cloudsweep touches
#[derive(Clone)]
pub struct AwsClients {
    pub(crate) lambda: aws_sdk_lambda::Client,
    pub(crate) logs: aws_sdk_cloudwatchlogs::Client,
    pub(crate) apigateway: aws_sdk_apigateway::Client,
    pub(crate) s3: aws_sdk_s3::Client,
    pub(crate) cloudfront: aws_sdk_cloudfront::Client,
    pub(crate) iam: aws_sdk_iam::Client,
    sdk_config: Arc<SdkConfig>,
    /// S3 client per bucket, pointed at the bucket's region
    bucket_clients: Arc<Mutex<HashMap<String, aws_sdk_s3::Client>>>,
}

impl FromAwsContext for AwsClients {
    fn from_context(ctx: &AwsContext) -> Self {
        Self::from_sdk_config(ctx.sdk_config())
    }
}

impl AwsClients {
    pub(crate) fn from_sdk_config(config: &SdkConfig) -> Self {
        // Standard SDK retry counts TooManyRequestsException as throttling;
        // REST API deletes are retried by RetryPolicy alone.
        let apigateway_config = aws_sdk_apigateway::config::Builder::from(config)
            .retry_config(RetryConfig::disabled())
            .build();

        Self {
            lambda: aws_sdk_lambda::Client::new(config),
            logs: aws_sdk_cloudwatchlogs::Client::new(config),
            apigateway: aws_sdk_apigateway::Client::from_conf(apigateway_config),
            s3: aws_sdk_s3::Client::new(config),
            cloudfront: aws_sdk_cloudfront::Client::new(config),
            iam: aws_sdk_iam::Client::new(config),
            sdk_config: Arc::new(config.clone()),
            bucket_clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// S3 client for the region a bucket lives in.
    ///
    /// `ListBuckets` is global but object and bucket calls must go to the
    /// bucket's own region. The location is looked up once per bucket.
    pub(crate) async fn s3_for_bucket(&self, bucket: &str) -> Result<aws_sdk_s3::Client> {
        if let Some(client) = self.cached_bucket_client(bucket)? {
            return Ok(client);
        }

        let location = self
            .s3
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(sdk_error)
            .with_context(|| format!("Failed to get location of bucket {bucket}"))?;

        let region = bucket_region(
            location
                .location_constraint()
                .map(|constraint| constraint.as_str()),
        );

        let client = if self.sdk_config.region().map(|r| r.as_ref()) == Some(region.as_str()) {
            self.s3.clone()
        } else {
            debug!(bucket, region = %region, "Using S3 client for bucket region");
            let config = aws_sdk_s3::config::Builder::from(self.sdk_config.as_ref())
                .region(Region::new(region))
                .build();
            aws_sdk_s3::Client::from_conf(config)
        };

        self.bucket_clients
            .lock()
            .map_err(|_| anyhow::anyhow!("S3 client cache lock poisoned"))?
            .insert(bucket.to_string(), client.clone());
        Ok(client)
    }

    fn cached_bucket_client(&self, bucket: &str) -> Result<Option<aws_sdk_s3::Client>> {
        let cache = self
            .bucket_clients
            .lock()
            .map_err(|_| anyhow::anyhow!("S3 client cache lock poisoned"))?;
        Ok(cache.get(bucket).cloned())
    }
}

/// Map a `GetBucketLocation` constraint to a region name
fn bucket_region(constraint: Option<&str>) -> String {
    match constraint {
        None | Some("") => S3_DEFAULT_REGION.to_string(),
        // Legacy alias returned for old eu-west-1 buckets
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

/// Convert an SDK timestamp to chrono
pub(crate) fn to_utc(dt: &SmithyDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()).unwrap_or_default()
}

/// Convert an optional SDK timestamp, falling back to the epoch
pub(crate) fn to_utc_or_epoch(dt: Option<&SmithyDateTime>) -> DateTime<Utc> {
    dt.map(to_utc).unwrap_or_default()
}

/// Convert epoch milliseconds (CloudWatch Logs), falling back to the epoch
pub(crate) fn millis_to_utc(millis: Option<i64>) -> DateTime<Utc> {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
