//! cloudsweep - find and delete AWS resources left behind by a failed deployment
//!
//! Discovery lists Lambda functions, log groups, REST APIs, S3 buckets,
//! CloudFront distributions and IAM roles into a [`catalog::Catalog`]. The
//! operator's selection becomes one [`tasks::DeletionTask`] per kind, each
//! running that kind's deletion protocol and reporting progress as it goes.

pub mod aws;
pub mod catalog;
pub mod config;
pub mod tasks;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;
