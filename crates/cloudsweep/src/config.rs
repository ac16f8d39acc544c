//! Configuration types for a sweep

use cloudsweep_common::ResourceKind;
use std::collections::BTreeSet;
use tracing::warn;

/// AWS connection settings
#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    /// AWS region (falls back to the provider chain when unset)
    pub region: Option<String>,
    /// AWS profile name (overrides default credential resolution)
    pub profile: Option<String>,
}

/// Which resource kinds to discover
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Kinds to list, in kind order, without duplicates
    pub kinds: Vec<ResourceKind>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            kinds: ResourceKind::ALL.to_vec(),
        }
    }
}

/// Output format of the scan command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Runtime behavior flags
#[derive(Debug, Clone, Default)]
pub struct RuntimeFlags {
    /// Skip the confirmation prompt and select everything discovered
    pub yes: bool,
    /// Log progress lines instead of drawing spinners
    pub plain: bool,
}

/// Configuration for one invocation
///
/// Composed of focused sub-configs, built from the command line in `main`.
#[derive(Debug, Clone, Default)]
pub struct SweepConfig {
    pub aws: AwsConfig,
    pub selection: SelectionConfig,
    pub flags: RuntimeFlags,
}

impl SweepConfig {
    pub fn region(&self) -> Option<&str> {
        self.aws.region.as_deref()
    }
    pub fn profile(&self) -> Option<&str> {
        self.aws.profile.as_deref()
    }
    pub fn kinds(&self) -> &[ResourceKind] {
        &self.selection.kinds
    }
}

/// Parse a comma-separated list of kind ids.
///
/// Unknown ids are logged and skipped. A missing or blank list means every
/// kind; a list where nothing was recognised yields no kinds.
pub fn parse_kinds(value: Option<&str>) -> Vec<ResourceKind> {
    let value = value.unwrap_or_default();
    if value.split(',').all(|id| id.trim().is_empty()) {
        return ResourceKind::ALL.to_vec();
    }

    let mut kinds = BTreeSet::new();
    for id in value.split(',') {
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        match id.parse::<ResourceKind>() {
            Ok(kind) => {
                kinds.insert(kind);
            }
            Err(e) => warn!("{e}, skipping"),
        }
    }

    kinds.into_iter().collect()
}
