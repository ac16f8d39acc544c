//! Interactive selection and confirmation

use crate::catalog::{Catalog, Selection};
use crate::tasks::DeletionTask;
use anyhow::{Context, Result};
use cloudsweep_common::Resource;
use dialoguer::{Confirm, MultiSelect};
use std::collections::BTreeMap;

/// Ask, kind by kind, which discovered resources to delete.
///
/// Kinds with nothing discovered are not prompted for. Nothing is
/// preselected.
pub fn select_resources(catalog: &Catalog) -> Result<Selection> {
    let mut picks = BTreeMap::new();

    for (kind, resources) in catalog.iter() {
        if resources.is_empty() {
            continue;
        }
        let labels: Vec<String> = resources.iter().map(Resource::label).collect();
        let chosen = MultiSelect::new()
            .with_prompt(format!(
                "Select {} to delete ({} found, space to toggle, enter to continue)",
                kind.plural_label(),
                resources.len()
            ))
            .items(&labels)
            .interact()
            .with_context(|| format!("Failed to read selection of {}", kind.plural_label()))?;
        if !chosen.is_empty() {
            picks.insert(kind, chosen);
        }
    }

    Ok(catalog.select(&picks))
}

/// Text of the final confirmation prompt
pub fn confirmation_prompt(tasks: &[DeletionTask]) -> String {
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    format!("{}. This cannot be undone. Continue?", titles.join(", "))
}

/// Last chance to back out; defaults to no
pub fn confirm_deletion(tasks: &[DeletionTask]) -> Result<bool> {
    Confirm::new()
        .with_prompt(confirmation_prompt(tasks))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
