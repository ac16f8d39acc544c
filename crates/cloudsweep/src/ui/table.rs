//! Catalog output for the scan command

use crate::catalog::Catalog;
use crate::config::OutputFormat;
use anyhow::Result;
use cloudsweep_common::Resource;

/// Shorten `s` to at most `max` characters, marking the cut with "..."
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    format!("{}...", s.chars().take(keep).collect::<String>())
}

fn details(resource: &Resource) -> String {
    match resource {
        Resource::Function(f) => f.runtime.clone().unwrap_or_default(),
        Resource::LogGroup(g) => g
            .stored_bytes
            .map(|b| format!("{b} bytes"))
            .unwrap_or_default(),
        Resource::RestApi(a) => a.name.clone(),
        Resource::Bucket(_) => String::new(),
        Resource::Distribution(d) => format!(
            "{} {} {}",
            if d.enabled { "enabled" } else { "disabled" },
            d.status,
            d.domain_name
        ),
        Resource::Role(r) => r.path.clone(),
    }
}

/// Render the catalog as a fixed-width table
pub fn format_table(catalog: &Catalog) -> String {
    let mut out = format!(
        "{:<14} {:<48} {:<20} {}\n",
        "KIND", "ID", "TIMESTAMP", "DETAILS"
    );
    out.push_str(&"-".repeat(100));
    out.push('\n');
    for (_, resources) in catalog.iter() {
        for r in resources {
            out.push_str(&format!(
                "{:<14} {:<48} {:<20} {}\n",
                r.kind().as_str(),
                truncate(r.key(), 48),
                r.timestamp().format("%Y-%m-%d %H:%M:%S"),
                details(r),
            ));
        }
    }
    out.push_str(&format!("\nTotal: {} resources", catalog.total()));
    out
}

/// Print the catalog in the requested format
pub fn print_catalog(catalog: &Catalog, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog)?),
        OutputFormat::Table if catalog.is_empty() => println!("No resources found."),
        OutputFormat::Table => println!("{}", format_table(catalog)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("a-much-longer-name", 10), "a-much-...");
    }

    #[test]
    fn test_empty_table_has_header_and_total() {
        let table = format_table(&Catalog::default());
        assert!(table.starts_with("KIND"));
        assert!(table.ends_with("Total: 0 resources"));
    }
}
