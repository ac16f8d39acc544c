//! Terminal interaction: selection prompts, progress spinners and tables

pub mod render;
pub mod select;
pub mod table;

pub use render::{discovery_spinner, print_summary, render_progress};
pub use select::{confirm_deletion, select_resources};
pub use table::{print_catalog, truncate};
