//! cloudsweep-common - Shared types and utilities
//!
//! This crate holds the resource model shared by the listers, the catalog
//! and the deletion tasks, without any AWS SDK dependencies to keep it
//! lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Page sizes, retry policy and reserved role prefixes
//! - [`pagination`]: Generic drain for cursor-paginated listings
//! - [`records`]: Read-only snapshots of discovered resources
//! - [`resource_kind`]: The closed set of resource kinds

pub mod defaults;
pub mod pagination;
pub mod records;
pub mod resource_kind;

// Re-export commonly used types
pub use pagination::{Page, PageItem, drain_pages};
pub use records::{
    AttachedPolicy, Bucket, Distribution, Function, LogGroup, Resource, RestApi, Role,
    sort_newest_first,
};
pub use resource_kind::{ResourceKind, UnknownResourceKind};
