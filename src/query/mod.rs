//! Query feature translation.
//!
//! Turns a REST query string into the primitives a document query layer
//! consumes:
//! - filter predicates with `$`-prefixed comparison operators
//! - sort keys (`-price name`)
//! - field projection (`-__v` by default)
//! - pagination metadata for adjacent pages

pub mod features;
pub mod map;
pub mod operator;
pub mod pagination;
pub mod sort;

pub use features::{ApiFeatures, FilterSpec, DEFAULT_EXCLUDED_FIELDS, DEFAULT_SORT};
pub use map::QueryMap;
pub use operator::Operator;
pub use pagination::{PageRef, PageRequest, Pagination};
pub use sort::{Projection, SortDirection, SortField, SortSpec};
