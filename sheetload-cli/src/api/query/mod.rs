//! Query filters
//!
//! The table store API requires a filter on every delete; this module holds
//! the filter model and its PostgREST rendering.

pub mod filters;

pub use filters::Filter;
