//! Core types for loaded data

mod record;
mod value;

pub use record::*;
pub use value::*;
