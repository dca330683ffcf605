//! Loading and preparing spreadsheet data
//!
//! Data flows one way: source file -> [`Dataset`] -> [`clean`] -> batches of
//! JSON-safe records ready for the store.

pub mod batch;
pub mod clean;
pub mod inspect;
pub mod normalize;
pub mod reader;
pub mod types;

pub use batch::{
    DEFAULT_BATCH_SIZE, SerializeError, chunk_records, prepare_batch, probe_record, to_wire,
};
pub use clean::clean;
pub use inspect::{InspectionReport, inspect, preview};
pub use normalize::normalize;
pub use reader::read_dataset;
pub use types::*;
