//! Loading records into the table store

pub mod clear;
pub mod mode;
pub mod orchestrator;
pub mod report;

pub use clear::{DELETE_CONFIRMATION, clear_table};
pub use mode::UploadMode;
pub use orchestrator::{UploadOptions, Uploader};
pub use report::{FailureKind, FailureRecord, UploadReport};
