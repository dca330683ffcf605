//! Table write operations
//!
//! This module provides a unified description of the requests sent to the
//! table store, independent of the transport that executes them.

pub mod operation;

pub use operation::{Operation, Row, WriteMode};
