//! File I/O for autosave records.
//!
//! This module handles:
//! - Writing record contents with atomic writes
//! - Reading a record back into a buffer
//! - Deleting superseded records

mod save;

pub use save::{read_record, remove_record, write_record, write_record_async};
