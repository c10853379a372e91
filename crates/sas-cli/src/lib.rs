//! Terminal host components for the smart autosave engine.

#![allow(missing_docs)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod listing;
pub mod logging;
pub mod scratch;
