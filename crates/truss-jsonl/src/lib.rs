//! JSONL (JSON Lines) reading and writing for truss.
//!
//! This crate provides buffered async reading and writing of JSONL data,
//! resilient loading that collects per-line warnings instead of aborting,
//! and crash-safe atomic file replacement.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::{JsonlReader, read_jsonl_resilient};
pub use warning::{Warning, WarningCollector};
pub use writer::JsonlWriter;
