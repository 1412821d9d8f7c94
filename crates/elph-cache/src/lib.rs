//! Line-oriented edge cache for the elph project dependency catalog.
//!
//! The cache stores dependency edges discovered by an expensive build-tool
//! query so that later runs can skip the query. The format is deliberately
//! plain: one `source -> target` line per edge, no header.
//!
//! - [`codec`]: encode/decode single records
//! - [`reader`] / [`writer`]: buffered async line I/O
//! - [`atomic`]: crash-safe full rewrite
//! - [`freshness`]: timestamp-based staleness check
//! - [`warning`]: non-fatal problems collected while reading

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod codec;
pub mod error;
pub mod freshness;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::write_edges_atomic;
pub use codec::{format_edges, parse_line, EdgeRecord, ParseError};
pub use error::{Error, Result};
pub use freshness::{check_freshness, Freshness};
pub use reader::{read_edges_resilient, EdgeReader};
pub use warning::Warning;
pub use writer::EdgeWriter;
