//! Keyword Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Only [`ErrorKind::FieldCount`], [`ErrorKind::EmptyKeyword`] and
//! [`ErrorKind::InvalidNumber`] ever leave this crate (from parsing a
//! [`KeywordTrigger`](crate::KeywordTrigger)). Counter failures are logged and
//! degrade to [`Occurrences::Unavailable`](crate::Occurrences::Unavailable).

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A keyword error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for keyword operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The trigger specification did not split into `keyword,trigger,copies`.
    #[display("keyword search needs exactly 3 comma-separated fields (keyword,trigger,copies), got {_0}")]
    FieldCount(#[error(not(source))] usize),
    #[display("keyword search keyword must not be empty")]
    EmptyKeyword,
    #[display("keyword search {field} is not a valid number: `{value}`")]
    InvalidNumber { field: &'static str, value: String },
    /// No interpreter configured for the counter script.
    #[display("no interpreter configured for the keyword counter")]
    NoInterpreter,
    #[display("keyword counter script not found: {}", _0.display())]
    ScriptNotFound(#[error(not(source))] PathBuf),
    /// Launching or waiting on the counter process failed.
    #[display("keyword counter process failed")]
    Process,
    /// The counter exited but did not print a single integer.
    #[display("keyword counter output is not an integer: `{_0}`")]
    Unparsable(#[error(not(source))] String),
}
