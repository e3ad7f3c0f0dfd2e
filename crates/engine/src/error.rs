//! Engine Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A print engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for print engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The engine binary is not where it was discovered (or configured) to be.
    #[display("print engine not found: {}", _0.display())]
    EngineNotFound(#[error(not(source))] PathBuf),
    /// The engine could not be launched, or did not exit within its limits.
    #[display("print engine could not be run: {_0}")]
    Process(#[error(not(source))] String),
}
