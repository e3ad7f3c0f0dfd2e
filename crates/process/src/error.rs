//! Process Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::time::Duration;

/// A process error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for process operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The program could not be started at all (missing, not executable, ...).
    #[display("failed to launch `{_0}`")]
    Launch(#[error(not(source))] String),
    /// The program was still running when the time limit expired. It has been killed.
    #[display("process did not exit within {}s", _0.as_secs_f64())]
    Timeout(#[error(not(source))] Duration),
    /// Cancellation was requested. A program that had already started has been killed.
    #[display("process cancelled")]
    Cancelled,
    /// Waiting on the child, or reading its output, failed.
    #[display("I/O error while waiting for process")]
    Io,
}
