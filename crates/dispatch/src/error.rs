//! Dispatch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! None of these escape [`Dispatcher::dispatch`](crate::Dispatcher::dispatch);
//! they end up as the reason inside [`DispatchOutcome::Failed`](crate::DispatchOutcome::Failed).

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A dispatch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a dispatch failure.
///
/// ### Operational Errors
/// - [`ErrorKind::AlreadyExists`]
/// - [`ErrorKind::Conflict`]
/// - [`ErrorKind::FolderNotFound`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Print`] - the engine could not be run.
/// - [`ErrorKind::Relocate`] - the document printed but could not be moved.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("printing failed: {_0}")]
    Print(#[error(not(source))] String),
    #[display("moving printed file failed: {_0}")]
    Relocate(#[error(not(source))] String),
    /// A file of the same name is already in the destination folder.
    #[display("file already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// No free name could be found for a renamed copy.
    #[display("no free file name for {} in destination", _0.display())]
    Conflict(#[error(not(source))] PathBuf),
    #[display("folder not found: {}", _0.display())]
    FolderNotFound(#[error(not(source))] PathBuf),
    /// Path has no file name component (`..`, `/`).
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
