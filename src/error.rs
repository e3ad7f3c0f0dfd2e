//! Start-up and front-end errors.
//!
//! Anything that goes wrong with a single document is a
//! [`DispatchOutcome`](spool_dispatch::DispatchOutcome), never one of these.

use derive_more::{Display, Error};
use std::path::PathBuf;
use std::process::ExitCode;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("keyword search parameters are not valid")]
    Trigger,
    #[display("configuration could not be loaded")]
    Config,
    #[display("could not watch folder {}", _0.display())]
    Watch(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Configuration problems exit with `2` (like a command-line usage
    /// error), anything that went wrong afterwards with `1`.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Trigger | Self::Config => ExitCode::from(2),
            Self::Watch(_) => ExitCode::FAILURE,
        }
    }
}
