//! Printing documents and getting them out of the way.
//!
//! A [`Dispatcher`] takes one document through the whole job: decide the copy
//! count, hand it to the print engine, move it into the destination folder.
//! [`dispatch_folder`] and [`run_once`] drive it over a folder, one file at a
//! time.

mod batch;
mod configuration;
mod dispatch;
pub mod error;
pub mod relocate;
#[cfg(all(test, unix))]
mod testing;

pub use crate::batch::{BatchEvent, dispatch_folder, dispatch_folder_stream, run_once};
pub use crate::configuration::{DEFAULT_PRINTED_FOLDER, PrintConfiguration};
pub use crate::dispatch::{DispatchOutcome, Dispatcher, Summary};
pub use crate::relocate::{OnConflict, relocate};
