//! The external print engine.
//!
//! Documents are printed by a SumatraPDF-compatible program driven entirely
//! from its command line. This crate finds that program ([`PrintEngine::discover`]),
//! builds its arguments ([`PrintArgs`]), and runs it ([`PrintEngine::print`]).

mod args;
mod engine;
pub mod error;

pub use crate::args::{PrintArgs, PrintOptions};
pub use crate::engine::PrintEngine;
