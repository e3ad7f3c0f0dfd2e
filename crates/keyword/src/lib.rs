//! Keyword-triggered copy counts.
//!
//! A [`KeywordTrigger`] says "when `keyword` occurs exactly `trigger_count`
//! times in a document, print `override_copies` copies instead". Counting is
//! delegated to an external helper through [`KeywordCounter`]; deciding what
//! the count means is [`resolve_copies`].

mod counter;
pub mod error;
mod policy;

pub use crate::counter::KeywordCounter;
pub use crate::policy::{KeywordTrigger, Occurrences, resolve_copies};
