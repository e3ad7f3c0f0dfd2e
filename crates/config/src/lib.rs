//! Settings that don't belong on the command line.
//!
//! [`Settings::load`] layers, lowest priority first: built-in defaults, the
//! legacy `config.cfg` next to the executable, `spool.toml` in the user's
//! configuration directory, an explicit `--config` file, and finally
//! `SPOOL_*` environment variables.

pub mod error;
mod legacy;
mod settings;

pub use crate::legacy::{LEGACY_FILE, LegacyConfig};
pub use crate::settings::{DEFAULT_COUNTER_SCRIPT, ENV_PREFIX, Settings, Sources, executable_dir};
