//! Moving printed documents out of the way.
//!
//! Once the engine has the document, the source file is moved into the
//! destination folder under its original name so the next batch doesn't print
//! it again. When that name is already taken, the configured [`OnConflict`]
//! policy decides what happens.

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;

/// Maximum numbered alternatives tried by [`OnConflict::Rename`] before
/// bailing with [`ErrorKind::Conflict`].
const MAX_RENAME_ATTEMPTS: usize = 100;

/// What to do when the destination already holds a file of the same name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnConflict {
    /// Leave both files alone and report the dispatch as failed.
    Fail,
    /// Replace the previously printed file.
    Overwrite,
    /// Keep both: `report.pdf` becomes `report (1).pdf`, `report (2).pdf`, ...
    #[default]
    Rename,
}
impl FromStr for OnConflict {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "overwrite" => Ok(Self::Overwrite),
            "rename" => Ok(Self::Rename),
            _ => Err(format!("unknown conflict policy `{s}` (expected fail, overwrite or rename)")),
        }
    }
}

/// Moves `source` into the `destination` folder (created if missing) and
/// returns its new path.
pub async fn relocate(source: &Path, destination: &Path, on_conflict: OnConflict) -> Result<PathBuf> {
    let name = source.file_name().ok_or_raise(|| ErrorKind::InvalidPath(source.to_path_buf()))?;
    fs::create_dir_all(destination).await.map_err(|e| map_io_error(e, destination))?;
    let mut target = destination.join(name);
    if fs::try_exists(&target).await.map_err(ErrorKind::Io)? {
        target = match on_conflict {
            OnConflict::Fail => exn::bail!(ErrorKind::AlreadyExists(target)),
            OnConflict::Overwrite => {
                tracing::warn!(path = %target.display(), "Replacing previously printed file");
                target
            },
            OnConflict::Rename => free_name(destination, source).await?,
        };
    }
    move_file(source, &target).await?;
    tracing::debug!(from = %source.display(), to = %target.display(), "Printed file relocated");
    Ok(target)
}

/// First `<stem> (<n>)<.ext>` in `destination` that doesn't exist yet.
async fn free_name(destination: &Path, source: &Path) -> Result<PathBuf> {
    let stem = source.file_stem().unwrap_or_default();
    let extension = source.extension();
    for n in 1..=MAX_RENAME_ATTEMPTS {
        let mut name = OsString::from(stem);
        name.push(format!(" ({n})"));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let candidate = destination.join(name);
        if !fs::try_exists(&candidate).await.map_err(ErrorKind::Io)? {
            return Ok(candidate);
        }
    }
    exn::bail!(ErrorKind::Conflict(destination.join(source.file_name().unwrap_or_default())));
}

async fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        // Output folders on another drive/mount can't be renamed into.
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            fs::copy(from, to).await.map_err(|e| map_io_error(e, to))?;
            fs::remove_file(from).await.map_err(|e| map_io_error(e, from))?;
            Ok(())
        },
        Err(e) => Err(map_io_error(e, from).into()),
    }
}

fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        _ => ErrorKind::Io(e),
    }
}
