use crate::relocate::OnConflict;
use spool_engine::PrintOptions;
use spool_keyword::KeywordTrigger;
use std::path::{Path, PathBuf};

/// Name of the folder printed files are moved into when no output folder is
/// configured, created next to each source file.
pub const DEFAULT_PRINTED_FOLDER: &str = "printed";

/// Everything a dispatch needs to know, fixed at start-up.
///
/// Built once from the command line and shared (behind an `Arc`) by every
/// timer tick and watcher event, so later runs always see the same values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintConfiguration {
    /// A single document to print.
    pub document: Option<PathBuf>,
    /// A folder of documents to print (and to watch).
    pub folder: Option<PathBuf>,
    /// Only files with this extension are picked up from `folder`.
    pub extension: String,
    /// Requested copies; values below one print a single copy.
    pub copies: u32,
    pub print: PrintOptions,
    /// Where printed files go. `None` means a [`DEFAULT_PRINTED_FOLDER`]
    /// beside each source file.
    pub output: Option<PathBuf>,
    pub trigger: Option<KeywordTrigger>,
    pub on_conflict: OnConflict,
}
impl Default for PrintConfiguration {
    fn default() -> Self {
        Self {
            document: None,
            folder: None,
            extension: "pdf".to_string(),
            copies: 1,
            print: PrintOptions::default(),
            output: None,
            trigger: None,
            on_conflict: OnConflict::default(),
        }
    }
}
impl PrintConfiguration {
    /// Folder that `source` is moved into once printed.
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        match self.output.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            Some(output) => output.clone(),
            None => source.parent().unwrap_or_else(|| Path::new("")).join(DEFAULT_PRINTED_FOLDER),
        }
    }

    /// Case-insensitive extension match; a leading dot in the filter is ignored.
    pub fn matches_extension(&self, path: &Path) -> bool {
        let wanted = self.extension.trim_start_matches('.');
        path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
    }
}
