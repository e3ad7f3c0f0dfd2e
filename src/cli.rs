use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser};
use exn::ResultExt;
use spool_config::Settings;
use spool_dispatch::{OnConflict, PrintConfiguration};
use spool_engine::PrintOptions;
use spool_keyword::KeywordTrigger;
use std::path::PathBuf;

/// Send documents to a SumatraPDF-compatible print engine: once, on a timer,
/// or whenever a new one lands in a folder.
#[derive(Debug, Parser)]
#[command(name = "spool", version, about)]
pub struct Cli {
    /// Path to a single document to print.
    #[arg(short, long)]
    pub document: Option<PathBuf>,
    /// Folder containing documents to print.
    #[arg(short, long)]
    pub folder: Option<PathBuf>,
    /// Only print files from the folder with this extension.
    #[arg(short, long, default_value = "pdf")]
    pub extension: String,
    /// Printer name (default: the system default printer).
    #[arg(short, long)]
    pub printer: Option<String>,
    /// Number of copies; anything below 1 prints a single copy.
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub copies: i64,
    /// Paper size.
    #[arg(short = 'a', long = "size", default_value = "A4")]
    pub paper_size: String,
    /// Print in colour instead of black and white.
    #[arg(short = 'l', long)]
    pub color: bool,
    /// Seconds between repeated print jobs of the folder (0 disables).
    #[arg(short, long, default_value_t = 0)]
    pub timer: u64,
    /// Print new files as they appear in the folder.
    #[arg(short, long)]
    pub watcher: bool,
    /// Ask the print engine not to show any UI (`-s false` to show it).
    #[arg(
        short,
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        default_value_t = true,
        value_name = "BOOL"
    )]
    pub silent: bool,
    /// Folder printed files are moved to (default: a `printed` folder beside each file).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Print a different number of copies when a keyword occurs exactly N
    /// times: `<keyword>,<trigger>,<copies>`.
    #[arg(short, long = "keywordSearch", value_name = "KEYWORD,TRIGGER,COPIES")]
    pub keyword_search: Option<String>,
    /// Additional TOML settings file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// What to do when a printed file's name is already taken in the output
    /// folder: fail, overwrite or rename (overrides settings).
    #[arg(long, value_name = "POLICY")]
    pub on_conflict: Option<OnConflict>,
    /// More logging (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// The fixed configuration every dispatch of this run uses.
    ///
    /// # Errors
    /// [`ErrorKind::Trigger`] if `--keywordSearch` is malformed.
    pub fn configuration(&self, settings: &Settings) -> Result<PrintConfiguration> {
        let trigger = match self.keyword_search.as_deref().filter(|k| !k.is_empty()) {
            Some(search) => Some(search.parse::<KeywordTrigger>().or_raise(|| ErrorKind::Trigger)?),
            None => None,
        };
        Ok(PrintConfiguration {
            document: self.document.clone().filter(|p| !p.as_os_str().is_empty()),
            folder: self.folder.clone().filter(|p| !p.as_os_str().is_empty()),
            extension: self.extension.clone(),
            copies: u32::try_from(self.copies.max(1)).unwrap_or(u32::MAX),
            print: PrintOptions {
                printer: self.printer.clone().filter(|p| !p.is_empty()),
                paper_size: self.paper_size.clone(),
                color: self.color,
                silent: self.silent,
            },
            output: self.output.clone().filter(|p| !p.as_os_str().is_empty()),
            trigger,
            on_conflict: self.on_conflict.unwrap_or(settings.on_conflict),
        })
    }
}
