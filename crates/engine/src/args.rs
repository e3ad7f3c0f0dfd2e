use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// How documents should come out of the printer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintOptions {
    /// Target printer. `None` (or empty) prints to the system default.
    pub printer: Option<String>,
    /// Paper size token understood by the engine, e.g. `A4` or `Letter`.
    pub paper_size: String,
    pub color: bool,
    /// Ask the engine not to show any UI.
    pub silent: bool,
}
impl Default for PrintOptions {
    fn default() -> Self {
        Self { printer: None, paper_size: "A4".to_string(), color: false, silent: true }
    }
}

/// The arguments for a single engine invocation.
///
/// [`Display`](fmt::Display) renders the exact command line the engine
/// expects:
///
/// ```text
/// <-print-to-default | -print-to "<printer>"> -print-settings "[<N>x,]<color|monochrome>,paper=<size>" "<file>" [-silent]
/// ```
///
/// ```
/// use spool_engine::{PrintArgs, PrintOptions};
///
/// let args = PrintArgs::build(&PrintOptions::default(), 1, "report.pdf");
/// assert_eq!(args.to_string(), r#"-print-to-default -print-settings "monochrome,paper=A4" "report.pdf" -silent"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintArgs {
    printer: Option<String>,
    settings: String,
    file: PathBuf,
    silent: bool,
}
impl PrintArgs {
    /// Pure: the same inputs always produce the same arguments.
    pub fn build(options: &PrintOptions, copies: u32, file: impl Into<PathBuf>) -> Self {
        let printer = options.printer.as_ref().filter(|p| !p.is_empty()).cloned();
        // The engine's settings grammar is order- and comma-sensitive.
        let mut settings = String::new();
        if copies > 1 {
            settings.push_str(&format!("{copies}x,"));
        }
        settings.push_str(if options.color { "color" } else { "monochrome" });
        settings.push_str(",paper=");
        settings.push_str(&options.paper_size);
        Self { printer, settings, file: file.into(), silent: options.silent }
    }

    /// The `-print-settings` value.
    pub fn settings(&self) -> &str {
        &self.settings
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The same arguments as [`Display`](fmt::Display), one token per element
    /// and without the quoting.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(6);
        match &self.printer {
            Some(printer) => {
                argv.push("-print-to".into());
                argv.push(printer.into());
            },
            None => argv.push("-print-to-default".into()),
        }
        argv.push("-print-settings".into());
        argv.push((&self.settings).into());
        argv.push(self.file.clone().into_os_string());
        if self.silent {
            argv.push("-silent".into());
        }
        argv
    }

    /// Windows programs parse their own command line, so hand over the
    /// rendered string untouched.
    #[cfg(windows)]
    pub(crate) fn apply(&self, command: &mut tokio::process::Command) {
        command.raw_arg(self.to_string());
    }

    #[cfg(not(windows))]
    pub(crate) fn apply(&self, command: &mut tokio::process::Command) {
        command.args(self.argv());
    }
}
impl fmt::Display for PrintArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.printer {
            Some(printer) => write!(f, "-print-to \"{printer}\"")?,
            None => f.write_str("-print-to-default")?,
        }
        // A disabled silent flag still leaves its separating space behind.
        write!(
            f,
            " -print-settings \"{}\" \"{}\" {}",
            self.settings,
            self.file.display(),
            if self.silent { "-silent" } else { "" }
        )
    }
}
