use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Our own crates; everything else stays at `warn` unless `RUST_LOG` says
/// otherwise.
const CRATES: [&str; 6] = ["spool", "spool_config", "spool_dispatch", "spool_engine", "spool_keyword", "spool_process"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}
impl Verbosity {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, _) => Self::Verbose,
        }
    }

    fn level(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

fn default_directives(verbosity: Verbosity) -> String {
    let level = verbosity.level();
    CRATES.iter().fold("warn".to_string(), |mut directives, krate| {
        directives.push_str(&format!(",{krate}={level}"));
        directives
    })
}

/// Logs go to stderr, leaving stdout for the final report.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
}
