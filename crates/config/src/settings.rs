use crate::error::{ErrorKind, Result};
use crate::legacy::{LEGACY_FILE, LegacyConfig};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use spool_dispatch::OnConflict;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Helper script used to count keyword occurrences when none is configured.
pub const DEFAULT_COUNTER_SCRIPT: &str = "search.py";
/// Environment variables with this prefix override every file.
pub const ENV_PREFIX: &str = "SPOOL_";

/// Everything that isn't a command-line option.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Interpreter running the keyword counter script. Without it, keyword
    /// triggers never see a count.
    pub python_path: Option<PathBuf>,
    pub counter_script: Option<PathBuf>,
    /// Explicit print engine; otherwise it is discovered.
    pub engine_path: Option<PathBuf>,
    /// How long a newly detected file is left alone before it is printed.
    pub settle_delay_ms: u64,
    pub engine_timeout_secs: Option<u64>,
    pub counter_timeout_secs: Option<u64>,
    pub on_conflict: OnConflict,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            python_path: None,
            counter_script: None,
            engine_path: None,
            settle_delay_ms: 1000,
            engine_timeout_secs: None,
            counter_timeout_secs: None,
            on_conflict: OnConflict::default(),
        }
    }
}

/// Where settings are read from, lowest priority first (environment
/// variables come last and aren't listed).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sources {
    /// Legacy `config.cfg`.
    pub legacy: PathBuf,
    /// Per-user `spool.toml`.
    pub user: Option<PathBuf>,
    /// A `--config` file; unlike the others it must exist.
    pub explicit: Option<PathBuf>,
}
impl Sources {
    /// The standard locations: `config.cfg` beside the executable and
    /// `spool.toml` in the platform's configuration directory.
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            legacy: executable_dir().join(LEGACY_FILE),
            user: ProjectDirs::from("", "", "spool").map(|dirs| dirs.config_dir().join("spool.toml")),
            explicit: explicit.map(Path::to_path_buf),
        }
    }
}

impl Settings {
    pub fn figment(sources: &Sources) -> Figment {
        let mut figment =
            Figment::from(Serialized::defaults(Self::default())).merge(LegacyConfig::file(&sources.legacy));
        if let Some(user) = &sources.user {
            figment = figment.merge(Toml::file(user));
        }
        if let Some(explicit) = &sources.explicit {
            figment = figment.merge(Toml::file(explicit));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Merges every source into settings.
    ///
    /// # Errors
    /// - [`ErrorKind::NotFound`] if the explicit file doesn't exist.
    /// - [`ErrorKind::Invalid`] if a value has the wrong type.
    pub fn load(sources: &Sources) -> Result<Self> {
        if let Some(explicit) = &sources.explicit
            && !explicit.is_file()
        {
            exn::bail!(ErrorKind::NotFound(explicit.clone()));
        }
        let settings: Self = Self::figment(sources).extract().or_raise(|| ErrorKind::Invalid)?;
        tracing::debug!(?settings, "Settings loaded");
        Ok(settings)
    }

    /// Configured interpreter; an empty value counts as none.
    pub fn python_path(&self) -> Option<&Path> {
        self.python_path.as_deref().filter(|p| !p.as_os_str().is_empty())
    }

    /// The configured script, or `search.py` next to the executable.
    pub fn counter_script(&self) -> PathBuf {
        match self.counter_script.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            Some(script) => script.clone(),
            None => executable_dir().join(DEFAULT_COUNTER_SCRIPT),
        }
    }

    pub fn engine_path(&self) -> Option<&Path> {
        self.engine_path.as_deref().filter(|p| !p.as_os_str().is_empty())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// `None` waits for the engine for as long as it takes.
    pub fn engine_timeout(&self) -> Option<Duration> {
        self.engine_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }

    pub fn counter_timeout(&self) -> Option<Duration> {
        self.counter_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

/// Folder holding the running executable, or the working directory if that
/// can't be determined.
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
