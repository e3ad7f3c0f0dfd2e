//! The line-oriented `config.cfg` shipped next to the executable.
//!
//! ```text
//! python_path = C:\Python312\python.exe
//! ```
//!
//! One `key = value` per line. Keys are case-insensitive and the first
//! occurrence of a key wins. Lines without `=` (and `#`/`;` comments) are
//! ignored. A missing file contributes nothing.

use figment::value::{Dict, Map, Value};
use figment::{Metadata, Profile, Provider};
use std::path::{Path, PathBuf};

/// File name looked up beside the executable.
pub const LEGACY_FILE: &str = "config.cfg";

/// A [`Provider`] reading a legacy `config.cfg`.
#[derive(Clone, Debug)]
pub struct LegacyConfig {
    path: PathBuf,
}
impl LegacyConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Provider for LegacyConfig {
    fn metadata(&self) -> Metadata {
        Metadata::from("legacy config.cfg", self.path.as_path())
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No legacy configuration file");
                return Ok(Map::new());
            },
            Err(e) => return Err(format!("reading {}: {e}", self.path.display()).into()),
        };
        Ok(Profile::Default.collect(parse(&text)))
    }
}

fn parse(text: &str) -> Dict {
    let mut dict = Dict::new();
    for line in text.lines().map(str::trim) {
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        if key.is_empty() || dict.contains_key(&key) {
            continue;
        }
        let value = value_for(&key, value.trim());
        dict.insert(key, value);
    }
    dict
}

/// Paths stay strings verbatim; anything else is parsed like an environment
/// variable would be (`500` becomes a number).
fn value_for(key: &str, raw: &str) -> Value {
    if key.ends_with("_path") || key.ends_with("_script") {
        return Value::from(raw.to_string());
    }
    raw.parse().unwrap_or_else(|_| Value::from(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_first_occurrence_wins() {
        let dict = parse("Python_Path = C:\\Python\\python.exe\npython_path = /usr/bin/python3\n");
        assert_eq!(dict.len(), 1);
        assert_eq!(dict["python_path"].as_str(), Some("C:\\Python\\python.exe"));
    }

    #[rstest]
    #[case("# python_path = nope")]
    #[case("; python_path = nope")]
    #[case("python_path")]
    #[case("= nope")]
    #[case("")]
    fn test_parse_ignored_lines(#[case] line: &str) {
        assert!(parse(line).is_empty());
    }

    #[test]
    fn test_parse_numbers_and_empty_values() {
        let dict = parse("settle_delay_ms = 250\npython_path =\n");
        assert_eq!(dict["settle_delay_ms"].to_u128(), Some(250));
        assert_eq!(dict["python_path"].as_str(), Some(""));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = LegacyConfig::file(dir.path().join(LEGACY_FILE)).data().unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEGACY_FILE);
        std::fs::write(&path, "python_path = /usr/bin/python3\r\n").unwrap();
        let data = LegacyConfig::file(&path).data().unwrap();
        assert_eq!(data[&Profile::Default]["python_path"].as_str(), Some("/usr/bin/python3"));
    }
}
