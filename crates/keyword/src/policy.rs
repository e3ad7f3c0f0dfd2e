use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::fmt;
use std::str::FromStr;

/// Override the copy count when a keyword occurs an exact number of times.
///
/// Parsed from the command-line form `<keyword>,<triggerCount>,<overrideCopies>`:
///
/// ```
/// use spool_keyword::KeywordTrigger;
///
/// let trigger: KeywordTrigger = "urgent,2,5".parse().unwrap();
/// assert_eq!(trigger.keyword, "urgent");
/// assert_eq!(trigger.trigger_count, 2);
/// assert_eq!(trigger.override_copies, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordTrigger {
    pub keyword: String,
    pub trigger_count: u32,
    /// Always at least one.
    pub override_copies: u32,
}
impl KeywordTrigger {
    /// Exact match only; "at least" is not a thing here.
    pub fn matches(&self, occurrences: Occurrences) -> bool {
        occurrences.or_zero() == self.trigger_count
    }
}
impl FromStr for KeywordTrigger {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        let [keyword, trigger, copies] = fields.as_slice() else {
            exn::bail!(ErrorKind::FieldCount(fields.len()));
        };
        if keyword.trim().is_empty() {
            exn::bail!(ErrorKind::EmptyKeyword);
        }
        let trigger_count = parse_number("trigger count", trigger)?;
        let override_copies = parse_number("copies", copies)?;
        if override_copies == 0 {
            exn::bail!(ErrorKind::InvalidNumber { field: "copies", value: copies.to_string() });
        }
        Ok(Self { keyword: keyword.to_string(), trigger_count, override_copies })
    }
}
impl fmt::Display for KeywordTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.keyword, self.trigger_count, self.override_copies)
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u32> {
    value.trim().parse::<u32>().or_raise(|| ErrorKind::InvalidNumber { field, value: value.to_string() })
}

/// Result of asking the external counter how often a keyword occurs.
///
/// [`Unavailable`](Self::Unavailable) covers every way counting can fail
/// (no interpreter, no script, crashed helper, garbage output). The copy
/// policy still treats it as zero, so a trigger configured for zero
/// occurrences also fires when counting failed. Keeping the variant separate
/// at least makes that visible in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occurrences {
    Counted(u32),
    Unavailable,
}
impl Occurrences {
    pub fn or_zero(self) -> u32 {
        match self {
            Self::Counted(n) => n,
            Self::Unavailable => 0,
        }
    }
}
impl From<u32> for Occurrences {
    fn from(value: u32) -> Self {
        Self::Counted(value)
    }
}
impl fmt::Display for Occurrences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counted(n) => write!(f, "{n}"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Decides how many copies to print.
///
/// - With a trigger whose count matches `occurrences` exactly, the trigger's
///   override wins regardless of `base_copies`.
/// - Otherwise `base_copies`, clamped to at least one.
pub fn resolve_copies(base_copies: u32, occurrences: impl Into<Occurrences>, trigger: Option<&KeywordTrigger>) -> u32 {
    let occurrences = occurrences.into();
    match trigger {
        Some(trigger) if trigger.matches(occurrences) => trigger.override_copies,
        _ => base_copies.max(1),
    }
}
