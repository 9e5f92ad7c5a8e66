//! Persisted form of an action binding: `"<isGlobal>,<keySpec>"`.

use std::fmt;

/// The part of an action that survives restarts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    pub global: bool,
    pub key_spec: String,
}

impl ActionRecord {
    pub fn new(global: bool, key_spec: impl Into<String>) -> Self {
        Self {
            global,
            key_spec: key_spec.into(),
        }
    }

    /// Parse `"true,CTRL+ALT+W"`.
    ///
    /// Splits on the first comma, so a key spec may itself end in a comma
    /// key. Returns `None` when there is no comma at all. Anything other
    /// than `true` (any case) reads as `false`.
    pub fn parse(s: &str) -> Option<Self> {
        let (global, key_spec) = s.split_once(',')?;
        Some(Self {
            global: global.trim().eq_ignore_ascii_case("true"),
            key_spec: key_spec.to_string(),
        })
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.global, self.key_spec)
    }
}
