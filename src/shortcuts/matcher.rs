//! Key spec parsing and native event matching.

use std::fmt;
use std::str::FromStr;

use super::keys::{normalize_raw_code, Key};
use super::types::{KeySpecError, Modifier, ModifierMask, Platform};

/// A resolved key spec: one logical key plus the exact set of modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombination {
    key: Key,
    modifiers: ModifierMask,
}

impl KeyCombination {
    pub fn new(key: Key, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        let modifiers = modifiers
            .into_iter()
            .fold(ModifierMask::empty(), |mask, m| mask | m.to_bit_flag());
        Self { key, modifiers }
    }

    /// Parse `KEY` or `MOD(+MOD)*+KEY`.
    ///
    /// The last `+`-separated token is the key, everything before it is a
    /// modifier. Names are matched ignoring case.
    pub fn parse(spec: &str) -> Result<Self, KeySpecError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(KeySpecError::Empty);
        }

        let mut tokens: Vec<&str> = spec.split('+').map(str::trim).collect();
        let key_token = tokens.pop().unwrap_or_default();
        if key_token.is_empty() {
            return Err(KeySpecError::MissingKey);
        }

        let mut modifiers = ModifierMask::empty();
        for token in tokens {
            let modifier = Modifier::from_name(token)
                .ok_or_else(|| KeySpecError::UnknownModifier(token.to_string()))?;
            modifiers |= modifier.to_bit_flag();
        }

        let key = match Key::from_name(key_token) {
            Some(key) => key,
            // "CTRL+SHIFT" names only modifiers
            None if Modifier::from_name(key_token).is_some() => {
                return Err(KeySpecError::MissingKey)
            }
            None => return Err(KeySpecError::UnknownKey(key_token.to_string())),
        };

        Ok(Self { key, modifiers })
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn modifiers(&self) -> ModifierMask {
        self.modifiers
    }

    /// Decide whether a native key event satisfies this combination.
    ///
    /// Lock and mouse-button bits are stripped from `raw_modifiers` before
    /// the exact-equality check. The key matches on raw code or, failing
    /// that, on the reported key name, because native raw codes and the
    /// logical key table disagree for some keys on some layouts.
    pub fn matches(&self, raw_code: u32, raw_modifiers: u32, key_name: &str) -> bool {
        let modifiers = ModifierMask::from_raw(raw_modifiers).stripped();
        self.matches_normalized(normalize_raw_code(raw_code), modifiers, key_name)
    }

    /// Same as [`matches`](Self::matches) for a code already normalized and
    /// a mask already stripped. Used by the engine, which computes both once
    /// per event.
    pub(crate) fn matches_normalized(
        &self,
        raw_code: u32,
        modifiers: ModifierMask,
        key_name: &str,
    ) -> bool {
        modifiers == self.modifiers
            && (raw_code == self.key.raw_code() || self.key.answers_to(key_name))
    }

    /// Modifiers present in this combination, in canonical order.
    pub fn modifier_list(&self) -> impl Iterator<Item = Modifier> {
        let modifiers = self.modifiers;
        Modifier::ALL
            .into_iter()
            .filter(move |m| modifiers.contains(m.to_bit_flag()))
    }

    /// Canonical key spec, e.g. `CTRL+ALT+1`.
    pub fn to_spec_string(&self) -> String {
        let mut parts: Vec<&str> = self.modifier_list().map(Modifier::spec_name).collect();
        parts.push(self.key.name());
        parts.join("+")
    }

    pub fn display(&self) -> String {
        self.display_for_platform(Platform::current())
    }

    pub fn display_for_platform(&self, platform: Platform) -> String {
        let modifiers = self.modifier_list().map(|m| m.display(platform));
        match platform {
            Platform::MacOS => {
                let mut s: String = modifiers.collect();
                s.push_str(self.key.name());
                s
            }
            Platform::Windows | Platform::Linux => {
                let mut parts: Vec<String> = modifiers.collect();
                parts.push(self.key.name().to_string());
                parts.join("+")
            }
        }
    }
}

impl FromStr for KeyCombination {
    type Err = KeySpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_spec_string())
    }
}
