//! Core key-combination types.
//!
//! This module provides:
//! - `ModifierMask` - raw native modifier bits, including the lock and mouse
//!   bits that never take part in hotkey identity
//! - `Modifier` - the closed set of modifiers a key spec may name
//! - `KeySpecError` - detailed parse errors for user feedback
//! - `Platform` - platform-aware display selection

use bitflags::bitflags;
use thiserror::Error;

/// Errors that can occur when parsing a key spec string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeySpecError {
    #[error("key spec is empty")]
    Empty,
    #[error("key spec has no key, only modifiers")]
    MissingKey,
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
}

bitflags! {
    /// Modifier bitmask as delivered by the native hook.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierMask: u32 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const ALT_GRAPH = 1 << 3;
        const META = 1 << 4;
        const COMMAND = 1 << 5;

        const CAPS_LOCK = 1 << 8;
        const NUM_LOCK = 1 << 9;
        const SCROLL_LOCK = 1 << 10;

        const BUTTON1 = 1 << 12;
        const BUTTON2 = 1 << 13;
        const BUTTON3 = 1 << 14;
        const BUTTON4 = 1 << 15;
        const BUTTON5 = 1 << 16;
    }
}

impl ModifierMask {
    /// Bits that never participate in hotkey identity.
    pub const IGNORED: Self = Self::CAPS_LOCK
        .union(Self::NUM_LOCK)
        .union(Self::SCROLL_LOCK)
        .union(Self::BUTTON1)
        .union(Self::BUTTON2)
        .union(Self::BUTTON3)
        .union(Self::BUTTON4)
        .union(Self::BUTTON5);

    /// Interpret a raw native bitmask. Unknown bits are dropped.
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// The mask with lock and mouse-button bits removed.
    pub fn stripped(self) -> Self {
        self.difference(Self::IGNORED)
    }
}

/// A modifier key a key spec can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    AltGraph,
    /// Windows key on PC keyboards, Meta/Super elsewhere.
    Meta,
    Command,
}

impl Modifier {
    /// Canonical order used when rendering a key spec.
    pub const ALL: [Modifier; 6] = [
        Modifier::Control,
        Modifier::Shift,
        Modifier::Alt,
        Modifier::AltGraph,
        Modifier::Meta,
        Modifier::Command,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let modifier = match name.as_str() {
            "shift" | "shft" => Self::Shift,
            "ctrl" | "control" | "ctl" => Self::Control,
            "alt" | "opt" | "option" => Self::Alt,
            "alt_graph" | "altgraph" | "altgr" => Self::AltGraph,
            "windows" | "win" | "meta" | "super" => Self::Meta,
            "command" | "cmd" => Self::Command,
            _ => return None,
        };
        Some(modifier)
    }

    pub fn to_bit_flag(self) -> ModifierMask {
        match self {
            Self::Shift => ModifierMask::SHIFT,
            Self::Control => ModifierMask::CONTROL,
            Self::Alt => ModifierMask::ALT,
            Self::AltGraph => ModifierMask::ALT_GRAPH,
            Self::Meta => ModifierMask::META,
            Self::Command => ModifierMask::COMMAND,
        }
    }

    /// Name as written in a key spec.
    pub fn spec_name(self) -> &'static str {
        match self {
            Self::Shift => "SHIFT",
            Self::Control => "CTRL",
            Self::Alt => "ALT",
            Self::AltGraph => "ALT_GRAPH",
            Self::Meta => "META",
            Self::Command => "COMMAND",
        }
    }

    fn display_symbol(self) -> char {
        match self {
            Self::Shift => '⇧',
            Self::Control => '⌃',
            Self::Alt | Self::AltGraph => '⌥',
            Self::Meta | Self::Command => '⌘',
        }
    }

    fn display_text(self) -> &'static str {
        match self {
            Self::Shift => "Shift",
            Self::Control => "Ctrl",
            Self::Alt => "Alt",
            Self::AltGraph => "AltGr",
            Self::Meta => "Super",
            Self::Command => "Cmd",
        }
    }

    pub(crate) fn display(self, platform: Platform) -> String {
        match platform {
            Platform::MacOS => self.display_symbol().to_string(),
            Platform::Windows | Platform::Linux => self.display_text().to_string(),
        }
    }
}

/// Platform enum for display formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Platform::MacOS
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Platform::Linux
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_synonyms() {
        assert_eq!(Modifier::from_name("CTRL"), Some(Modifier::Control));
        assert_eq!(Modifier::from_name("control"), Some(Modifier::Control));
        assert_eq!(Modifier::from_name("Windows"), Some(Modifier::Meta));
        assert_eq!(Modifier::from_name("META"), Some(Modifier::Meta));
        assert_eq!(Modifier::from_name("alt_graph"), Some(Modifier::AltGraph));
        assert_eq!(Modifier::from_name("COMMAND"), Some(Modifier::Command));
        assert_eq!(Modifier::from_name("hyper"), None);
    }

    #[test]
    fn every_modifier_has_its_own_bit() {
        let mut seen = ModifierMask::empty();
        for modifier in Modifier::ALL {
            let bit = modifier.to_bit_flag();
            assert_eq!(bit.bits().count_ones(), 1);
            assert!(!seen.intersects(bit));
            assert!(!ModifierMask::IGNORED.intersects(bit));
            seen |= bit;
        }
    }

    #[test]
    fn stripping_drops_locks_and_buttons_only() {
        let raw = ModifierMask::CONTROL
            | ModifierMask::CAPS_LOCK
            | ModifierMask::NUM_LOCK
            | ModifierMask::BUTTON1
            | ModifierMask::BUTTON3;
        assert_eq!(raw.stripped(), ModifierMask::CONTROL);

        let with_shift = raw | ModifierMask::SHIFT;
        assert_eq!(
            with_shift.stripped(),
            ModifierMask::CONTROL | ModifierMask::SHIFT
        );
    }

    #[test]
    fn unknown_raw_bits_are_dropped() {
        let raw = ModifierMask::ALT.bits() | (1 << 30);
        assert_eq!(ModifierMask::from_raw(raw), ModifierMask::ALT);
    }
}
