//! Key specs and key combinations.
//!
//! This module provides:
//! - The logical key table with platform raw codes (`keys`)
//! - Modifier names and native modifier masks (`types`)
//! - Key spec parsing and native-event matching (`matcher`)
//!
//! # Example
//!
//! ```
//! use action_hotkeys::shortcuts::{KeyCombination, ModifierMask};
//!
//! let combo = KeyCombination::parse("ctrl+alt+1").unwrap();
//! assert_eq!(combo.to_spec_string(), "CTRL+ALT+1");
//!
//! // Caps lock never takes part in matching.
//! let raw = (ModifierMask::CONTROL | ModifierMask::ALT | ModifierMask::CAPS_LOCK).bits();
//! assert!(combo.matches(0x31, raw, "1"));
//! ```

mod keys;
mod matcher;
mod types;


pub use keys::{normalize_raw_code, Key, MISREPORTED_BACK_QUOTE};
pub use matcher::KeyCombination;
pub use types::{KeySpecError, Modifier, ModifierMask, Platform};
