//! Logical key table.
//!
//! Every key a key spec may name lives in [`KEYS`]: its canonical name, the
//! platform raw code the native hook is expected to report for it (Windows
//! virtual-key numbering), the W3C `code` name used by the `global-hotkey`
//! backend, and the spellings accepted when parsing.

use std::fmt;

/// Raw code some native hooks report for the key left of `1` on ISO
/// layouts (`VK_OEM_8`). It is the same physical key as back-quote.
pub const MISREPORTED_BACK_QUOTE: u32 = 0xDF;

const BACK_QUOTE: u32 = 0xC0;

struct KeyEntry {
    name: &'static str,
    raw_code: u32,
    code: &'static str,
    aliases: &'static [&'static str],
}

const fn entry(
    name: &'static str,
    raw_code: u32,
    code: &'static str,
    aliases: &'static [&'static str],
) -> KeyEntry {
    KeyEntry {
        name,
        raw_code,
        code,
        aliases,
    }
}

#[rustfmt::skip]
static KEYS: &[KeyEntry] = &[
    entry("A", 0x41, "KeyA", &["KeyA"]),
    entry("B", 0x42, "KeyB", &["KeyB"]),
    entry("C", 0x43, "KeyC", &["KeyC"]),
    entry("D", 0x44, "KeyD", &["KeyD"]),
    entry("E", 0x45, "KeyE", &["KeyE"]),
    entry("F", 0x46, "KeyF", &["KeyF"]),
    entry("G", 0x47, "KeyG", &["KeyG"]),
    entry("H", 0x48, "KeyH", &["KeyH"]),
    entry("I", 0x49, "KeyI", &["KeyI"]),
    entry("J", 0x4A, "KeyJ", &["KeyJ"]),
    entry("K", 0x4B, "KeyK", &["KeyK"]),
    entry("L", 0x4C, "KeyL", &["KeyL"]),
    entry("M", 0x4D, "KeyM", &["KeyM"]),
    entry("N", 0x4E, "KeyN", &["KeyN"]),
    entry("O", 0x4F, "KeyO", &["KeyO"]),
    entry("P", 0x50, "KeyP", &["KeyP"]),
    entry("Q", 0x51, "KeyQ", &["KeyQ"]),
    entry("R", 0x52, "KeyR", &["KeyR"]),
    entry("S", 0x53, "KeyS", &["KeyS"]),
    entry("T", 0x54, "KeyT", &["KeyT"]),
    entry("U", 0x55, "KeyU", &["KeyU"]),
    entry("V", 0x56, "KeyV", &["KeyV"]),
    entry("W", 0x57, "KeyW", &["KeyW"]),
    entry("X", 0x58, "KeyX", &["KeyX"]),
    entry("Y", 0x59, "KeyY", &["KeyY"]),
    entry("Z", 0x5A, "KeyZ", &["KeyZ"]),
    entry("0", 0x30, "Digit0", &["Digit0"]),
    entry("1", 0x31, "Digit1", &["Digit1"]),
    entry("2", 0x32, "Digit2", &["Digit2"]),
    entry("3", 0x33, "Digit3", &["Digit3"]),
    entry("4", 0x34, "Digit4", &["Digit4"]),
    entry("5", 0x35, "Digit5", &["Digit5"]),
    entry("6", 0x36, "Digit6", &["Digit6"]),
    entry("7", 0x37, "Digit7", &["Digit7"]),
    entry("8", 0x38, "Digit8", &["Digit8"]),
    entry("9", 0x39, "Digit9", &["Digit9"]),
    entry("F1", 0x70, "F1", &[]),
    entry("F2", 0x71, "F2", &[]),
    entry("F3", 0x72, "F3", &[]),
    entry("F4", 0x73, "F4", &[]),
    entry("F5", 0x74, "F5", &[]),
    entry("F6", 0x75, "F6", &[]),
    entry("F7", 0x76, "F7", &[]),
    entry("F8", 0x77, "F8", &[]),
    entry("F9", 0x78, "F9", &[]),
    entry("F10", 0x79, "F10", &[]),
    entry("F11", 0x7A, "F11", &[]),
    entry("F12", 0x7B, "F12", &[]),
    entry("F13", 0x7C, "F13", &[]),
    entry("F14", 0x7D, "F14", &[]),
    entry("F15", 0x7E, "F15", &[]),
    entry("F16", 0x7F, "F16", &[]),
    entry("F17", 0x80, "F17", &[]),
    entry("F18", 0x81, "F18", &[]),
    entry("F19", 0x82, "F19", &[]),
    entry("F20", 0x83, "F20", &[]),
    entry("F21", 0x84, "F21", &[]),
    entry("F22", 0x85, "F22", &[]),
    entry("F23", 0x86, "F23", &[]),
    entry("F24", 0x87, "F24", &[]),
    entry("ENTER", 0x0D, "Enter", &["RETURN"]),
    entry("ESCAPE", 0x1B, "Escape", &["ESC"]),
    entry("TAB", 0x09, "Tab", &[]),
    entry("SPACE", 0x20, "Space", &[]),
    entry("BACK_SPACE", 0x08, "Backspace", &["BACKSPACE", "BACK"]),
    entry("DELETE", 0x2E, "Delete", &["DEL"]),
    entry("INSERT", 0x2D, "Insert", &["INS"]),
    entry("HOME", 0x24, "Home", &[]),
    entry("END", 0x23, "End", &[]),
    entry("PAGE_UP", 0x21, "PageUp", &["PAGEUP", "PGUP"]),
    entry("PAGE_DOWN", 0x22, "PageDown", &["PAGEDOWN", "PGDN"]),
    entry("LEFT", 0x25, "ArrowLeft", &["ARROWLEFT"]),
    entry("UP", 0x26, "ArrowUp", &["ARROWUP"]),
    entry("RIGHT", 0x27, "ArrowRight", &["ARROWRIGHT"]),
    entry("DOWN", 0x28, "ArrowDown", &["ARROWDOWN"]),
    entry("PRINTSCREEN", 0x2C, "PrintScreen", &["PRINT_SCREEN", "PRTSC"]),
    entry("PAUSE", 0x13, "Pause", &[]),
    entry("SEMICOLON", 0xBA, "Semicolon", &[";"]),
    entry("EQUALS", 0xBB, "Equal", &["EQUAL", "="]),
    entry("COMMA", 0xBC, "Comma", &[","]),
    entry("MINUS", 0xBD, "Minus", &["-", "DASH"]),
    entry("PERIOD", 0xBE, "Period", &[".", "DOT"]),
    entry("SLASH", 0xBF, "Slash", &["/"]),
    entry("BACK_QUOTE", BACK_QUOTE, "Backquote", &["BACKQUOTE", "GRAVE", "`"]),
    entry("OPEN_BRACKET", 0xDB, "BracketLeft", &["BRACKETLEFT", "["]),
    entry("BACK_SLASH", 0xDC, "Backslash", &["BACKSLASH", "\\"]),
    entry("CLOSE_BRACKET", 0xDD, "BracketRight", &["BRACKETRIGHT", "]"]),
    entry("QUOTE", 0xDE, "Quote", &["'", "APOSTROPHE"]),
    entry("NUMPAD0", 0x60, "Numpad0", &[]),
    entry("NUMPAD1", 0x61, "Numpad1", &[]),
    entry("NUMPAD2", 0x62, "Numpad2", &[]),
    entry("NUMPAD3", 0x63, "Numpad3", &[]),
    entry("NUMPAD4", 0x64, "Numpad4", &[]),
    entry("NUMPAD5", 0x65, "Numpad5", &[]),
    entry("NUMPAD6", 0x66, "Numpad6", &[]),
    entry("NUMPAD7", 0x67, "Numpad7", &[]),
    entry("NUMPAD8", 0x68, "Numpad8", &[]),
    entry("NUMPAD9", 0x69, "Numpad9", &[]),
    entry("MULTIPLY", 0x6A, "NumpadMultiply", &[]),
    entry("ADD", 0x6B, "NumpadAdd", &["PLUS"]),
    entry("SUBTRACT", 0x6D, "NumpadSubtract", &[]),
    entry("DECIMAL", 0x6E, "NumpadDecimal", &[]),
    entry("DIVIDE", 0x6F, "NumpadDivide", &[]),
];

/// A logical key from the key table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    index: u16,
}

impl Key {
    /// Resolve a key name or alias, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        KEYS.iter()
            .position(|e| {
                e.name.eq_ignore_ascii_case(name)
                    || e.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
            })
            .map(|index| Self {
                index: index as u16,
            })
    }

    /// Look a key up by the raw code the native hook reports.
    pub fn from_raw_code(raw_code: u32) -> Option<Self> {
        let raw_code = normalize_raw_code(raw_code);
        KEYS.iter()
            .position(|e| e.raw_code == raw_code)
            .map(|index| Self {
                index: index as u16,
            })
    }

    fn entry(&self) -> &'static KeyEntry {
        &KEYS[self.index as usize]
    }

    /// Canonical upper-case name, e.g. `"F4"` or `"BACK_QUOTE"`.
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    /// Raw platform code the native hook reports for this key.
    pub fn raw_code(&self) -> u32 {
        self.entry().raw_code
    }

    /// W3C `code` name (`"KeyA"`, `"Digit1"`, `"F4"`).
    pub fn code_name(&self) -> &'static str {
        self.entry().code
    }

    /// True if `name` is this key's name or one of its aliases (ASCII case
    /// ignored). Does not allocate; called on the hook thread.
    pub fn answers_to(&self, name: &str) -> bool {
        let entry = self.entry();
        entry.name.eq_ignore_ascii_case(name)
            || entry.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    pub fn all() -> impl Iterator<Item = Key> {
        (0..KEYS.len()).map(|index| Key {
            index: index as u16,
        })
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}, {:#04X})", self.name(), self.raw_code())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Remap raw codes the native hook layer is known to misreport.
pub fn normalize_raw_code(raw_code: u32) -> u32 {
    if raw_code == MISREPORTED_BACK_QUOTE {
        BACK_QUOTE
    } else {
        raw_code
    }
}
