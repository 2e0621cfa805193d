//! Key descriptions used when choosing and displaying remaps.
//!
//! The catalog in [`catalog`] names the keys a user can pick. [`KeyInfo`] is
//! the description of one chosen key, whether it came from the catalog or from
//! a live capture.

pub mod catalog;

use std::fmt;

use thiserror::Error;

pub use catalog::{find_by_name, find_by_scan_code, KeyOption, KEY_OPTIONS};

/// One physical key: display name, Virtual Key code and scan code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub name: String,
    pub virtual_key: u32,
    pub scan_code: u16,
}

impl KeyInfo {
    pub fn new(name: impl Into<String>, virtual_key: u32, scan_code: u16) -> Self {
        Self {
            name: name.into(),
            virtual_key,
            scan_code,
        }
    }
}

impl From<&KeyOption> for KeyInfo {
    fn from(option: &KeyOption) -> Self {
        Self::new(option.display_name, option.virtual_key, option.scan_code)
    }
}

impl fmt::Display for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (VK:{}, SC:0x{:04X})",
            self.name, self.virtual_key, self.scan_code
        )
    }
}

/// Name shown for `scan_code` in a mapping list.
///
/// Zero is the "disabled" target; codes missing from the catalog are shown
/// with their hex value.
pub fn key_display_name(scan_code: u16) -> String {
    if scan_code == 0 {
        return "Disabled".to_string();
    }
    match find_by_scan_code(scan_code) {
        Some(option) => option.display_name.to_string(),
        None => format!("Unknown (SC:0x{scan_code:04X})"),
    }
}

/// Errors from [`parse_key`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("key argument is empty")]
    Empty,

    #[error("invalid scan code '{0}': expected a hex value up to 0xFFFF")]
    InvalidScanCode(String),

    #[error("unknown key name '{0}' (run `rekey keys` for the list)")]
    UnknownName(String),
}

/// Resolves a user-supplied key to a [`KeyInfo`].
///
/// Accepts a catalog name (`"Right Ctrl"`, `"capslock"`) or a hex scan code
/// with a `0x` prefix (`"0xE01D"`). `"Disabled"` and `"0x0"` resolve to scan
/// code zero, which remaps a key to nothing.
///
/// # Errors
///
/// Returns [`KeyParseError`] when the input is blank, the hex value does not
/// fit in 16 bits, or the name is not in the catalog.
pub fn parse_key(input: &str) -> Result<KeyInfo, KeyParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(KeyParseError::Empty);
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        let scan_code = u16::from_str_radix(hex, 16)
            .map_err(|_| KeyParseError::InvalidScanCode(trimmed.to_string()))?;
        let info = match find_by_scan_code(scan_code) {
            Some(option) => KeyInfo::from(option),
            None => KeyInfo::new(key_display_name(scan_code), 0, scan_code),
        };
        return Ok(info);
    }

    if trimmed.eq_ignore_ascii_case("disabled") {
        return Ok(KeyInfo::new("Disabled", 0, 0));
    }

    find_by_name(trimmed)
        .map(KeyInfo::from)
        .ok_or_else(|| KeyParseError::UnknownName(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_info_display_string() {
        let info = KeyInfo::new("Right Ctrl", 0xA3, 0xE01D);
        assert_eq!(info.to_string(), "Right Ctrl (VK:163, SC:0xE01D)");
    }

    #[test]
    fn test_display_name_for_known_zero_and_unknown() {
        assert_eq!(key_display_name(0x003A), "CapsLock");
        assert_eq!(key_display_name(0), "Disabled");
        assert_eq!(key_display_name(0x0059), "Unknown (SC:0x0059)");
    }

    #[test]
    fn test_parse_key_by_name() {
        let info = parse_key("  left ctrl ").unwrap();
        assert_eq!(info.scan_code, 0x001D);
        assert_eq!(info.virtual_key, 0xA2);
        assert_eq!(info.name, "Left Ctrl");
    }

    #[test]
    fn test_parse_key_by_hex_uses_catalog_name_when_known() {
        let info = parse_key("0xe01d").unwrap();
        assert_eq!(info.name, "Right Ctrl");
        assert_eq!(info.scan_code, 0xE01D);
    }

    #[test]
    fn test_parse_key_by_hex_outside_catalog() {
        let info = parse_key("0X0059").unwrap();
        assert_eq!(info.scan_code, 0x0059);
        assert_eq!(info.virtual_key, 0);
    }

    #[test]
    fn test_parse_key_disabled() {
        assert_eq!(parse_key("Disabled").unwrap().scan_code, 0);
        assert_eq!(parse_key("0x0").unwrap().scan_code, 0);
    }

    #[test]
    fn test_parse_key_errors() {
        assert_eq!(parse_key(""), Err(KeyParseError::Empty));
        assert_eq!(
            parse_key("0x1FFFF"),
            Err(KeyParseError::InvalidScanCode("0x1FFFF".to_string()))
        );
        assert_eq!(parse_key("0x"), Err(KeyParseError::InvalidScanCode("0x".to_string())));
        assert_eq!(
            parse_key("Hyper"),
            Err(KeyParseError::UnknownName("Hyper".to_string()))
        );
    }
}
