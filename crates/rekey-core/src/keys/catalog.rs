//! Static catalog of the keys offered for remapping.
//!
//! Each entry carries the Windows Virtual Key code and the scan code in the
//! form the `Scancode Map` expects (extended keys include the `0xE0` prefix).
//! Reference: https://learn.microsoft.com/windows/win32/inputdev/about-keyboard-input

/// A named key from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOption {
    pub display_name: &'static str,
    pub virtual_key: u32,
    pub scan_code: u16,
}

const fn key(display_name: &'static str, virtual_key: u32, scan_code: u16) -> KeyOption {
    KeyOption {
        display_name,
        virtual_key,
        scan_code,
    }
}

/// Every key the host lets the user pick by name.
pub const KEY_OPTIONS: &[KeyOption] = &[
    key("PrintScreen (PRTSC)", 0x2C, 0xE037),
    key("Right Ctrl", 0xA3, 0xE01D),
    key("Left Ctrl", 0xA2, 0x001D),
    key("Right Alt (AltGr)", 0xA5, 0xE038),
    key("Left Alt", 0xA4, 0x0038),
    key("Left Shift", 0xA0, 0x002A),
    key("Right Shift", 0xA1, 0x0036),
    key("Enter", 0x0D, 0x001C),
    key("Numpad Enter", 0x0D, 0xE01C),
    key("Space", 0x20, 0x0039),
    key("Tab", 0x09, 0x000F),
    key("CapsLock", 0x14, 0x003A),
    key("Backspace", 0x08, 0x000E),
    key("Escape", 0x1B, 0x0001),
    key("Insert", 0x2D, 0xE052),
    key("Delete", 0x2E, 0xE053),
    key("Home", 0x24, 0xE047),
    key("End", 0x23, 0xE04F),
    key("Page Up", 0x21, 0xE049),
    key("Page Down", 0x22, 0xE051),
    key("Arrow Up", 0x26, 0xE048),
    key("Arrow Down", 0x28, 0xE050),
    key("Arrow Left", 0x25, 0xE04B),
    key("Arrow Right", 0x27, 0xE04D),
    key("Left Win", 0x5B, 0xE05B),
    key("Right Win", 0x5C, 0xE05C),
    key("Apps/Menu", 0x5D, 0xE05D),
    key("0", 0x30, 0x000B),
    key("1", 0x31, 0x0002),
    key("2", 0x32, 0x0003),
    key("3", 0x33, 0x0004),
    key("4", 0x34, 0x0005),
    key("5", 0x35, 0x0006),
    key("6", 0x36, 0x0007),
    key("7", 0x37, 0x0008),
    key("8", 0x38, 0x0009),
    key("9", 0x39, 0x000A),
    key("A", 0x41, 0x001E),
    key("B", 0x42, 0x0030),
    key("C", 0x43, 0x002E),
    key("D", 0x44, 0x0020),
    key("E", 0x45, 0x0012),
    key("F", 0x46, 0x0021),
    key("G", 0x47, 0x0022),
    key("H", 0x48, 0x0023),
    key("I", 0x49, 0x0017),
    key("J", 0x4A, 0x0024),
    key("K", 0x4B, 0x0025),
    key("L", 0x4C, 0x0026),
    key("M", 0x4D, 0x0032),
    key("N", 0x4E, 0x0031),
    key("O", 0x4F, 0x0018),
    key("P", 0x50, 0x0019),
    key("Q", 0x51, 0x0010),
    key("R", 0x52, 0x0013),
    key("S", 0x53, 0x001F),
    key("T", 0x54, 0x0014),
    key("U", 0x55, 0x0016),
    key("V", 0x56, 0x002F),
    key("W", 0x57, 0x0011),
    key("X", 0x58, 0x002D),
    key("Y", 0x59, 0x0015),
    key("Z", 0x5A, 0x002C),
];

/// Looks up the first catalog entry with `scan_code`.
pub fn find_by_scan_code(scan_code: u16) -> Option<&'static KeyOption> {
    KEY_OPTIONS.iter().find(|k| k.scan_code == scan_code)
}

/// Looks up a catalog entry by name, ignoring case, spaces and punctuation.
///
/// `"Right Ctrl"`, `"rightctrl"` and `"RIGHT-CTRL"` all match. A name with a
/// parenthesised alias also matches on either part alone, so `"Right Alt"`
/// and `"AltGr"` both find `"Right Alt (AltGr)"`.
pub fn find_by_name(name: &str) -> Option<&'static KeyOption> {
    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }
    KEY_OPTIONS.iter().find(|k| {
        if normalize(k.display_name) == wanted {
            return true;
        }
        match k.display_name.split_once('(') {
            Some((base, alias)) => normalize(base) == wanted || normalize(alias) == wanted,
            None => false,
        }
    })
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        for (i, a) in KEY_OPTIONS.iter().enumerate() {
            for b in &KEY_OPTIONS[i + 1..] {
                assert_ne!(a.display_name, b.display_name);
            }
        }
    }

    #[test]
    fn test_catalog_has_no_zero_scan_codes() {
        assert!(KEY_OPTIONS.iter().all(|k| k.scan_code != 0));
    }

    #[test]
    fn test_find_by_scan_code_distinguishes_extended() {
        assert_eq!(find_by_scan_code(0xE01D).map(|k| k.display_name), Some("Right Ctrl"));
        assert_eq!(find_by_scan_code(0x001D).map(|k| k.display_name), Some("Left Ctrl"));
        assert_eq!(find_by_scan_code(0x1234), None);
    }

    #[test]
    fn test_find_by_name_is_lenient() {
        assert_eq!(find_by_name("rightctrl").map(|k| k.scan_code), Some(0xE01D));
        assert_eq!(find_by_name("RIGHT-CTRL").map(|k| k.scan_code), Some(0xE01D));
        assert_eq!(find_by_name("Caps Lock").map(|k| k.scan_code), Some(0x003A));
        assert_eq!(find_by_name("Right Alt").map(|k| k.scan_code), Some(0xE038));
        assert_eq!(find_by_name("AltGr").map(|k| k.scan_code), Some(0xE038));
        assert_eq!(find_by_name("prtsc").map(|k| k.scan_code), Some(0xE037));
    }

    #[test]
    fn test_find_by_name_rejects_unknown_and_blank() {
        assert!(find_by_name("Hyper").is_none());
        assert!(find_by_name("  ").is_none());
    }
}
