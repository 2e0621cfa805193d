//! Raw low-level keyboard records and their decoded scan-code form.
//!
//! The platform hook fills in a [`RawKeyEvent`] per record it receives and
//! calls [`RawKeyEvent::decode`]. Only key-down transitions (including the
//! system variant raised while Alt is held) produce a [`DecodedKeyEvent`].

use std::fmt;

/// `LLKHF_EXTENDED`: the key is an extended key (right-hand modifiers,
/// navigation cluster, numpad Enter, ...).
pub const LLKHF_EXTENDED: u8 = 0x01;

/// Prefix folded into the scan code of extended keys.
pub const EXTENDED_PREFIX: u16 = 0xE000;

/// The window message that carried the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    /// `WM_KEYDOWN`
    KeyDown,
    /// `WM_SYSKEYDOWN`
    SysKeyDown,
    /// `WM_KEYUP`
    KeyUp,
    /// `WM_SYSKEYUP`
    SysKeyUp,
}

impl KeyTransition {
    pub fn is_down(self) -> bool {
        matches!(self, Self::KeyDown | Self::SysKeyDown)
    }
}

/// One hardware key record, as delivered by the OS hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub transition: KeyTransition,
    /// Windows Virtual Key code.
    pub vk_code: u32,
    /// Hardware scan code without the extended prefix.
    pub scan_code: u16,
    /// Low byte of the `KBDLLHOOKSTRUCT` flags.
    pub flags: u8,
    /// Milliseconds since system start.
    pub time_ms: u32,
}

impl RawKeyEvent {
    pub fn is_extended(&self) -> bool {
        self.flags & LLKHF_EXTENDED != 0
    }

    /// Decodes a key-down record; key-up records yield `None`.
    pub fn decode(&self) -> Option<DecodedKeyEvent> {
        if !self.transition.is_down() {
            return None;
        }
        Some(DecodedKeyEvent {
            scan_code: fold_extended(self.scan_code, self.flags),
            flags: self.flags,
        })
    }
}

/// Folds the extended-key flag into `scan_code`.
///
/// Right Ctrl and Left Ctrl share base scan code `0x1D`; the extended one
/// becomes `0xE01D`.
pub fn fold_extended(scan_code: u16, flags: u8) -> u16 {
    if flags & LLKHF_EXTENDED != 0 {
        scan_code | EXTENDED_PREFIX
    } else {
        scan_code
    }
}

/// Snapshot handed to the diagnostic observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedKeyEvent {
    /// Scan code in the form used by the `Scancode Map` value.
    pub scan_code: u16,
    /// Raw hook flags, unmodified.
    pub flags: u8,
}

impl DecodedKeyEvent {
    /// Human-readable line, with or without the raw flags.
    pub fn snapshot(&self, show_flags: bool) -> String {
        if show_flags {
            self.to_string()
        } else {
            format!("SC 0x{:04X}", self.scan_code)
        }
    }
}

impl fmt::Display for DecodedKeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SC 0x{:04X} (flags:0x{:02X})", self.scan_code, self.flags)
    }
}
