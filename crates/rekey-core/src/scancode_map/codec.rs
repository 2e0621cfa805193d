//! Binary codec for the Windows `Scancode Map` registry value.
//!
//! Layout:
//! ```text
//! [reserved:4][reserved:4][count:4][entry:4 * (count - 1)][terminator:4]
//! ```
//! All words are little-endian. Each entry packs `to` in the low 16 bits and
//! `from` in the high 16 bits. `count` includes the zero terminator.

use thiserror::Error;
use tracing::{debug, warn};

/// Size of the two reserved words plus the count word.
pub const HEADER_SIZE: usize = 12;

/// Size of one packed mapping entry (and of the terminator).
pub const ENTRY_SIZE: usize = 4;

/// A single remap: the key that produces `from_scan_code` behaves as the key
/// that produces `to_scan_code`.
///
/// A `to_scan_code` of zero disables the `from` key. A pair where both are
/// zero is the blob terminator, never a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mapping {
    pub from_scan_code: u16,
    pub to_scan_code: u16,
}

impl Mapping {
    pub fn new(from_scan_code: u16, to_scan_code: u16) -> Self {
        Self {
            from_scan_code,
            to_scan_code,
        }
    }

    /// Returns `true` for the all-zero terminator pair.
    pub fn is_terminator(&self) -> bool {
        self.from_scan_code == 0 && self.to_scan_code == 0
    }

    fn to_entry(self) -> u32 {
        u32::from(self.to_scan_code) | (u32::from(self.from_scan_code) << 16)
    }

    fn from_entry(entry: u32) -> Self {
        Self {
            from_scan_code: (entry >> 16) as u16,
            to_scan_code: (entry & 0xFFFF) as u16,
        }
    }
}

/// Errors produced while decoding a scancode map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScancodeMapError {
    /// The buffer cannot hold the reserved words and the count.
    #[error("scancode map too short: need at least {needed} bytes, got {available}")]
    HeaderTooShort { needed: usize, available: usize },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `mappings` into a complete `Scancode Map` blob.
///
/// The result is always `16 + 4 * mappings.len()` bytes. An empty slice
/// produces the 16-byte header-plus-terminator blob.
///
/// # Examples
///
/// ```rust
/// use rekey_core::scancode_map::{encode_mappings, Mapping};
///
/// // Left Ctrl behaves as Right Ctrl.
/// let bytes = encode_mappings(&[Mapping::new(0x001D, 0xE01D)]);
/// assert_eq!(bytes.len(), 20);
/// assert_eq!(&bytes[12..16], &0x001D_E01Du32.to_le_bytes());
/// ```
pub fn encode_mappings(mappings: &[Mapping]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(mappings.len()));

    buf.extend_from_slice(&0u32.to_le_bytes()); // reserved
    buf.extend_from_slice(&0u32.to_le_bytes()); // reserved
    buf.extend_from_slice(&(mappings.len() as u32 + 1).to_le_bytes());

    for mapping in mappings {
        buf.extend_from_slice(&mapping.to_entry().to_le_bytes());
    }

    buf.extend_from_slice(&0u32.to_le_bytes()); // terminator
    buf
}

/// Returns the encoded size in bytes of a blob holding `count` mappings.
pub fn encoded_len(count: usize) -> usize {
    HEADER_SIZE + ENTRY_SIZE * count + ENTRY_SIZE
}

/// Decodes the mappings stored in `bytes`.
///
/// Entries that would run past the end of the buffer are not read; the
/// mappings decoded up to that point are returned. All-zero entries are
/// skipped wherever they appear.
///
/// # Errors
///
/// Returns [`ScancodeMapError::HeaderTooShort`] if `bytes` is shorter than
/// [`HEADER_SIZE`].
pub fn try_decode_mappings(bytes: &[u8]) -> Result<Vec<Mapping>, ScancodeMapError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ScancodeMapError::HeaderTooShort {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    // bytes[0..8] are reserved, ignored on decode
    let count = read_u32_le(bytes, 8).unwrap_or(0);
    let declared = count.saturating_sub(1) as usize;

    let body = &bytes[HEADER_SIZE..];
    let available = body.len() / ENTRY_SIZE;
    if available < declared {
        debug!(
            declared,
            available, "scancode map truncated, decoding available entries only"
        );
    }

    let mappings = body
        .chunks_exact(ENTRY_SIZE)
        .take(declared)
        .filter_map(|chunk| read_u32_le(chunk, 0))
        .map(Mapping::from_entry)
        .filter(|m| !m.is_terminator())
        .collect();

    Ok(mappings)
}

/// Lenient variant of [`try_decode_mappings`] used on the read path.
///
/// A malformed value is treated as "no mappings configured": a buffer shorter
/// than the header yields an empty list instead of an error.
pub fn decode_mappings(bytes: &[u8]) -> Vec<Mapping> {
    match try_decode_mappings(bytes) {
        Ok(mappings) => mappings,
        Err(e) => {
            warn!("ignoring malformed scancode map: {e}");
            Vec::new()
        }
    }
}

fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    let word = buf.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
