//! # rekey-core
//!
//! Shared library for ReKey containing the `Scancode Map` codec, the key
//! catalog, and the decoding of raw low-level keyboard records.
//!
//! It has zero dependencies on OS APIs or the registry.  The `rekey` host
//! crate reads and writes the registry value and owns the keyboard hook; this
//! crate only turns bytes and hook records into typed values and back.
//!
//! # Architecture overview
//!
//! Windows remaps keys at boot from a single binary registry value,
//! `HKLM\SYSTEM\CurrentControlSet\Control\Keyboard Layout\Scancode Map`.
//! Each entry tells the keyboard driver "when the key with scan code X is
//! pressed, report scan code Y instead".
//!
//! - **`scancode_map`** – The binary layout of that value: a 12-byte header,
//!   packed 32-bit entries and a zero terminator.  Also the tri-state read
//!   result (absent / empty / mappings) and the write-back decision.
//!
//! - **`input`** – The platform-neutral form of a `WH_KEYBOARD_LL` record and
//!   the folding of the extended-key flag into the scan code, used by the
//!   live diagnostic.
//!
//! - **`keys`** – Named keys the user can choose from, and parsing of key
//!   arguments.

pub mod input;
pub mod keys;
pub mod scancode_map;

pub use input::{DecodedKeyEvent, KeyTransition, RawKeyEvent};
pub use keys::{key_display_name, parse_key, KeyInfo, KeyParseError};
pub use scancode_map::{
    decode_mappings, encode_mappings, try_decode_mappings, Mapping, ScancodeMapError,
    ScancodeMapState, WriteBack,
};
