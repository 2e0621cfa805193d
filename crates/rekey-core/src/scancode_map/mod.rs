//! The `Scancode Map` registry value: binary codec and read/write decisions.

pub mod codec;
pub mod state;

pub use codec::{
    decode_mappings, encode_mappings, encoded_len, try_decode_mappings, Mapping, ScancodeMapError,
    ENTRY_SIZE, HEADER_SIZE,
};
pub use state::{ScancodeMapState, WriteBack};
