//! Platform-independent decoding of low-level keyboard hook records.

pub mod event;

pub use event::{
    fold_extended, DecodedKeyEvent, KeyTransition, RawKeyEvent, EXTENDED_PREFIX, LLKHF_EXTENDED,
};
