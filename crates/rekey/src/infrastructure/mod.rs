//! Infrastructure layer for ReKey.
//!
//! Contains OS-facing adapters: the low-level keyboard hook, the registry
//! store for the `Scancode Map` value and the TOML config file.
//!
//! **Dependency rule**: this layer may depend on `rekey_core`, but MUST NOT
//! import from `application`.

pub mod input_capture;
pub mod storage;
