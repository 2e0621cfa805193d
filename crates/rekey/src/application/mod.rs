//! Application layer use cases for ReKey.
//!
//! Use cases in this layer orchestrate `rekey_core` types to fulfil a user
//! goal and depend only on the traits declared in `infrastructure`
//! ([`ScancodeMapStore`], [`HookBackend`]), so tests drive them with
//! in-memory stores and mock hooks.
//!
//! # Sub-modules
//!
//! - **`manage_mappings`** – Lists, applies and removes entries of the
//!   persistent `Scancode Map`, deleting the value once no mapping is left.
//!
//! - **`diagnose`** – Toggles the keyboard monitor and hands every decoded
//!   key press to an observer on the interactive task.
//!
//! [`ScancodeMapStore`]: crate::infrastructure::storage::registry::ScancodeMapStore
//! [`HookBackend`]: crate::infrastructure::input_capture::HookBackend

pub mod diagnose;
pub mod manage_mappings;
