//! Storage infrastructure: the `Scancode Map` value and the config file.
//!
//! - `registry` – the [`registry::ScancodeMapStore`] seam and its Windows
//!   registry implementation.
//! - `memory` – an in-memory store with the same semantics.
//! - `config` – reading the TOML configuration file, with defaults when it
//!   does not exist yet (first run).

pub mod config;
pub mod memory;
pub mod registry;
