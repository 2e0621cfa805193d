//! Persistence of the `Scancode Map` value.
//!
//! [`ScancodeMapStore`] is the seam between the mapping use cases and the
//! system registry. The Windows implementation opens
//! `HKLM\SYSTEM\CurrentControlSet\Control\Keyboard Layout` in the 64-bit view,
//! so a 32-bit build still edits the value the keyboard driver reads.

use std::io;

use thiserror::Error;

/// Error type for `Scancode Map` storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The process lacks the rights for this operation (writes need an
    /// elevated process).
    #[error("permission denied while trying to {operation}; run ReKey as administrator")]
    PermissionDenied { operation: &'static str },

    /// Any other registry or I/O failure.
    #[error("failed to {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// No registry exists on this platform.
    #[error("the Windows registry is not available on this platform")]
    Unsupported,
}

impl StoreError {
    /// Maps an I/O error, singling out permission failures.
    pub fn from_io(operation: &'static str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { operation }
        } else {
            Self::Io { operation, source }
        }
    }
}

/// Read/write access to the raw `Scancode Map` bytes.
#[cfg_attr(test, mockall::automock)]
pub trait ScancodeMapStore: Send + Sync {
    /// Returns the stored bytes, or `None` if the value does not exist.
    fn read(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Creates or replaces the value with `bytes` (REG_BINARY).
    fn write(&self, bytes: &[u8]) -> Result<(), StoreError>;

    /// Deletes the value. Returns `false` if it did not exist.
    fn delete(&self) -> Result<bool, StoreError>;
}

#[cfg(target_os = "windows")]
pub use self::windows_registry::RegistryStore;

#[cfg(target_os = "windows")]
mod windows_registry {
    use std::io;

    use tracing::{debug, warn};
    use winreg::enums::{
        RegType, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_READ, KEY_SET_VALUE, KEY_WOW64_64KEY,
    };
    use winreg::{RegKey, RegValue};

    use super::{ScancodeMapStore, StoreError};

    /// `Scancode Map` store backed by `HKEY_LOCAL_MACHINE`.
    #[derive(Debug, Clone)]
    pub struct RegistryStore {
        key_path: String,
        value_name: String,
    }

    impl RegistryStore {
        pub fn new(key_path: impl Into<String>, value_name: impl Into<String>) -> Self {
            Self {
                key_path: key_path.into(),
                value_name: value_name.into(),
            }
        }

        fn open(&self, flags: u32) -> io::Result<RegKey> {
            RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey_with_flags(&self.key_path, flags | KEY_WOW64_64KEY)
        }
    }

    impl ScancodeMapStore for RegistryStore {
        fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
            let key = match self.open(KEY_READ) {
                Ok(key) => key,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(StoreError::from_io("open the keyboard layout key", e)),
            };

            match key.get_raw_value(&self.value_name) {
                Ok(value) if matches!(value.vtype, RegType::REG_BINARY) => {
                    debug!(len = value.bytes.len(), "read {}", self.value_name);
                    Ok(Some(value.bytes))
                }
                Ok(value) => {
                    warn!(
                        "{} has type {:?}, expected REG_BINARY; treating as absent",
                        self.value_name, value.vtype
                    );
                    Ok(None)
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StoreError::from_io("read the Scancode Map value", e)),
            }
        }

        fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
            let (key, _) = RegKey::predef(HKEY_LOCAL_MACHINE)
                .create_subkey_with_flags(&self.key_path, KEY_SET_VALUE | KEY_WOW64_64KEY)
                .map_err(|e| StoreError::from_io("open the keyboard layout key for writing", e))?;

            let value = RegValue {
                bytes: bytes.to_vec(),
                vtype: RegType::REG_BINARY,
            };
            key.set_raw_value(&self.value_name, &value)
                .map_err(|e| StoreError::from_io("write the Scancode Map value", e))?;
            debug!(len = bytes.len(), "wrote {}", self.value_name);
            Ok(())
        }

        fn delete(&self) -> Result<bool, StoreError> {
            let key = match self.open(KEY_QUERY_VALUE | KEY_SET_VALUE) {
                Ok(key) => key,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
                Err(e) => {
                    return Err(StoreError::from_io(
                        "open the keyboard layout key for writing",
                        e,
                    ))
                }
            };

            match key.delete_value(&self.value_name) {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(StoreError::from_io("delete the Scancode Map value", e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_singled_out() {
        let err = StoreError::from_io("write", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, StoreError::PermissionDenied { operation: "write" }));
        assert!(err.to_string().contains("administrator"));
    }

    #[test]
    fn test_other_io_errors_keep_their_source() {
        let err = StoreError::from_io("read", io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(matches!(err, StoreError::Io { operation: "read", .. }));
        assert_eq!(err.to_string(), "failed to read: boom");
    }
}
