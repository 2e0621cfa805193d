//! ManageMappingsUseCase: list, apply, remove and clear key remaps.
//!
//! Every operation reads the current `Scancode Map` through a
//! [`ScancodeMapStore`], edits the decoded list and writes it back. When the
//! edited list is empty the value is deleted rather than written as an empty
//! blob, which is how Windows itself represents "no remaps".
//!
//! Changes take effect after the next reboot; the keyboard driver reads the
//! value only at boot.

use rekey_core::{key_display_name, Mapping, ScancodeMapState, WriteBack};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::storage::registry::{ScancodeMapStore, StoreError};

/// Error type for the manage-mappings use case.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// `0x0000 → 0x0000` would be written as the blob terminator.
    #[error("cannot map scan code 0x0000 to 0x0000")]
    ZeroMapping,
}

/// Result of [`ManageMappingsUseCase::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The mapping was appended.
    Added,
    /// An existing mapping for the same source key was replaced.
    Replaced { previous: Mapping },
    /// The identical mapping was already present; nothing was written.
    Unchanged,
}

/// Formats a mapping as `"From → To"` using catalog names.
pub fn describe_mapping(mapping: &Mapping) -> String {
    format!(
        "{} → {}",
        key_display_name(mapping.from_scan_code),
        key_display_name(mapping.to_scan_code)
    )
}

/// Mapping operations over an injected [`ScancodeMapStore`].
pub struct ManageMappingsUseCase<S: ScancodeMapStore> {
    store: S,
}

impl<S: ScancodeMapStore> ManageMappingsUseCase<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads and classifies the current value.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Store`] if the value cannot be read.
    pub fn load(&self) -> Result<ScancodeMapState, MappingError> {
        let raw = self.store.read()?;
        Ok(ScancodeMapState::from_value(raw.as_deref()))
    }

    /// Adds `mapping`, replacing any existing mapping with the same source key.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::ZeroMapping`] for the all-zero pair, or
    /// [`MappingError::Store`] if reading or writing fails.
    pub fn apply(&self, mapping: Mapping) -> Result<ApplyOutcome, MappingError> {
        if mapping.is_terminator() {
            return Err(MappingError::ZeroMapping);
        }

        let mut mappings = self.load()?.into_mappings();
        let outcome = match mappings
            .iter_mut()
            .find(|m| m.from_scan_code == mapping.from_scan_code)
        {
            Some(existing) if *existing == mapping => ApplyOutcome::Unchanged,
            Some(existing) => {
                let previous = *existing;
                *existing = mapping;
                ApplyOutcome::Replaced { previous }
            }
            None => {
                mappings.push(mapping);
                ApplyOutcome::Added
            }
        };

        if outcome != ApplyOutcome::Unchanged {
            self.commit(&mappings)?;
            info!("applied mapping {}", describe_mapping(&mapping));
        }
        Ok(outcome)
    }

    /// Removes the mapping whose source key is `from_scan_code`.
    ///
    /// Returns the removed mapping, or `None` (without writing) if there was
    /// none. Removing the last mapping deletes the value.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Store`] if reading or writing fails.
    pub fn remove(&self, from_scan_code: u16) -> Result<Option<Mapping>, MappingError> {
        let mut mappings = self.load()?.into_mappings();
        let Some(index) = mappings
            .iter()
            .position(|m| m.from_scan_code == from_scan_code)
        else {
            debug!(from_scan_code, "no mapping to remove");
            return Ok(None);
        };

        let removed = mappings.remove(index);
        self.commit(&mappings)?;
        info!("removed mapping {}", describe_mapping(&removed));
        Ok(Some(removed))
    }

    /// Deletes the value. Returns `false` if there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Store`] if the deletion fails.
    pub fn clear(&self) -> Result<bool, MappingError> {
        let existed = self.store.delete()?;
        if existed {
            info!("scancode map cleared");
        }
        Ok(existed)
    }

    fn commit(&self, mappings: &[Mapping]) -> Result<(), MappingError> {
        match WriteBack::for_mappings(mappings) {
            WriteBack::Delete => {
                self.store.delete()?;
            }
            WriteBack::Write(bytes) => self.store.write(&bytes)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::memory::MemoryStore;
    use crate::infrastructure::storage::registry::MockScancodeMapStore;
    use rekey_core::{decode_mappings, encode_mappings};

    const CAPS: u16 = 0x003A;
    const LCTRL: u16 = 0x001D;
    const RCTRL: u16 = 0xE01D;

    fn stored(use_case: &ManageMappingsUseCase<MemoryStore>) -> Option<Vec<Mapping>> {
        use_case.store().value().map(|b| decode_mappings(&b))
    }

    #[test]
    fn test_load_distinguishes_absent_and_empty() {
        let absent = ManageMappingsUseCase::new(MemoryStore::new());
        assert_eq!(absent.load().unwrap(), ScancodeMapState::Absent);

        let empty = ManageMappingsUseCase::new(MemoryStore::with_value(encode_mappings(&[])));
        assert_eq!(empty.load().unwrap(), ScancodeMapState::Empty);
    }

    #[test]
    fn test_apply_to_absent_value_writes_single_mapping() {
        // Arrange
        let use_case = ManageMappingsUseCase::new(MemoryStore::new());

        // Act
        let outcome = use_case.apply(Mapping::new(CAPS, LCTRL)).unwrap();

        // Assert
        assert_eq!(outcome, ApplyOutcome::Added);
        assert_eq!(stored(&use_case), Some(vec![Mapping::new(CAPS, LCTRL)]));
    }

    #[test]
    fn test_apply_keeps_existing_mappings_for_other_keys() {
        let use_case = ManageMappingsUseCase::new(MemoryStore::with_value(encode_mappings(&[
            Mapping::new(CAPS, LCTRL),
        ])));

        use_case.apply(Mapping::new(LCTRL, CAPS)).unwrap();

        assert_eq!(
            stored(&use_case),
            Some(vec![Mapping::new(CAPS, LCTRL), Mapping::new(LCTRL, CAPS)])
        );
    }

    #[test]
    fn test_apply_replaces_mapping_for_same_source_key() {
        // Arrange
        let use_case = ManageMappingsUseCase::new(MemoryStore::with_value(encode_mappings(&[
            Mapping::new(CAPS, LCTRL),
        ])));

        // Act
        let outcome = use_case.apply(Mapping::new(CAPS, RCTRL)).unwrap();

        // Assert
        assert_eq!(
            outcome,
            ApplyOutcome::Replaced {
                previous: Mapping::new(CAPS, LCTRL)
            }
        );
        assert_eq!(stored(&use_case), Some(vec![Mapping::new(CAPS, RCTRL)]));
    }

    #[test]
    fn test_apply_identical_mapping_does_not_write() {
        let bytes = encode_mappings(&[Mapping::new(CAPS, LCTRL)]);
        let mut store = MockScancodeMapStore::new();
        store.expect_read().return_once(move || Ok(Some(bytes)));
        store.expect_write().never();
        store.expect_delete().never();

        let outcome = ManageMappingsUseCase::new(store)
            .apply(Mapping::new(CAPS, LCTRL))
            .unwrap();

        assert_eq!(outcome, ApplyOutcome::Unchanged);
    }

    #[test]
    fn test_apply_rejects_zero_pair() {
        let use_case = ManageMappingsUseCase::new(MemoryStore::new());
        assert!(matches!(
            use_case.apply(Mapping::new(0, 0)),
            Err(MappingError::ZeroMapping)
        ));
        assert_eq!(use_case.store().value(), None);
    }

    #[test]
    fn test_apply_surfaces_permission_denied() {
        // Arrange
        let mut store = MockScancodeMapStore::new();
        store.expect_read().returning(|| Ok(None));
        store
            .expect_write()
            .times(1)
            .returning(|_| Err(StoreError::PermissionDenied { operation: "write" }));

        // Act
        let result = ManageMappingsUseCase::new(store).apply(Mapping::new(CAPS, LCTRL));

        // Assert
        assert!(matches!(
            result,
            Err(MappingError::Store(StoreError::PermissionDenied { .. }))
        ));
    }

    #[test]
    fn test_remove_last_mapping_deletes_value() {
        // Arrange
        let bytes = encode_mappings(&[Mapping::new(CAPS, LCTRL)]);
        let mut store = MockScancodeMapStore::new();
        store.expect_read().return_once(move || Ok(Some(bytes)));
        store.expect_write().never();
        store.expect_delete().times(1).returning(|| Ok(true));

        // Act
        let removed = ManageMappingsUseCase::new(store).remove(CAPS).unwrap();

        // Assert
        assert_eq!(removed, Some(Mapping::new(CAPS, LCTRL)));
    }

    #[test]
    fn test_remove_one_of_several_rewrites_rest() {
        let use_case = ManageMappingsUseCase::new(MemoryStore::with_value(encode_mappings(&[
            Mapping::new(CAPS, LCTRL),
            Mapping::new(LCTRL, CAPS),
        ])));

        use_case.remove(CAPS).unwrap();

        assert_eq!(stored(&use_case), Some(vec![Mapping::new(LCTRL, CAPS)]));
    }

    #[test]
    fn test_remove_missing_mapping_writes_nothing() {
        let mut store = MockScancodeMapStore::new();
        store.expect_read().returning(|| Ok(None));
        store.expect_write().never();
        store.expect_delete().never();

        assert_eq!(ManageMappingsUseCase::new(store).remove(CAPS).unwrap(), None);
    }

    #[test]
    fn test_clear_reports_whether_value_existed() {
        let use_case = ManageMappingsUseCase::new(MemoryStore::with_value(encode_mappings(&[
            Mapping::new(CAPS, LCTRL),
        ])));

        assert!(use_case.clear().unwrap());
        assert!(!use_case.clear().unwrap());
        assert_eq!(use_case.load().unwrap(), ScancodeMapState::Absent);
    }

    #[test]
    fn test_describe_mapping_uses_catalog_names() {
        assert_eq!(describe_mapping(&Mapping::new(CAPS, LCTRL)), "CapsLock → Left Ctrl");
        assert_eq!(describe_mapping(&Mapping::new(0xE05B, 0)), "Left Win → Disabled");
    }
}
