//! Read-path and write-path decisions around the `Scancode Map` value.
//!
//! The registry distinguishes "value absent" from "value present but holding
//! no mappings". [`ScancodeMapState`] keeps the two apart on read, and
//! [`WriteBack`] decides which one to produce on write.

use super::codec::{decode_mappings, encode_mappings, Mapping};

/// What the host found when it read the `Scancode Map` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScancodeMapState {
    /// The value does not exist.
    Absent,
    /// The value exists but decodes to zero mappings (including malformed data).
    Empty,
    /// The value holds at least one mapping.
    NonEmpty(Vec<Mapping>),
}

impl ScancodeMapState {
    /// Classifies the raw registry value, `None` meaning the value is missing.
    pub fn from_value(value: Option<&[u8]>) -> Self {
        match value {
            None => Self::Absent,
            Some(bytes) => {
                let mappings = decode_mappings(bytes);
                if mappings.is_empty() {
                    Self::Empty
                } else {
                    Self::NonEmpty(mappings)
                }
            }
        }
    }

    /// The decoded mappings; empty unless [`ScancodeMapState::NonEmpty`].
    pub fn mappings(&self) -> &[Mapping] {
        match self {
            Self::NonEmpty(m) => m,
            Self::Absent | Self::Empty => &[],
        }
    }

    pub fn into_mappings(self) -> Vec<Mapping> {
        match self {
            Self::NonEmpty(m) => m,
            Self::Absent | Self::Empty => Vec::new(),
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// What the host should do with the registry value after editing mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteBack {
    /// Remove the value entirely.
    Delete,
    /// Store these bytes as the new value.
    Write(Vec<u8>),
}

impl WriteBack {
    /// An empty mapping list deletes the value instead of writing a 16-byte blob.
    pub fn for_mappings(mappings: &[Mapping]) -> Self {
        if mappings.is_empty() {
            Self::Delete
        } else {
            Self::Write(encode_mappings(mappings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_is_absent() {
        let state = ScancodeMapState::from_value(None);
        assert_eq!(state, ScancodeMapState::Absent);
        assert!(!state.is_present());
        assert!(state.mappings().is_empty());
    }

    #[test]
    fn test_header_only_blob_is_empty() {
        let bytes = encode_mappings(&[]);
        let state = ScancodeMapState::from_value(Some(&bytes));
        assert_eq!(state, ScancodeMapState::Empty);
        assert!(state.is_present());
    }

    #[test]
    fn test_malformed_value_is_empty_not_absent() {
        let state = ScancodeMapState::from_value(Some(&[1, 2, 3]));
        assert_eq!(state, ScancodeMapState::Empty);
    }

    #[test]
    fn test_blob_with_mappings_is_non_empty() {
        // Arrange
        let mappings = vec![Mapping::new(0x003A, 0x001D)];
        let bytes = encode_mappings(&mappings);

        // Act
        let state = ScancodeMapState::from_value(Some(&bytes));

        // Assert
        assert_eq!(state.mappings(), mappings.as_slice());
        assert_eq!(state.into_mappings(), mappings);
    }

    #[test]
    fn test_write_back_deletes_when_empty() {
        assert_eq!(WriteBack::for_mappings(&[]), WriteBack::Delete);
    }

    #[test]
    fn test_write_back_encodes_when_non_empty() {
        let mappings = [Mapping::new(0x001D, 0xE01D)];
        assert_eq!(
            WriteBack::for_mappings(&mappings),
            WriteBack::Write(encode_mappings(&mappings))
        );
    }
}
