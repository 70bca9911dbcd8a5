//! Flash storage abstractions
//!
//! Persistent key-value storage implemented by chip-specific HALs on top of
//! their flash memory.

/// Storage keys
///
/// The storage implementation handles wear leveling and integrity; values
/// are opaque postcard blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Profile of the cycle in progress, resumed after a restart
    ActiveProfile = 0,
    /// Firing configuration overriding the built-in defaults
    FiringConfig = 1,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::ActiveProfile),
            1 => Some(StorageKey::FiringConfig),
            _ => None,
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
}

/// Flash storage trait
///
/// Wear-leveled key-value storage. Implementations should keep writes
/// atomic per key: a power cut leaves either the old or the new value.
pub trait FlashStorage {
    /// Read a value by key into `buffer`, returning its length
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&mut self, key: StorageKey) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        let Some(first) = buffer.first_mut() else {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        };
        *first = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        let Some(&first) = buffer.first() else {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        };
        match StorageKey::from_u8(first) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for key in [StorageKey::ActiveProfile, StorageKey::FiringConfig] {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(StorageKey::from_u8(7), None);
    }
}
