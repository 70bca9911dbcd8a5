//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage in the last
//! 64KB of flash.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use athanor_hal::flash::{FlashError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB on the Pico
pub const STORE_PARTITION_SIZE: usize = 64 * 1024;
pub const STORE_PARTITION_START: usize = FLASH_SIZE - STORE_PARTITION_SIZE;

/// Largest value stored under any key
pub const MAX_VALUE_LEN: usize = 256;

/// Flash range for the store partition
pub const STORE_RANGE: core::ops::Range<u32> =
    (STORE_PARTITION_START as u32)..(FLASH_SIZE as u32);

// Item header and key on top of the value
const DATA_BUFFER_LEN: usize = MAX_VALUE_LEN + 32;

/// RP2040 flash storage implementation
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl athanor_hal::FlashStorage for Rp2040FlashStorage<'_> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; DATA_BUFFER_LEN];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                let out = buffer.get_mut(..len).ok_or(FlashError::BufferTooSmall)?;
                out.copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if data.len() > MAX_VALUE_LEN {
            return Err(FlashError::BufferTooSmall);
        }
        let mut data_buffer = [0u8; DATA_BUFFER_LEN];

        map::store_item(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }

    async fn remove(&mut self, key: StorageKey) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; DATA_BUFFER_LEN];

        map::remove_item(
            &mut self.flash,
            STORE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }
}

/// Short alias used by the firmware
pub type FlashStorage<'d> = Rp2040FlashStorage<'d>;
