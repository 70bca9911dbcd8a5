//! Flash persistence
//!
//! Loads the firing configuration (falling back to built-in defaults) and
//! the profile of an interrupted cycle, and stores/clears the active profile
//! on request from the controller.

use defmt::*;

use athanor_core::config::FiringConfig;
use athanor_core::profile::{
    decode_profile, encode_profile, FiringProfile, ProfileError, MAX_PROFILE_BYTES,
};
use athanor_hal_rp2040::flash::{FlashError, FlashStorage, MAX_VALUE_LEN};
use athanor_hal_rp2040::{FlashStorageTrait, StorageKey};

/// Persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Flash operation failed
    Flash(FlashError),
    /// Stored bytes did not decode
    Deserialize,
    /// Profile could not be encoded or failed validation
    Profile(ProfileError),
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

impl From<ProfileError> for PersistError {
    fn from(e: ProfileError) -> Self {
        PersistError::Profile(e)
    }
}

/// Flash-backed store for configuration and the active profile
pub struct Persistence<'d> {
    storage: FlashStorage<'d>,
}

impl<'d> Persistence<'d> {
    /// Create a new persistence manager
    pub fn new(storage: FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Load the firing configuration, or defaults when missing or invalid
    pub async fn load_config(&mut self) -> FiringConfig {
        match self.read_config().await {
            Ok(config) => match config.validate() {
                Ok(()) => {
                    info!("Loaded firing configuration from flash");
                    config
                }
                Err(e) => {
                    warn!("Stored configuration rejected: {:?}, using defaults", e);
                    FiringConfig::default()
                }
            },
            Err(PersistError::Flash(FlashError::NotFound)) => {
                info!("No stored configuration, using defaults");
                FiringConfig::default()
            }
            Err(e) => {
                warn!("Failed to load configuration: {:?}, using defaults", e);
                FiringConfig::default()
            }
        }
    }

    async fn read_config(&mut self) -> Result<FiringConfig, PersistError> {
        let mut buffer = [0u8; MAX_VALUE_LEN];
        let len = self
            .storage
            .read(StorageKey::FiringConfig, &mut buffer)
            .await?;
        postcard::from_bytes(&buffer[..len]).map_err(|_| PersistError::Deserialize)
    }

    /// Profile of a cycle interrupted by a reset, if any
    pub async fn load_active_profile(&mut self) -> Option<FiringProfile> {
        let mut buffer = [0u8; MAX_PROFILE_BYTES];
        match self.storage.read(StorageKey::ActiveProfile, &mut buffer).await {
            Ok(len) => match decode_profile(&buffer[..len]) {
                Ok(profile) => {
                    info!("Found interrupted cycle ({} segments)", profile.len());
                    Some(profile)
                }
                Err(e) => {
                    warn!("Stored profile unreadable: {:?}, discarding", e);
                    if let Err(e) = self.clear_profile().await {
                        warn!("Failed to discard stored profile: {:?}", e);
                    }
                    None
                }
            },
            Err(FlashError::NotFound) => None,
            Err(e) => {
                warn!("Failed to read stored profile: {:?}", e);
                None
            }
        }
    }

    /// Store the active profile
    pub async fn save_profile(&mut self, profile: &FiringProfile) -> Result<(), PersistError> {
        let mut buffer = [0u8; MAX_PROFILE_BYTES];
        let bytes = encode_profile(profile, &mut buffer)?;
        self.storage.write(StorageKey::ActiveProfile, bytes).await?;
        Ok(())
    }

    /// Forget the active profile
    pub async fn clear_profile(&mut self) -> Result<(), PersistError> {
        self.storage.remove(StorageKey::ActiveProfile).await?;
        Ok(())
    }
}
