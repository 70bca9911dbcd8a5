//! Profile persistence task
//!
//! Flash writes stall execution from flash, so they run here instead of in
//! the control task's tick path.

use defmt::*;

use athanor_core::controller::StoreRequest;

use crate::channels::STORE;
use crate::persistence::Persistence;

/// Apply store requests queued by the controller
#[embassy_executor::task]
pub async fn storage_task(mut persistence: Persistence<'static>) {
    info!("Storage task started");

    loop {
        let result = match STORE.receive().await {
            StoreRequest::Save(profile) => persistence.save_profile(&profile).await,
            StoreRequest::Clear => persistence.clear_profile().await,
        };

        match result {
            Ok(()) => debug!("Active profile updated"),
            Err(e) => warn!("Failed to update active profile: {:?}", e),
        }
    }
}
