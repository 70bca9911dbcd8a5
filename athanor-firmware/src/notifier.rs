//! Notifier forwarding to the notification task
//!
//! Runs inside the control task, so it never waits: a full notification
//! channel drops the alert with a warning.

use defmt::*;

use athanor_core::traits::{LiveTelemetry, Notification, Notifier};

use crate::channels::{LIVE, NOTIFICATIONS, RESTART};

/// [`Notifier`] backed by the static channels
pub struct ChannelNotifier;

impl Notifier for ChannelNotifier {
    fn notify(&mut self, notification: &Notification) {
        if NOTIFICATIONS.try_send(*notification).is_err() {
            warn!("Notification dropped: {:?}", notification);
        }
    }

    fn push_live(&mut self, live: &LiveTelemetry) {
        LIVE.signal(live.clone());
    }

    fn request_restart(&mut self) {
        RESTART.signal(());
    }
}
