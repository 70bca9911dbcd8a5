//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod buttons;
pub mod control;
pub mod notify;
pub mod pulse;
pub mod status;
pub mod storage;

pub use buttons::buttons_task;
pub use control::{control_task, KilnController, DUMP_LEN};
pub use notify::notify_task;
pub use pulse::pulse_task;
pub use status::status_task;
pub use storage::storage_task;
