//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use arbor_core::state::PanelInput;

/// Channel capacity for panel inputs
const INPUT_CHANNEL_SIZE: usize = 8;

/// Panel inputs with the uptime (ms) they were read at
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, (PanelInput, u64), INPUT_CHANNEL_SIZE> =
    Channel::new();
