//! Keypad polling task

use arbor_core::traits::Keypad;
use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use crate::board::Panel;
use crate::channels::INPUT_CHANNEL;

/// Poll interval; short enough that no press is missed
const POLL_INTERVAL_MS: u64 = 10;

/// Polls the panel and forwards every edge to the controller
#[embassy_executor::task]
pub async fn keypad_task(mut panel: Panel) {
    info!("Keypad task started");

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));

    loop {
        ticker.next().await;
        while let Some(input) = panel.poll() {
            INPUT_CHANNEL.send((input, Instant::now().as_millis())).await;
        }
    }
}
