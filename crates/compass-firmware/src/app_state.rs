//! Firmware-wide run state
//!
//! Re-exports the hardware-independent app state from `compass_core` and
//! keeps the current [`AppRunState`] behind an embassy mutex so the bring-up
//! path and the link-monitor task can both update it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use log::info;

pub use compass_core::app_state::*;

pub static RUN_STATE: AsyncMutex<CriticalSectionRawMutex, AppRunState> =
    AsyncMutex::new(AppRunState::Uninitialized);

/// Record a run-state transition, logging it if the state changed.
pub async fn set_run_state(next: AppRunState) {
    let mut state = RUN_STATE.lock().await;
    if *state != next {
        info!("Run state: {:?} -> {:?}", *state, next);
        *state = next;
    }
}
