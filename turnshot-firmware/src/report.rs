//! Logging of station activity
//!
//! The core crates return what happened each tick; this is the only place
//! that turns it into log output.

use defmt::*;

use turnshot_core::{StationError, TickReport};

/// Log one tick of the station
pub fn log_tick(report: &TickReport) {
    if let Some(outcome) = &report.command {
        match outcome {
            Ok(command) => debug!("Command {:?} done", command),
            Err(e) => info!("Command rejected: {}", e.message()),
        }
    }

    if let Some(transition) = &report.transition {
        info!(
            "Session {:?} -> {:?}: {}",
            transition.from,
            transition.to,
            transition.message()
        );
        if transition.event.ends_session() {
            info!("Imaging session finished, waiting for peer");
        }
    }

    if !report.faults.is_clear() {
        warn!("Actuator write failures: {:?}", report.faults);
    }

    for error in &report.errors {
        match error {
            StationError::Link(channel) => warn!("{:?} link error", channel),
            StationError::Framing(channel, e) => {
                warn!("{:?} line dropped: {}", channel, e.message())
            }
        }
    }
}
