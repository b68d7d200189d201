//! Board-agnostic core logic for the imaging rig firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Actuator traits (arm servo, turntable stepper, lights)
//! - Rig configuration and safe ranges
//! - Serial channels (polled link + line framer)
//! - Operator console commands
//! - Imaging session state machine
//! - The station controller tying it all together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod channel;
pub mod cli;
pub mod config;
pub mod rig;
pub mod session;
pub mod station;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use cli::{CliError, CommandError, CommandId, COMMANDS};
pub use config::RigConfig;
pub use rig::{Rig, RigFaults, RigStatus};
pub use station::{Station, StationError, TickReport, PROMPT};
