//! Configuration types
//!
//! Board-agnostic configuration structures. The defaults carry the rig's
//! calibrated values; boards may override them before building a station.

pub mod types;

pub use types::*;
