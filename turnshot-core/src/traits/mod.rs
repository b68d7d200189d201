//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the actuator drivers.

pub mod actuator;

pub use actuator::{LightDriver, LightId, ServoDriver, TurntableDriver};
