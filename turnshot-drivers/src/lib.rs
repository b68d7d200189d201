//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the actuator traits
//! defined in turnshot-core, written against `embedded-hal` 1.0 so any
//! HAL with PWM outputs, GPIO and a blocking delay can drive the rig:
//!
//! - Hobby servo on a 50 Hz PWM channel, swept in small steps
//! - Step/dir stepper driver (A4988, DRV8825, TMC2209 in standalone mode)
//! - PWM dimmed lights

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod light;
pub mod servo;
pub mod stepper;

#[cfg(test)]
pub(crate) mod mock;

pub use light::PwmLight;
pub use servo::{ServoConfig, SweepServo};
pub use stepper::{StepDirStepper, StepperConfig};
