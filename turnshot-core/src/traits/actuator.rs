//! Actuator driver traits
//!
//! The rig has no position feedback: every position reported here is the
//! last commanded one. Drivers do not range-check their inputs; the
//! console commands and the session validate against [`crate::config`]
//! before calling in.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trait for the camera arm servo
pub trait ServoDriver {
    /// Sweep to an absolute angle in degrees
    ///
    /// Blocks until the sweep is finished. The move is incremental, in
    /// bounded steps with a fixed delay, so the servo does not stall.
    fn move_to(&mut self, angle: u8);

    /// Get the last commanded angle
    fn get_position(&self) -> u8;

    /// Number of hardware writes that failed since creation
    fn fault_count(&self) -> u32 {
        0
    }
}

/// Trait for the turntable stepper
///
/// Position is the accumulated rotation in turntable degrees since the last
/// [`reset`](TurntableDriver::reset), not an angle modulo 360.
pub trait TurntableDriver {
    /// Set the speed used by subsequent moves, in RPM
    fn set_speed(&mut self, rpm: u16);

    /// Get the configured speed in RPM
    fn get_speed(&self) -> u16;

    /// Move to an absolute accumulated position in degrees
    ///
    /// Blocks until all steps have been issued.
    fn move_to(&mut self, degrees: u32);

    /// Get the accumulated position in degrees
    fn get_position(&self) -> u32;

    /// Zero the accumulated position without moving
    fn reset(&mut self);

    /// Advance by a relative angle in degrees
    fn rotate_by(&mut self, degrees: u32) {
        let target = self.get_position().saturating_add(degrees);
        self.move_to(target);
    }

    /// Number of hardware writes that failed since creation
    fn fault_count(&self) -> u32 {
        0
    }
}

/// Trait for a dimmable light
pub trait LightDriver {
    /// Set the PWM duty in percent (0-100), applied immediately
    fn set_brightness(&mut self, duty: u8);

    /// Get the last commanded duty in percent
    fn get_brightness(&self) -> u8;

    /// Number of hardware writes that failed since creation
    fn fault_count(&self) -> u32 {
        0
    }
}

/// The two light fixtures on the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LightId {
    /// Back light behind the subject
    Back,
    /// Dome light above the subject (wired inverted: 100% duty is off)
    Dome,
}

impl LightId {
    /// Map the console index (0 = back, 1 = dome)
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(LightId::Back),
            1 => Some(LightId::Dome),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTurntable;

    #[test]
    fn test_light_from_index() {
        assert_eq!(LightId::from_index(0), Some(LightId::Back));
        assert_eq!(LightId::from_index(1), Some(LightId::Dome));
        assert_eq!(LightId::from_index(2), None);
    }

    #[test]
    fn test_rotate_by_accumulates() {
        let mut table = MockTurntable::default();
        table.rotate_by(45);
        table.rotate_by(45);
        assert_eq!(table.get_position(), 90);
        assert_eq!(table.moves, [45, 90]);
    }
}
