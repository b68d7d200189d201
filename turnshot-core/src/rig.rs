//! The set of actuators making up the imaging rig
//!
//! Owning the drivers in one place keeps every actuator reachable from a
//! single control thread without shared statics.

use crate::config::{LightConfig, RigConfig};
use crate::traits::{LightDriver, LightId, ServoDriver, TurntableDriver};

/// Snapshot of commanded actuator positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RigStatus {
    /// Arm angle (degrees)
    pub arm_angle: u8,
    /// Accumulated turntable rotation (degrees)
    pub turntable_degrees: u32,
    /// Turntable speed (RPM)
    pub turntable_rpm: u16,
    /// Back light duty (percent)
    pub back_duty: u8,
    /// Dome light duty (percent)
    pub dome_duty: u8,
}

/// Failed hardware writes per actuator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RigFaults {
    pub arm: u32,
    pub turntable: u32,
    pub back_light: u32,
    pub dome_light: u32,
}

impl RigFaults {
    /// Check if no actuator has a fault
    pub fn is_clear(&self) -> bool {
        *self == RigFaults::default()
    }

    /// Faults added since an earlier snapshot
    pub fn since(&self, earlier: &RigFaults) -> RigFaults {
        RigFaults {
            arm: self.arm.saturating_sub(earlier.arm),
            turntable: self.turntable.saturating_sub(earlier.turntable),
            back_light: self.back_light.saturating_sub(earlier.back_light),
            dome_light: self.dome_light.saturating_sub(earlier.dome_light),
        }
    }

    /// Add the counts of another set
    pub fn merge(&mut self, other: &RigFaults) {
        self.arm = self.arm.saturating_add(other.arm);
        self.turntable = self.turntable.saturating_add(other.turntable);
        self.back_light = self.back_light.saturating_add(other.back_light);
        self.dome_light = self.dome_light.saturating_add(other.dome_light);
    }
}

/// Arm servo, turntable stepper and both lights
pub struct Rig<A, T, L> {
    /// Camera arm servo
    pub arm: A,
    /// Turntable stepper
    pub turntable: T,
    /// Back light
    pub back_light: L,
    /// Dome light
    pub dome_light: L,
}

impl<A, T, L> Rig<A, T, L>
where
    A: ServoDriver,
    T: TurntableDriver,
    L: LightDriver,
{
    /// Assemble a rig from its drivers
    pub fn new(arm: A, turntable: T, back_light: L, dome_light: L) -> Self {
        Self {
            arm,
            turntable,
            back_light,
            dome_light,
        }
    }

    /// Bring every actuator to its rest state
    ///
    /// Arm raised to home, turntable at default speed with its position
    /// zeroed, both lights off.
    pub fn park(&mut self, config: &RigConfig) {
        self.arm.move_to(config.arm.home_angle);
        self.turntable.set_speed(config.turntable.default_rpm);
        self.turntable.reset();
        self.back_light.set_brightness(config.lights.back.off_duty);
        self.dome_light.set_brightness(config.lights.dome.off_duty);
    }

    /// Get a light by id, mutably
    pub fn light_mut(&mut self, light: LightId) -> &mut L {
        match light {
            LightId::Back => &mut self.back_light,
            LightId::Dome => &mut self.dome_light,
        }
    }

    /// Switch the capture-side light to its on or off preset
    pub fn set_capture_light(&mut self, lights: &LightConfig, on: bool) {
        let limits = lights.limits(lights.capture_light);
        let duty = if on { limits.on_duty } else { limits.off_duty };
        self.light_mut(lights.capture_light).set_brightness(duty);
    }

    /// Check if the arm is at its raised home angle
    pub fn arm_at_home(&self, config: &RigConfig) -> bool {
        self.arm.get_position() == config.arm.home_angle
    }

    /// Snapshot the commanded positions
    pub fn status(&self) -> RigStatus {
        RigStatus {
            arm_angle: self.arm.get_position(),
            turntable_degrees: self.turntable.get_position(),
            turntable_rpm: self.turntable.get_speed(),
            back_duty: self.back_light.get_brightness(),
            dome_duty: self.dome_light.get_brightness(),
        }
    }

    /// Snapshot the driver fault counters
    pub fn faults(&self) -> RigFaults {
        RigFaults {
            arm: self.arm.fault_count(),
            turntable: self.turntable.fault_count(),
            back_light: self.back_light.fault_count(),
            dome_light: self.dome_light.fault_count(),
        }
    }
}
