//! Configuration type definitions
//!
//! Safe mechanical ranges and session parameters. Every value the console
//! or the session passes to an actuator is checked against these first.

use crate::traits::LightId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound for any light duty, in percent
pub const MAX_DUTY: u8 = 100;

/// Errors found by [`RigConfig::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `min_angle > max_angle`
    ArmRange,
    /// Home angle outside the arm range
    ArmHomeOutOfRange,
    /// Capture angle outside the arm range
    ArmCaptureOutOfRange,
    /// Capture angle equals home angle, so a session could never lower the arm
    ArmCaptureIsHome,
    /// `min_rpm > max_rpm` or `min_rpm == 0`
    SpeedRange,
    /// Default speed outside the speed range
    DefaultSpeedOutOfRange,
    /// Turntable increment is zero or larger than a revolution
    InvalidIncrement,
    /// Revolution is zero degrees
    InvalidRevolution,
    /// Manual rotation limits are zero
    InvalidManualLimits,
    /// Light limits inconsistent (min > max, max > 100, or on/off outside limits)
    LightLimits(LightId),
}

/// Camera arm servo configuration (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArmConfig {
    /// Lowest safe angle
    pub min_angle: u8,
    /// Highest safe angle
    pub max_angle: u8,
    /// Raised rest position; a session starts and ends here
    pub home_angle: u8,
    /// Lowered position used while capturing
    pub capture_angle: u8,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            min_angle: 15,
            max_angle: 170,
            home_angle: 15,
            capture_angle: 156,
        }
    }
}

impl ArmConfig {
    /// Check if an angle is within the safe range
    pub fn accepts(&self, angle: u32) -> bool {
        angle >= self.min_angle as u32 && angle <= self.max_angle as u32
    }
}

/// Turntable stepper configuration
///
/// Angles are turntable degrees, after the gearing between motor and table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TurntableConfig {
    /// Slowest allowed speed (RPM)
    pub min_rpm: u16,
    /// Fastest allowed speed (RPM)
    pub max_rpm: u16,
    /// Speed applied at boot (RPM)
    pub default_rpm: u16,
    /// Rotation between two pictures of a session
    pub increment_degrees: u32,
    /// Accumulated rotation that completes a session
    pub revolution_degrees: u32,
    /// Largest single rotation accepted from the console
    pub max_manual_degrees: u32,
    /// Largest repeat count accepted from the console
    pub max_manual_iterations: u8,
    /// Pause between repeated console rotations (ms)
    pub repeat_delay_ms: u32,
}

impl Default for TurntableConfig {
    fn default() -> Self {
        Self {
            min_rpm: 50,
            max_rpm: 150,
            default_rpm: 100,
            increment_degrees: 45,
            revolution_degrees: 360,
            max_manual_degrees: 360,
            max_manual_iterations: 16,
            repeat_delay_ms: 1000,
        }
    }
}

impl TurntableConfig {
    /// Check if a speed is within the allowed range
    pub fn accepts_rpm(&self, rpm: u32) -> bool {
        rpm >= self.min_rpm as u32 && rpm <= self.max_rpm as u32
    }
}

/// Duty limits and presets for one light (percent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightLimits {
    /// Lowest duty the fixture tolerates
    pub min_duty: u8,
    /// Highest duty the fixture tolerates
    pub max_duty: u8,
    /// Duty used when the session switches the light on
    pub on_duty: u8,
    /// Duty used when the session switches the light off
    pub off_duty: u8,
}

impl LightLimits {
    /// Check if a duty is within the fixture's safe range
    pub fn accepts(&self, duty: u32) -> bool {
        duty >= self.min_duty as u32 && duty <= self.max_duty as u32
    }

    fn is_consistent(&self) -> bool {
        self.min_duty <= self.max_duty
            && self.max_duty <= MAX_DUTY
            && self.accepts(self.on_duty as u32)
            && self.accepts(self.off_duty as u32)
    }
}

/// Light configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightConfig {
    /// Back light limits (capped to avoid washing out the subject)
    pub back: LightLimits,
    /// Dome light limits (inverted wiring: low duty is bright)
    pub dome: LightLimits,
    /// Light the session toggles around each capture
    pub capture_light: LightId,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            back: LightLimits {
                min_duty: 0,
                max_duty: 80,
                on_duty: 5,
                off_duty: 0,
            },
            dome: LightLimits {
                min_duty: 20,
                max_duty: 100,
                on_duty: 50,
                off_duty: 100,
            },
            capture_light: LightId::Back,
        }
    }
}

impl LightConfig {
    /// Limits for a given light
    pub fn limits(&self, light: LightId) -> &LightLimits {
        match light {
            LightId::Back => &self.back,
            LightId::Dome => &self.dome,
        }
    }
}

/// Operator console behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsoleConfig {
    /// Echo each received command line before handling it
    pub echo: bool,
    /// Print the prompt after each handled line
    pub prompt: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            echo: true,
            prompt: true,
        }
    }
}

/// Complete rig configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigConfig {
    /// Camera arm
    pub arm: ArmConfig,
    /// Turntable
    pub turntable: TurntableConfig,
    /// Lights
    pub lights: LightConfig,
    /// Operator console
    pub console: ConsoleConfig,
}

impl RigConfig {
    /// Check the configuration for inconsistencies
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let arm = &self.arm;
        if arm.min_angle > arm.max_angle {
            return Err(ConfigError::ArmRange);
        }
        if !arm.accepts(arm.home_angle as u32) {
            return Err(ConfigError::ArmHomeOutOfRange);
        }
        if !arm.accepts(arm.capture_angle as u32) {
            return Err(ConfigError::ArmCaptureOutOfRange);
        }
        if arm.capture_angle == arm.home_angle {
            return Err(ConfigError::ArmCaptureIsHome);
        }

        let table = &self.turntable;
        if table.min_rpm == 0 || table.min_rpm > table.max_rpm {
            return Err(ConfigError::SpeedRange);
        }
        if !table.accepts_rpm(table.default_rpm as u32) {
            return Err(ConfigError::DefaultSpeedOutOfRange);
        }
        if table.revolution_degrees == 0 {
            return Err(ConfigError::InvalidRevolution);
        }
        if table.increment_degrees == 0 || table.increment_degrees > table.revolution_degrees {
            return Err(ConfigError::InvalidIncrement);
        }
        if table.max_manual_degrees == 0 || table.max_manual_iterations == 0 {
            return Err(ConfigError::InvalidManualLimits);
        }

        for light in [LightId::Back, LightId::Dome] {
            if !self.lights.limits(light).is_consistent() {
                return Err(ConfigError::LightLimits(light));
            }
        }

        Ok(())
    }
}


#[cfg(all(test, feature = "serde"))]
mod toml_tests {
    use super::*;

    const RIG_TOML: &str = r#"
        [arm]
        min_angle = 20
        max_angle = 160
        home_angle = 20
        capture_angle = 150

        [turntable]
        min_rpm = 50
        max_rpm = 150
        default_rpm = 80
        increment_degrees = 30
        revolution_degrees = 360
        max_manual_degrees = 360
        max_manual_iterations = 16
        repeat_delay_ms = 1000

        [lights]
        capture_light = "dome"

        [lights.back]
        min_duty = 0
        max_duty = 80
        on_duty = 5
        off_duty = 0

        [lights.dome]
        min_duty = 20
        max_duty = 100
        on_duty = 50
        off_duty = 100

        [console]
        echo = false
        prompt = true
    "#;

    #[test]
    fn test_parse_rig_toml() {
        let config: RigConfig = toml::from_str(RIG_TOML).unwrap();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.arm.capture_angle, 150);
        assert_eq!(config.turntable.increment_degrees, 30);
        assert_eq!(config.lights.capture_light, LightId::Dome);
        assert!(!config.console.echo);
        assert_ne!(config, RigConfig::default());
    }

    #[test]
    fn test_parsed_config_still_validated() {
        let text = RIG_TOML.replace("home_angle = 20", "home_angle = 10");
        let config: RigConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::ArmHomeOutOfRange));
    }

    #[test]
    fn test_missing_section_rejected() {
        let text = RIG_TOML.replace("[console]", "[other]");
        assert!(toml::from_str::<RigConfig>(&text).is_err());
    }
}
