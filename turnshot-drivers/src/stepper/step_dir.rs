//! Step/direction stepper driver
//!
//! Works with any driver chip taking a STEP pulse train and a DIR level
//! (A4988, DRV8825, TMC2209 in standalone mode). Positions are turntable
//! degrees; the belt or gear reduction between motor and table is part of
//! the configuration.
//!
//! Steps are timed with a blocking delay, so a move holds the caller until
//! the last pulse has been issued.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use turnshot_core::traits::TurntableDriver;

/// Degrees in one revolution
const DEGREES_PER_REV: u32 = 360;

/// Microseconds in one minute
const US_PER_MINUTE: u32 = 60_000_000;

/// Stepper mechanics and timing
#[derive(Debug, Clone)]
pub struct StepperConfig {
    /// Full steps (times microstepping) per motor revolution
    pub steps_per_rev: u32,
    /// Motor revolutions per turntable revolution
    pub gear_ratio: u32,
    /// STEP high time (us)
    pub pulse_us: u32,
    /// DIR level for increasing position
    pub forward_high: bool,
    /// Speed used until `set_speed` is called (motor RPM)
    pub initial_rpm: u16,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            steps_per_rev: 200,
            gear_ratio: 4,
            pulse_us: 5,
            forward_high: true,
            initial_rpm: 100,
        }
    }
}

impl StepperConfig {
    /// Motor steps for one turntable revolution
    pub fn steps_per_table_rev(&self) -> u32 {
        self.steps_per_rev * self.gear_ratio
    }

    /// Motor steps needed to reach an accumulated table angle
    pub fn degrees_to_steps(&self, degrees: u32) -> u64 {
        degrees as u64 * self.steps_per_table_rev() as u64 / DEGREES_PER_REV as u64
    }

    /// Time between step pulses at a motor speed (us)
    pub fn step_interval_us(&self, rpm: u16) -> u32 {
        let steps_per_minute = self.steps_per_rev.saturating_mul(rpm.max(1) as u32);
        (US_PER_MINUTE / steps_per_minute.max(1)).max(self.pulse_us * 2)
    }
}

/// Turntable stepper on STEP/DIR pins
pub struct StepDirStepper<S, Dir, D> {
    step: S,
    dir: Dir,
    delay: D,
    config: StepperConfig,
    /// Motor speed (RPM)
    rpm: u16,
    /// Last commanded table position (degrees)
    position: u32,
    /// Motor steps issued since the last reset
    steps: u64,
    /// Number of failed pin writes
    faults: u32,
}

impl<S, Dir, D> StepDirStepper<S, Dir, D>
where
    S: OutputPin,
    Dir: OutputPin,
    D: DelayNs,
{
    /// Create a stepper at position zero
    pub fn new(mut step: S, dir: Dir, delay: D, config: StepperConfig) -> Self {
        let faults = u32::from(step.set_low().is_err());
        Self {
            step,
            dir,
            delay,
            rpm: config.initial_rpm,
            config,
            position: 0,
            steps: 0,
            faults,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Motor steps issued since the last reset
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    fn set_direction(&mut self, forward: bool) {
        let high = forward == self.config.forward_high;
        let result = if high {
            self.dir.set_high()
        } else {
            self.dir.set_low()
        };
        if result.is_err() {
            self.faults += 1;
        }
    }

    fn pulse(&mut self, interval_us: u32) {
        if self.step.set_high().is_err() {
            self.faults += 1;
        }
        self.delay.delay_us(self.config.pulse_us);
        if self.step.set_low().is_err() {
            self.faults += 1;
        }
        self.delay.delay_us(interval_us - self.config.pulse_us);
    }
}

impl<S, Dir, D> TurntableDriver for StepDirStepper<S, Dir, D>
where
    S: OutputPin,
    Dir: OutputPin,
    D: DelayNs,
{
    fn set_speed(&mut self, rpm: u16) {
        self.rpm = rpm;
    }

    fn get_speed(&self) -> u16 {
        self.rpm
    }

    fn move_to(&mut self, degrees: u32) {
        let target = self.config.degrees_to_steps(degrees);
        let forward = target >= self.steps;
        let count = target.abs_diff(self.steps);

        if count > 0 {
            let interval = self.config.step_interval_us(self.rpm);
            self.set_direction(forward);
            for _ in 0..count {
                self.pulse(interval);
            }
        }

        self.steps = target;
        self.position = degrees;
    }

    fn get_position(&self) -> u32 {
        self.position
    }

    fn reset(&mut self) {
        self.position = 0;
        self.steps = 0;
    }

    fn fault_count(&self) -> u32 {
        self.faults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockPin};

    fn stepper() -> StepDirStepper<MockPin, MockPin, MockDelay> {
        StepDirStepper::new(
            MockPin::default(),
            MockPin::default(),
            MockDelay::default(),
            StepperConfig::default(),
        )
    }

    #[test]
    fn test_gear_ratio() {
        let config = StepperConfig::default();
        assert_eq!(config.steps_per_table_rev(), 800);
        assert_eq!(config.degrees_to_steps(45), 100);
        assert_eq!(config.degrees_to_steps(360), 800);
    }

    #[test]
    fn test_step_interval() {
        let config = StepperConfig::default();
        // 100 rpm * 200 steps = 20000 steps/min
        assert_eq!(config.step_interval_us(100), 3000);
        assert_eq!(config.step_interval_us(50), 6000);
        assert_eq!(config.step_interval_us(150), 2000);
    }

    #[test]
    fn test_increment_issues_steps() {
        let mut stepper = stepper();
        stepper.rotate_by(45);
        assert_eq!(stepper.step.rising_edges, 100);
        assert!(!stepper.step.high);
        assert!(stepper.dir.high);
        assert_eq!(stepper.get_position(), 45);
        // 100 steps at 3 ms each
        assert_eq!(stepper.delay.total_ns, 100 * 3_000_000);
    }

    #[test]
    fn test_accumulates_past_revolution() {
        let mut stepper = stepper();
        stepper.rotate_by(360);
        stepper.rotate_by(360);
        assert_eq!(stepper.get_position(), 720);
        assert_eq!(stepper.step_count(), 1600);
        assert_eq!(stepper.step.rising_edges, 1600);
    }

    #[test]
    fn test_move_back() {
        let mut stepper = stepper();
        stepper.move_to(90);
        stepper.move_to(45);
        assert!(!stepper.dir.high);
        assert_eq!(stepper.step.rising_edges, 300);
        assert_eq!(stepper.get_position(), 45);
    }

    #[test]
    fn test_reset_does_not_move() {
        let mut stepper = stepper();
        stepper.move_to(90);
        stepper.reset();
        assert_eq!(stepper.get_position(), 0);
        assert_eq!(stepper.step.rising_edges, 200);

        stepper.rotate_by(45);
        assert!(stepper.dir.high);
        assert_eq!(stepper.step.rising_edges, 300);
    }

    #[test]
    fn test_speed_changes_timing() {
        let mut stepper = stepper();
        stepper.set_speed(50);
        assert_eq!(stepper.get_speed(), 50);
        stepper.rotate_by(45);
        assert_eq!(stepper.delay.total_ns, 100 * 6_000_000);
    }

    #[test]
    fn test_pin_failure_counted() {
        let mut step = MockPin::default();
        step.fail = true;
        let mut stepper = StepDirStepper::new(
            step,
            MockPin::default(),
            MockDelay::default(),
            StepperConfig::default(),
        );
        assert_eq!(stepper.fault_count(), 1);
        stepper.rotate_by(9);
        // 20 steps, two writes each
        assert_eq!(stepper.fault_count(), 41);
        assert_eq!(stepper.get_position(), 9);
    }
}
