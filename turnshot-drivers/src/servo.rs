//! Hobby servo on a PWM channel
//!
//! The arm servo stalls if it is commanded across its whole range at once
//! under load, so moves are swept: the angle changes by a few degrees at a
//! time with a short pause after each step. A sweep blocks the caller.
//!
//! ```ignore
//! let mut arm = SweepServo::new(pwm, Delay, ServoConfig::default());
//! arm.move_to(156); // sweeps down from home in 2 degree steps
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use turnshot_core::traits::ServoDriver;

/// Full mechanical range of the servo (degrees)
const FULL_RANGE: u8 = 180;

/// Servo timing and sweep configuration
#[derive(Debug, Clone)]
pub struct ServoConfig {
    /// Pulse width at 0 degrees (us)
    pub min_pulse_us: u16,
    /// Pulse width at 180 degrees (us)
    pub max_pulse_us: u16,
    /// PWM period (us), 20000 for 50 Hz
    pub period_us: u16,
    /// Degrees per sweep step
    pub step_degrees: u8,
    /// Pause after each sweep step (ms)
    pub step_delay_ms: u32,
    /// Angle written at startup without sweeping
    pub initial_angle: u8,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 500,
            max_pulse_us: 2500,
            period_us: 20_000,
            step_degrees: 2,
            step_delay_ms: 50,
            initial_angle: 15,
        }
    }
}

impl ServoConfig {
    /// Pulse width for an angle (clamped to 0..=180)
    pub fn pulse_us(&self, angle: u8) -> u16 {
        let angle = angle.min(FULL_RANGE) as u32;
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us) as u32;
        self.min_pulse_us + (angle * span / FULL_RANGE as u32) as u16
    }
}

/// Servo driven through blocking, stepped sweeps
pub struct SweepServo<P, D> {
    pwm: P,
    delay: D,
    config: ServoConfig,
    /// Last commanded angle
    position: u8,
    /// Number of rejected PWM writes
    faults: u32,
}

impl<P: SetDutyCycle, D: DelayNs> SweepServo<P, D> {
    /// Create a servo and jump to the initial angle
    ///
    /// The real position is unknown at power-up, so the first write cannot
    /// be swept.
    pub fn new(pwm: P, delay: D, config: ServoConfig) -> Self {
        let initial = config.initial_angle.min(FULL_RANGE);
        let mut servo = Self {
            pwm,
            delay,
            config,
            position: initial,
            faults: 0,
        };
        servo.write_angle(initial);
        servo
    }

    /// Get the configuration
    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    fn write_angle(&mut self, angle: u8) {
        let pulse = self.config.pulse_us(angle);
        if self
            .pwm
            .set_duty_cycle_fraction(pulse, self.config.period_us)
            .is_err()
        {
            self.faults += 1;
        }
    }
}

impl<P: SetDutyCycle, D: DelayNs> ServoDriver for SweepServo<P, D> {
    fn move_to(&mut self, angle: u8) {
        let target = angle.min(FULL_RANGE);
        let step = self.config.step_degrees.max(1);

        while self.position != target {
            self.position = if self.position < target {
                self.position.saturating_add(step).min(target)
            } else {
                self.position.saturating_sub(step).max(target)
            };
            self.write_angle(self.position);
            self.delay.delay_ms(self.config.step_delay_ms);
        }
    }

    fn get_position(&self) -> u8 {
        self.position
    }

    fn fault_count(&self) -> u32 {
        self.faults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockPwm};

    fn servo() -> SweepServo<MockPwm, MockDelay> {
        SweepServo::new(MockPwm::new(20_000), MockDelay::default(), ServoConfig::default())
    }

    #[test]
    fn test_pulse_mapping() {
        let config = ServoConfig::default();
        assert_eq!(config.pulse_us(0), 500);
        assert_eq!(config.pulse_us(90), 1500);
        assert_eq!(config.pulse_us(180), 2500);
        assert_eq!(config.pulse_us(200), 2500);
    }

    #[test]
    fn test_initial_write_not_swept() {
        let servo = servo();
        assert_eq!(servo.get_position(), 15);
        // 500 + 15 * 2000 / 180 = 666 us; counter max equals the period
        assert_eq!(servo.pwm.history, [666]);
        assert!(servo.delay.calls_ms.is_empty());
    }

    #[test]
    fn test_sweep_down_in_steps() {
        let mut servo = servo();
        servo.move_to(25);
        assert_eq!(servo.get_position(), 25);
        // 15 -> 17 -> ... -> 25
        assert_eq!(servo.pwm.history.len(), 1 + 5);
        assert_eq!(servo.delay.calls_ms, [50; 5]);
        assert_eq!(servo.pwm.duty, servo.config.pulse_us(25));
    }

    #[test]
    fn test_sweep_lands_on_odd_target() {
        let mut servo = servo();
        servo.move_to(20);
        // 17, 19, 20
        assert_eq!(servo.delay.calls_ms.len(), 3);
        assert_eq!(servo.get_position(), 20);

        servo.move_to(15);
        // 18, 16, 15
        assert_eq!(servo.delay.calls_ms.len(), 6);
        assert_eq!(servo.pwm.duty, servo.config.pulse_us(15));
    }

    #[test]
    fn test_same_angle_does_nothing() {
        let mut servo = servo();
        servo.move_to(15);
        assert_eq!(servo.pwm.history.len(), 1);
        assert!(servo.delay.calls_ms.is_empty());
    }

    #[test]
    fn test_pwm_failure_counted() {
        let mut pwm = MockPwm::new(20_000);
        pwm.fail = true;
        let mut servo = SweepServo::new(pwm, MockDelay::default(), ServoConfig::default());
        servo.move_to(19);
        assert_eq!(servo.fault_count(), 3);
        assert_eq!(servo.get_position(), 19);
    }

    #[test]
    fn test_faults_visible_through_rig() {
        use crate::mock::MockPin;
        use crate::{PwmLight, StepDirStepper, StepperConfig};
        use turnshot_core::Rig;

        let mut pwm = MockPwm::new(20_000);
        pwm.fail = true;
        let arm = SweepServo::new(pwm, MockDelay::default(), ServoConfig::default());
        let table = StepDirStepper::new(
            MockPin::default(),
            MockPin::default(),
            MockDelay::default(),
            StepperConfig::default(),
        );
        let mut rig = Rig::new(
            arm,
            table,
            PwmLight::new(MockPwm::new(100), 0),
            PwmLight::new(MockPwm::new(100), 100),
        );

        let before = rig.faults();
        assert_eq!(before.arm, 1);

        // 15 -> 17 -> ... -> 89 -> 90
        rig.arm.move_to(90);
        let fresh = rig.faults().since(&before);
        assert_eq!(fresh.arm, 38);
        assert_eq!(fresh.turntable, 0);
        assert_eq!(fresh.back_light, 0);
    }
}
