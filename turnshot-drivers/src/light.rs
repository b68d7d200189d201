//! PWM dimmed light
//!
//! Applies a duty percentage to one PWM channel. The driver does not know
//! about inverted wiring; a light that is off at 100% simply has an off
//! preset of 100 in the rig configuration.

use embedded_hal::pwm::SetDutyCycle;
use turnshot_core::traits::LightDriver;

/// Light on a PWM output
pub struct PwmLight<P> {
    pwm: P,
    /// Last commanded duty (percent)
    duty: u8,
    /// Number of rejected duty writes
    faults: u32,
}

impl<P: SetDutyCycle> PwmLight<P> {
    /// Create a light and apply the initial duty
    pub fn new(pwm: P, initial_duty: u8) -> Self {
        let mut light = Self {
            pwm,
            duty: 0,
            faults: 0,
        };
        light.set_brightness(initial_duty);
        light
    }
}

impl<P: SetDutyCycle> LightDriver for PwmLight<P> {
    fn set_brightness(&mut self, duty: u8) {
        let duty = duty.min(100);
        if self.pwm.set_duty_cycle_percent(duty).is_err() {
            self.faults += 1;
        }
        self.duty = duty;
    }

    fn get_brightness(&self) -> u8 {
        self.duty
    }

    fn fault_count(&self) -> u32 {
        self.faults
    }
}
