//! Test doubles for actuators, delay and serial links

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use turnshot_hal::{ErrorType, UartRx, UartTx};

use crate::rig::Rig;
use crate::traits::{LightDriver, ServoDriver, TurntableDriver};

#[derive(Debug, Default)]
pub struct MockServo {
    pub position: u8,
    pub moves: Vec<u8>,
    pub faults: u32,
    /// Count a fault on every move
    pub broken: bool,
}

impl ServoDriver for MockServo {
    fn move_to(&mut self, angle: u8) {
        self.moves.push(angle);
        self.position = angle;
        if self.broken {
            self.faults += 1;
        }
    }

    fn get_position(&self) -> u8 {
        self.position
    }

    fn fault_count(&self) -> u32 {
        self.faults
    }
}

#[derive(Debug, Default)]
pub struct MockTurntable {
    pub position: u32,
    pub rpm: u16,
    pub moves: Vec<u32>,
    pub resets: usize,
}

impl TurntableDriver for MockTurntable {
    fn set_speed(&mut self, rpm: u16) {
        self.rpm = rpm;
    }

    fn get_speed(&self) -> u16 {
        self.rpm
    }

    fn move_to(&mut self, degrees: u32) {
        self.moves.push(degrees);
        self.position = degrees;
    }

    fn get_position(&self) -> u32 {
        self.position
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.position = 0;
    }
}

#[derive(Debug, Default)]
pub struct MockLight {
    pub duty: u8,
    pub history: Vec<u8>,
    pub faults: u32,
}

impl LightDriver for MockLight {
    fn set_brightness(&mut self, duty: u8) {
        self.history.push(duty);
        self.duty = duty;
    }

    fn get_brightness(&self) -> u8 {
        self.duty
    }

    fn fault_count(&self) -> u32 {
        self.faults
    }
}

pub type MockRig = Rig<MockServo, MockTurntable, MockLight>;

pub fn mock_rig() -> MockRig {
    Rig::new(
        MockServo::default(),
        MockTurntable::default(),
        MockLight::default(),
        MockLight::default(),
    )
}

/// Records requested delays instead of sleeping
#[derive(Debug, Default)]
pub struct MockDelay {
    pub delays_ms: Vec<u32>,
    pub elapsed_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
        self.elapsed_ns += ms as u64 * 1_000_000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDown;

/// Serial link fed from a byte queue, capturing everything written
#[derive(Debug, Default)]
pub struct MockLink {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MockLink {
    pub fn push_line(&mut self, line: &str) {
        self.rx.extend(line.as_bytes());
        self.rx.push_back(b'\n');
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.tx).into_owned()
    }

    /// Complete output lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.output()
            .split('\n')
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn clear_output(&mut self) {
        self.tx.clear();
    }
}

impl ErrorType for MockLink {
    type Error = LinkDown;
}

impl UartTx for MockLink {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(LinkDown);
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(LinkDown);
        }
        Ok(())
    }
}

impl UartRx for MockLink {
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if self.fail_reads {
            return Err(LinkDown);
        }
        Ok(self.rx.pop_front())
    }
}
