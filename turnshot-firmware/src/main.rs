//! Turnshot - Imaging Rig Firmware
//!
//! Main firmware binary for RP2040-based imaging rigs: a camera arm servo,
//! a turntable stepper and two dimmable lights, driven from an operator
//! console on UART0 and coordinated with an imaging peer on UART1.
//!
//! Everything runs in one task. Actuator moves block that task, so the
//! peer's bytes queue in the UART buffer until the session reads them.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::pwm::{Config as PwmConfig, Pwm, PwmOutput};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use turnshot_core::config::RigConfig;
use turnshot_core::{Rig, Station, COMMANDS};
use turnshot_drivers::{PwmLight, ServoConfig, StepDirStepper, StepperConfig, SweepServo};
use turnshot_hal::IoUart;

mod report;

/// Rig configuration from rig.toml, validated by build.rs
/// Edit rig.toml and rebuild to customize
mod rig_config {
    use turnshot_core::config::{
        ArmConfig, ConsoleConfig, LightConfig, LightLimits, RigConfig, TurntableConfig,
    };
    use turnshot_core::traits::LightId;

    include!(concat!(env!("OUT_DIR"), "/rig_config.rs"));
}

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// Servo PWM: 125 MHz / 64 / (39062 + 1) = 50 Hz
const SERVO_PWM_DIVIDER: u8 = 64;
const SERVO_PWM_TOP: u16 = 39_062;

/// Light PWM: 125 MHz / (62499 + 1) = 2 kHz
const LIGHT_PWM_TOP: u16 = 62_499;

/// UART buffer size per direction
const UART_BUF_SIZE: usize = 256;

// Static cells for UART buffers (must live forever)
static OPERATOR_TX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();
static OPERATOR_RX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();
static PEER_TX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();
static PEER_RX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();

type ArmServo = SweepServo<PwmOutput<'static>, Delay>;
type Turntable = StepDirStepper<Output<'static>, Output<'static>, Delay>;
type Light = PwmLight<PwmOutput<'static>>;
type Link = IoUart<BufferedUart>;
type RigStation = Station<ArmServo, Turntable, Light, Delay, Link, Link>;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Turnshot firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    if let Err(e) = COMMANDS.validate() {
        error!("Command table inconsistent: {:?}", e);
    }

    // Operator console on UART0
    // Pin assignments are board-specific (SKR Pico: TX=GPIO0, RX=GPIO1)
    let operator = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config()).into_buffered(
        Irqs,
        OPERATOR_TX_BUF.init([0u8; UART_BUF_SIZE]),
        OPERATOR_RX_BUF.init([0u8; UART_BUF_SIZE]),
    );

    // Imaging peer on UART1 (TX=GPIO8, RX=GPIO9)
    let peer = Uart::new_blocking(p.UART1, p.PIN_8, p.PIN_9, uart_config()).into_buffered(
        Irqs,
        PEER_TX_BUF.init([0u8; UART_BUF_SIZE]),
        PEER_RX_BUF.init([0u8; UART_BUF_SIZE]),
    );

    info!("UARTs initialized");

    // Arm servo on GPIO2 (PWM slice 1, channel A)
    let mut servo_pwm = PwmConfig::default();
    servo_pwm.divider = SERVO_PWM_DIVIDER.into();
    servo_pwm.top = SERVO_PWM_TOP;
    let (servo_out, _) = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, servo_pwm).split();

    // Back light on GPIO4, dome light on GPIO5 (PWM slice 2, channels A/B)
    let mut light_pwm = PwmConfig::default();
    light_pwm.top = LIGHT_PWM_TOP;
    let (back_out, dome_out) =
        Pwm::new_output_ab(p.PWM_SLICE2, p.PIN_4, p.PIN_5, light_pwm).split();

    let (Some(servo_out), Some(back_out), Some(dome_out)) = (servo_out, back_out, dome_out)
    else {
        defmt::panic!("PWM outputs unavailable");
    };

    let arm = SweepServo::new(
        servo_out,
        Delay,
        ServoConfig {
            initial_angle: config.arm.home_angle,
            ..ServoConfig::default()
        },
    );
    let back_light = PwmLight::new(back_out, config.lights.back.off_duty);
    let dome_light = PwmLight::new(dome_out, config.lights.dome.off_duty);

    // Turntable stepper
    // Pin assignments are board-specific (SKR Pico: STEP=GPIO11, DIR=GPIO10, ENABLE=GPIO12)
    let step = Output::new(p.PIN_11, Level::Low);
    let dir = Output::new(p.PIN_10, Level::Low);
    // Enable is active-low; the control task keeps it driven
    let enable = Output::new(p.PIN_12, Level::Low);
    let turntable = StepDirStepper::new(
        step,
        dir,
        Delay,
        StepperConfig {
            initial_rpm: config.turntable.default_rpm,
            ..StepperConfig::default()
        },
    );

    info!("Actuators initialized");

    let rig = Rig::new(arm, turntable, back_light, dome_light);
    let station = Station::new(rig, config, Delay, IoUart::new(operator), IoUart::new(peer));

    spawner.spawn(station_task(station, enable)).unwrap();

    info!("Station running");
}

/// Load the embedded rig configuration
///
/// Falls back to the calibrated defaults if the embedded values do not
/// validate.
fn load_config() -> RigConfig {
    let config = rig_config::RIG_CONFIG;
    match config.validate() {
        Ok(()) => {
            info!("Loaded rig.toml configuration");
            config
        }
        Err(e) => {
            warn!("Invalid rig.toml ({:?}), using defaults", e);
            RigConfig::default()
        }
    }
}

/// UART settings shared by both links
fn uart_config() -> UartConfig {
    let mut config = UartConfig::default();
    config.baudrate = turnshot_hal::UartConfig::default().baudrate;
    config
}

/// Control loop: one station tick per pass, then let the executor run
///
/// Owns the stepper enable pin so the driver stays energized.
#[embassy_executor::task]
async fn station_task(mut station: RigStation, _stepper_enable: Output<'static>) {
    if station.greet().is_err() {
        warn!("Operator link unavailable");
    }

    loop {
        let report = station.tick();
        if !report.is_idle() {
            report::log_tick(&report);
        }
        embassy_futures::yield_now().await;
    }
}
