//! Operator console commands
//!
//! The command table is static; [`execute`] maps a dispatched
//! [`Invocation`] onto the rig. Arguments are range-checked against
//! [`RigConfig`] before any actuator is touched, so a rejected command
//! leaves the rig exactly as it was.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use turnshot_protocol::{CommandDescriptor, CommandTable, DispatchError, Invocation};

use crate::config::RigConfig;
use crate::rig::Rig;
use crate::session::SessionState;
use crate::traits::{LightDriver, LightId, ServoDriver, TurntableDriver};

/// Console command tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandId {
    ArmRotate,
    LightUpdate,
    StepperRotate,
    StepperSet,
    Help,
    Status,
}

static ENTRIES: [CommandDescriptor<CommandId>; 6] = [
    CommandDescriptor {
        name: "arm-rotate",
        command: CommandId::ArmRotate,
        usage: "<angle>",
        help: "move the camera arm to an angle",
        min_args: 1,
        max_args: 1,
    },
    CommandDescriptor {
        name: "light-update",
        command: CommandId::LightUpdate,
        usage: "<light> <duty>",
        help: "set light 0 (back) or 1 (dome) duty in percent",
        min_args: 2,
        max_args: 2,
    },
    CommandDescriptor {
        name: "stepper-rotate",
        command: CommandId::StepperRotate,
        usage: "<angle> <count>",
        help: "rotate the turntable count times by angle",
        min_args: 2,
        max_args: 2,
    },
    CommandDescriptor {
        name: "stepper-set",
        command: CommandId::StepperSet,
        usage: "<rpm>",
        help: "set turntable speed",
        min_args: 1,
        max_args: 1,
    },
    CommandDescriptor {
        name: "help",
        command: CommandId::Help,
        usage: "",
        help: "list commands",
        min_args: 0,
        max_args: 0,
    },
    CommandDescriptor {
        name: "status",
        command: CommandId::Status,
        usage: "",
        help: "show session and actuator state",
        min_args: 0,
        max_args: 0,
    },
];

/// The operator command table
pub static COMMANDS: CommandTable<CommandId> = CommandTable::new(&ENTRIES);

/// Argument errors of a matched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Argument is not a number
    InvalidNumber,
    /// Angle outside the allowed range
    InvalidAngle,
    /// No such light
    InvalidLight,
    /// Duty outside the light's limits
    InvalidBrightness,
    /// Speed outside the allowed range
    InvalidSpeed,
    /// Repeat count outside the allowed range
    InvalidCount,
}

impl CommandError {
    /// Diagnostic text reported on the operator console
    pub fn message(&self) -> &'static str {
        match self {
            CommandError::InvalidNumber => "invalid number",
            CommandError::InvalidAngle => "invalid angle",
            CommandError::InvalidLight => "invalid light",
            CommandError::InvalidBrightness => "invalid brightness",
            CommandError::InvalidSpeed => "invalid speed",
            CommandError::InvalidCount => "invalid count",
        }
    }
}

/// Any failure handling one operator line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CliError {
    /// Line did not match a command
    Dispatch(DispatchError),
    /// Command matched but its arguments were rejected
    Command(CommandError),
}

impl CliError {
    pub fn message(&self) -> &'static str {
        match self {
            CliError::Dispatch(e) => e.message(),
            CliError::Command(e) => e.message(),
        }
    }
}

impl From<DispatchError> for CliError {
    fn from(e: DispatchError) -> Self {
        CliError::Dispatch(e)
    }
}

impl From<CommandError> for CliError {
    fn from(e: CommandError) -> Self {
        CliError::Command(e)
    }
}

/// Run a dispatched command against the rig
///
/// `help` and `status` write their report to `out`. Write errors are not
/// reported here; the writer is expected to track its own link faults.
pub fn execute<A, T, L, D, W>(
    invocation: &Invocation<'_, CommandId>,
    rig: &mut Rig<A, T, L>,
    config: &RigConfig,
    delay: &mut D,
    state: SessionState,
    out: &mut W,
) -> Result<(), CommandError>
where
    A: ServoDriver,
    T: TurntableDriver,
    L: LightDriver,
    D: DelayNs,
    W: Write,
{
    let args = &invocation.args;
    let number = |index: usize| args.number(index).ok_or(CommandError::InvalidNumber);

    match invocation.command() {
        CommandId::ArmRotate => {
            let angle = number(0)?;
            if !config.arm.accepts(angle) {
                return Err(CommandError::InvalidAngle);
            }
            rig.arm.move_to(angle as u8);
        }
        CommandId::LightUpdate => {
            let light = LightId::from_index(number(0)?).ok_or(CommandError::InvalidLight)?;
            let duty = number(1)?;
            if !config.lights.limits(light).accepts(duty) {
                return Err(CommandError::InvalidBrightness);
            }
            rig.light_mut(light).set_brightness(duty as u8);
        }
        CommandId::StepperRotate => {
            let angle = number(0)?;
            let count = number(1)?;
            if angle == 0 || angle > config.turntable.max_manual_degrees {
                return Err(CommandError::InvalidAngle);
            }
            if count == 0 || count > config.turntable.max_manual_iterations as u32 {
                return Err(CommandError::InvalidCount);
            }
            for i in 0..count {
                if i > 0 {
                    delay.delay_ms(config.turntable.repeat_delay_ms);
                }
                rig.turntable.rotate_by(angle);
            }
        }
        CommandId::StepperSet => {
            let rpm = number(0)?;
            if !config.turntable.accepts_rpm(rpm) {
                return Err(CommandError::InvalidSpeed);
            }
            rig.turntable.set_speed(rpm as u16);
        }
        CommandId::Help => {
            for entry in COMMANDS.entries() {
                let _ = if entry.usage.is_empty() {
                    writeln!(out, "{} - {}", entry.name, entry.help)
                } else {
                    writeln!(out, "{} {} - {}", entry.name, entry.usage, entry.help)
                };
            }
        }
        CommandId::Status => {
            let status = rig.status();
            let _ = writeln!(out, "session {}", state.name());
            let _ = writeln!(out, "arm {}", status.arm_angle);
            let _ = writeln!(
                out,
                "turntable {} deg {} rpm",
                status.turntable_degrees, status.turntable_rpm
            );
            let _ = writeln!(out, "back {}", status.back_duty);
            let _ = writeln!(out, "dome {}", status.dome_duty);
        }
    }

    Ok(())
}
