//! Station controller
//!
//! Owns the rig, both serial channels and the imaging session, and runs
//! them from a single cooperative loop. Each [`Station::tick`]:
//!
//! 1. polls the operator console once; a completed line is echoed,
//!    dispatched and executed, followed by a diagnostic and the prompt
//! 2. runs one session step, which may poll the peer once
//! 3. compares the actuator fault counters with the last tick
//!
//! Nothing here logs. The tick returns a [`TickReport`] and the firmware
//! decides what to record.

use core::fmt;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use turnshot_hal::{Uart, UartTx};
use turnshot_protocol::{DispatchError, LineError};

use crate::channel::{Channel, ChannelError, ChannelId};
use crate::cli::{self, CliError, CommandId, COMMANDS};
use crate::config::RigConfig;
use crate::rig::{Rig, RigFaults};
use crate::session::{Session, SessionError, SessionState, Transition};
use crate::traits::{LightDriver, ServoDriver, TurntableDriver};

/// Operator console prompt
pub const PROMPT: &str = "station> ";

/// Diagnostic printed when an actuator write fails
pub const FAULT_NOTICE: &str = "actuator fault";

/// Link problems seen during a tick
///
/// None of these stop the station; they are reported so the firmware can
/// log them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StationError {
    /// Reading from or writing to a channel failed
    Link(ChannelId),
    /// A line on a channel was too long or not text and was dropped
    Framing(ChannelId, LineError),
}

impl StationError {
    pub fn message(&self) -> &'static str {
        match self {
            StationError::Link(ChannelId::Operator) => "operator link error",
            StationError::Link(ChannelId::Peer) => "peer link error",
            StationError::Framing(_, e) => e.message(),
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Outcome of an operator line, if one completed
    pub command: Option<Result<CommandId, CliError>>,
    /// Session transition, if one happened
    pub transition: Option<Transition>,
    /// Link and framing problems (at most one per channel)
    pub errors: Vec<StationError, 2>,
    /// Actuator writes that failed during this tick
    pub faults: RigFaults,
}

impl TickReport {
    /// Check if nothing happened
    pub fn is_idle(&self) -> bool {
        self.command.is_none()
            && self.transition.is_none()
            && self.errors.is_empty()
            && self.faults.is_clear()
    }

    fn record(&mut self, error: StationError) {
        let already = self.errors.iter().any(|e| channel_of(e) == channel_of(&error));
        if !already {
            // Capacity is one per channel
            let _ = self.errors.push(error);
        }
    }
}

fn channel_of(error: &StationError) -> ChannelId {
    match error {
        StationError::Link(id) | StationError::Framing(id, _) => *id,
    }
}

/// Formatter sink over a link that remembers whether any write failed
struct Reply<'a, U> {
    link: &'a mut U,
    failed: bool,
}

impl<'a, U: UartTx> Reply<'a, U> {
    fn new(link: &'a mut U) -> Self {
        Self {
            link,
            failed: false,
        }
    }

    fn finish(self) -> bool {
        let link = self.link;
        !self.failed && link.flush().is_ok()
    }
}

impl<U: UartTx> fmt::Write for Reply<'_, U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if !self.failed && self.link.write_blocking(s.as_bytes()).is_err() {
            self.failed = true;
        }
        Ok(())
    }
}

/// The imaging station
pub struct Station<A, T, L, D, O, P> {
    rig: Rig<A, T, L>,
    config: RigConfig,
    delay: D,
    operator: Channel<O>,
    peer: Channel<P>,
    session: Session,
    /// Fault counters already reported
    faults_seen: RigFaults,
}

impl<A, T, L, D, O, P> Station<A, T, L, D, O, P>
where
    A: ServoDriver,
    T: TurntableDriver,
    L: LightDriver,
    D: DelayNs,
    O: Uart,
    P: Uart,
{
    /// Create a station and park the rig
    ///
    /// `config` is used as given; validate it first.
    pub fn new(mut rig: Rig<A, T, L>, config: RigConfig, delay: D, operator: O, peer: P) -> Self {
        rig.park(&config);
        Self {
            rig,
            config,
            delay,
            operator: Channel::new(ChannelId::Operator, operator),
            peer: Channel::new(ChannelId::Peer, peer),
            session: Session::new(),
            faults_seen: RigFaults::default(),
        }
    }

    /// Print the first prompt
    pub fn greet(&mut self) -> Result<(), StationError> {
        if self.config.console.prompt {
            self.operator
                .send_raw(PROMPT)
                .map_err(|_| StationError::Link(ChannelId::Operator))?;
        }
        Ok(())
    }

    /// Run one iteration of the control loop
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        match self.operator.poll() {
            Ok(Some(line)) => self.handle_line(&line, &mut report),
            Ok(None) => {}
            Err(ChannelError::Link(_)) => report.record(StationError::Link(ChannelId::Operator)),
            Err(ChannelError::Framing(e)) => {
                report.record(StationError::Framing(ChannelId::Operator, e));
                if !self.say(e.message()) {
                    report.record(StationError::Link(ChannelId::Operator));
                }
            }
        }

        match self.session.tick(&mut self.rig, &self.config, &mut self.peer) {
            Ok(Some(transition)) => {
                report.transition = Some(transition);
                if !self.say(transition.message()) {
                    report.record(StationError::Link(ChannelId::Operator));
                }
            }
            Ok(None) => {}
            Err(SessionError::PeerLink) => report.record(StationError::Link(ChannelId::Peer)),
            Err(SessionError::PeerFraming(e)) => {
                report.record(StationError::Framing(ChannelId::Peer, e));
                if !self.say(e.message()) {
                    report.record(StationError::Link(ChannelId::Operator));
                }
            }
        }

        let fresh = self.take_new_faults();
        if !fresh.is_clear() {
            report.faults.merge(&fresh);
            if !self.say(FAULT_NOTICE) {
                report.record(StationError::Link(ChannelId::Operator));
            }
        }

        report
    }

    /// Echo, dispatch and execute one operator line
    ///
    /// Faults raised by the command are reported before the prompt.
    fn handle_line(&mut self, line: &str, report: &mut TickReport) {
        let state = self.session.state();
        let mut reply = Reply::new(self.operator.link_mut());

        if self.config.console.echo {
            let _ = fmt::Write::write_fmt(&mut reply, format_args!("{}\n", line));
        }

        let outcome = match COMMANDS.dispatch(line) {
            Err(DispatchError::Empty) => None,
            Err(e) => Some(Err(CliError::from(e))),
            Ok(invocation) => Some(
                cli::execute(
                    &invocation,
                    &mut self.rig,
                    &self.config,
                    &mut self.delay,
                    state,
                    &mut reply,
                )
                .map(|()| invocation.command())
                .map_err(CliError::from),
            ),
        };

        if let Some(Err(e)) = outcome {
            let _ = fmt::Write::write_fmt(&mut reply, format_args!("{}\n", e.message()));
        }

        let now = self.rig.faults();
        let fresh = now.since(&self.faults_seen);
        self.faults_seen = now;
        if !fresh.is_clear() {
            report.faults.merge(&fresh);
            let _ = fmt::Write::write_fmt(&mut reply, format_args!("{}\n", FAULT_NOTICE));
        }

        if self.config.console.prompt {
            let _ = fmt::Write::write_str(&mut reply, PROMPT);
        }

        report.command = outcome;
        if !reply.finish() {
            report.record(StationError::Link(ChannelId::Operator));
        }
    }

    /// Fault counts added since the last call
    fn take_new_faults(&mut self) -> RigFaults {
        let now = self.rig.faults();
        let fresh = now.since(&self.faults_seen);
        self.faults_seen = now;
        fresh
    }

    /// Write a diagnostic line to the operator
    fn say(&mut self, text: &str) -> bool {
        self.operator.send_line(text).is_ok()
    }

    /// Abandon the current session and park the rig
    pub fn abort_session(&mut self) {
        self.session.abort();
        self.rig.park(&self.config);
    }
}

impl<A, T, L, D, O, P> Station<A, T, L, D, O, P> {
    /// Get the rig
    pub fn rig(&self) -> &Rig<A, T, L> {
        &self.rig
    }

    /// Get the rig, mutably
    pub fn rig_mut(&mut self) -> &mut Rig<A, T, L> {
        &mut self.rig
    }

    /// Get the active configuration
    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    /// Get the session state
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Get the operator channel
    pub fn operator(&self) -> &Channel<O> {
        &self.operator
    }

    /// Get the operator channel, mutably
    pub fn operator_mut(&mut self) -> &mut Channel<O> {
        &mut self.operator
    }

    /// Get the peer channel
    pub fn peer(&self) -> &Channel<P> {
        &self.peer
    }

    /// Get the peer channel, mutably
    pub fn peer_mut(&mut self) -> &mut Channel<P> {
        &mut self.peer
    }
}
