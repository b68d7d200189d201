//! Session execution
//!
//! [`Session::tick`] performs one step of the imaging session: it reads at
//! most one byte from the peer (waiting states only) or carries out the
//! actuator work of the current state, then applies the resulting event to
//! the transition table.
//!
//! Actuator sweeps block the whole control loop. The peer must not expect
//! an answer while the arm or turntable is moving; its bytes simply wait in
//! the UART buffer until the next waiting state reads them.

use turnshot_hal::Uart;
use turnshot_protocol::{LineError, PeerMessage, StationMessage};

use super::events::{CaptureProgress, SessionEvent};
use super::machine::SessionState;
use crate::channel::{Channel, ChannelError};
use crate::config::RigConfig;
use crate::rig::Rig;
use crate::traits::{LightDriver, ServoDriver, TurntableDriver};

/// Errors that interrupt a session tick
///
/// A tick that fails leaves the state unchanged; the same step is retried
/// on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Reading from or writing to the peer link failed
    PeerLink,
    /// A peer line could not be framed and was dropped
    PeerFraming(LineError),
}

/// A state change produced by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// State before the tick
    pub from: SessionState,
    /// State after the tick
    pub to: SessionState,
    /// Event that caused the change
    pub event: SessionEvent,
}

impl Transition {
    /// Diagnostic text reported on the operator console
    pub fn message(&self) -> &'static str {
        self.event.message()
    }
}

/// Imaging session driver
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    /// Peer notice whose send failed, retried before anything else
    outbox: Option<StationMessage>,
}

impl Session {
    /// Create a session waiting for the peer
    pub fn new() -> Self {
        Self {
            state: SessionState::WaitingForPeerStart,
            outbox: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Peer notice still waiting to be delivered
    pub fn pending_notice(&self) -> Option<StationMessage> {
        self.outbox
    }

    /// Run one step of the session
    ///
    /// Returns the transition taken, or `Ok(None)` if the session is
    /// waiting and nothing arrived this tick.
    pub fn tick<A, T, L, P>(
        &mut self,
        rig: &mut Rig<A, T, L>,
        config: &RigConfig,
        peer: &mut Channel<P>,
    ) -> Result<Option<Transition>, SessionError>
    where
        A: ServoDriver,
        T: TurntableDriver,
        L: LightDriver,
        P: Uart,
    {
        self.flush_outbox(peer)?;

        let event = match self.state {
            SessionState::WaitingForPeerStart => match Self::poll_peer(peer)? {
                Some(PeerMessage::Start) => Some(SessionEvent::PeerStart),
                _ => None,
            },
            SessionState::RequestingCapture => {
                peer.send_line(StationMessage::Capture.as_str())
                    .map_err(|_| SessionError::PeerLink)?;
                Some(SessionEvent::CaptureRequested)
            }
            SessionState::WaitingForCaptureDone => match Self::poll_peer(peer)? {
                Some(PeerMessage::Finished) => {
                    let progress = CaptureProgress::classify(
                        rig.arm_at_home(config),
                        rig.turntable.get_position(),
                        config,
                    );
                    if progress == CaptureProgress::RevolutionOvershot {
                        self.wrap_up(rig, config, peer);
                    }
                    Some(SessionEvent::CaptureDone(progress))
                }
                _ => None,
            },
            SessionState::LoweringArm => {
                rig.arm.move_to(config.arm.capture_angle);
                rig.set_capture_light(&config.lights, true);
                Some(SessionEvent::ArmLowered)
            }
            SessionState::AdvancingTurntable => {
                if rig.turntable.get_position() >= config.turntable.revolution_degrees {
                    self.wrap_up(rig, config, peer);
                    Some(SessionEvent::RevolutionComplete)
                } else {
                    rig.set_capture_light(&config.lights, false);
                    rig.turntable.rotate_by(config.turntable.increment_degrees);
                    rig.set_capture_light(&config.lights, true);
                    Some(SessionEvent::TurntableAdvanced)
                }
            }
        };

        Ok(event.map(|event| {
            let from = self.state;
            self.state = from.transition(event);
            Transition {
                from,
                to: self.state,
                event,
            }
        }))
    }

    /// Abandon any session in progress and wait for the peer again
    ///
    /// Actuators are left where they are; park the rig separately.
    pub fn abort(&mut self) {
        self.state = SessionState::WaitingForPeerStart;
        self.outbox = None;
    }

    /// Read at most one byte from the peer and decode a completed line
    fn poll_peer<P: Uart>(peer: &mut Channel<P>) -> Result<Option<PeerMessage>, SessionError> {
        match peer.poll() {
            Ok(Some(line)) => Ok(PeerMessage::from_line(&line)),
            Ok(None) => Ok(None),
            Err(ChannelError::Link(_)) => Err(SessionError::PeerLink),
            Err(ChannelError::Framing(e)) => Err(SessionError::PeerFraming(e)),
        }
    }

    /// End the session: zero the turntable, raise the arm, notify the peer
    ///
    /// The notice is queued; if sending fails now it goes out at the start
    /// of the next tick, so the wrap-up itself is never repeated.
    fn wrap_up<A, T, L, P>(&mut self, rig: &mut Rig<A, T, L>, config: &RigConfig, peer: &mut Channel<P>)
    where
        A: ServoDriver,
        T: TurntableDriver,
        L: LightDriver,
        P: Uart,
    {
        rig.turntable.reset();
        rig.arm.move_to(config.arm.home_angle);
        rig.set_capture_light(&config.lights, false);
        self.outbox = Some(StationMessage::FinishedImaging);
        // Failure keeps the notice queued for the next tick
        let _ = self.flush_outbox(peer);
    }

    /// Deliver a queued peer notice
    fn flush_outbox<P: Uart>(&mut self, peer: &mut Channel<P>) -> Result<(), SessionError> {
        if let Some(notice) = self.outbox {
            peer.send_line(notice.as_str())
                .map_err(|_| SessionError::PeerLink)?;
            self.outbox = None;
        }
        Ok(())
    }
}
