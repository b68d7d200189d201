//! Session state machine definition
//!
//! Every actuator move and peer message of a session is a function of the
//! current state and an event. There is no terminal state: a finished
//! session returns to [`SessionState::WaitingForPeerStart`].

use super::events::{CaptureProgress, SessionEvent};

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Idle until the peer sends `start`
    #[default]
    WaitingForPeerStart,
    /// Send the capture request to the peer
    RequestingCapture,
    /// Waiting for the peer to send `finished`
    WaitingForCaptureDone,
    /// Rotate the turntable one increment, or wrap up after a revolution
    AdvancingTurntable,
    /// Lower the arm to the capture angle
    LoweringArm,
}

impl SessionState {
    /// Check if this state waits on a peer message
    ///
    /// Only waiting states read from the peer channel; the others act and
    /// move on within one tick.
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            SessionState::WaitingForPeerStart | SessionState::WaitingForCaptureDone
        )
    }

    /// Short name for status output
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::WaitingForPeerStart => "waiting-for-peer-start",
            SessionState::RequestingCapture => "requesting-capture",
            SessionState::WaitingForCaptureDone => "waiting-for-capture-done",
            SessionState::AdvancingTurntable => "advancing-turntable",
            SessionState::LoweringArm => "lowering-arm",
        }
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: SessionEvent) -> Self {
        use CaptureProgress::*;
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            // Idle
            (WaitingForPeerStart, PeerStart) => RequestingCapture,

            // Capture handshake
            (RequestingCapture, CaptureRequested) => WaitingForCaptureDone,
            (WaitingForCaptureDone, CaptureDone(ArmRaised)) => LoweringArm,
            (WaitingForCaptureDone, CaptureDone(RevolutionPending)) => AdvancingTurntable,
            (WaitingForCaptureDone, CaptureDone(RevolutionOvershot)) => WaitingForPeerStart,

            // Actuator steps
            (LoweringArm, ArmLowered) => RequestingCapture,
            (AdvancingTurntable, TurntableAdvanced) => RequestingCapture,
            (AdvancingTurntable, RevolutionComplete) => WaitingForPeerStart,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(SessionState::default(), SessionState::WaitingForPeerStart);
    }

    #[test]
    fn test_start_requests_capture() {
        let next = SessionState::WaitingForPeerStart.transition(SessionEvent::PeerStart);
        assert_eq!(next, SessionState::RequestingCapture);
        let next = next.transition(SessionEvent::CaptureRequested);
        assert_eq!(next, SessionState::WaitingForCaptureDone);
    }

    #[test]
    fn test_first_capture_lowers_arm() {
        let state = SessionState::WaitingForCaptureDone;
        let next = state.transition(SessionEvent::CaptureDone(CaptureProgress::ArmRaised));
        assert_eq!(next, SessionState::LoweringArm);
        assert_ne!(next, SessionState::AdvancingTurntable);
        assert_eq!(
            next.transition(SessionEvent::ArmLowered),
            SessionState::RequestingCapture
        );
    }

    #[test]
    fn test_advance_cycle() {
        let state = SessionState::WaitingForCaptureDone
            .transition(SessionEvent::CaptureDone(CaptureProgress::RevolutionPending));
        assert_eq!(state, SessionState::AdvancingTurntable);
        assert_eq!(
            state.transition(SessionEvent::TurntableAdvanced),
            SessionState::RequestingCapture
        );
        assert_eq!(
            state.transition(SessionEvent::RevolutionComplete),
            SessionState::WaitingForPeerStart
        );
    }

    #[test]
    fn test_overshoot_ends_session() {
        let next = SessionState::WaitingForCaptureDone
            .transition(SessionEvent::CaptureDone(CaptureProgress::RevolutionOvershot));
        assert_eq!(next, SessionState::WaitingForPeerStart);
    }

    #[test]
    fn test_out_of_place_events_ignored() {
        let cases = [
            (SessionState::WaitingForPeerStart, SessionEvent::CaptureDone(CaptureProgress::ArmRaised)),
            (SessionState::WaitingForCaptureDone, SessionEvent::PeerStart),
            (SessionState::RequestingCapture, SessionEvent::ArmLowered),
            (SessionState::LoweringArm, SessionEvent::TurntableAdvanced),
            (SessionState::AdvancingTurntable, SessionEvent::PeerStart),
        ];

        for (state, event) in cases {
            assert_eq!(state.transition(event), state);
        }
    }

    #[test]
    fn test_waiting_states() {
        assert!(SessionState::WaitingForPeerStart.is_waiting());
        assert!(SessionState::WaitingForCaptureDone.is_waiting());
        assert!(!SessionState::RequestingCapture.is_waiting());
        assert!(!SessionState::LoweringArm.is_waiting());
        assert!(!SessionState::AdvancingTurntable.is_waiting());
    }
}
