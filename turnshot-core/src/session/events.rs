//! Events that trigger session transitions

use crate::config::RigConfig;

/// Where the session stands when the peer reports a finished picture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureProgress {
    /// Arm still raised: this was the first picture, lower the arm next
    ArmRaised,
    /// Turntable has not gone past one revolution yet
    RevolutionPending,
    /// Turntable is beyond one revolution (manual rotation during a session)
    RevolutionOvershot,
}

impl CaptureProgress {
    /// Classify the rig state after a picture
    ///
    /// The arm check comes first, so every session lowers the arm exactly
    /// once before the turntable moves. A position of exactly one
    /// revolution is still pending: the advance step is where the session
    /// is wrapped up.
    pub fn classify(arm_raised: bool, turntable_degrees: u32, config: &RigConfig) -> Self {
        if arm_raised {
            CaptureProgress::ArmRaised
        } else if turntable_degrees <= config.turntable.revolution_degrees {
            CaptureProgress::RevolutionPending
        } else {
            CaptureProgress::RevolutionOvershot
        }
    }
}

/// Events that can trigger session transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    // Peer events
    /// Peer sent `start`
    PeerStart,
    /// Capture request sent to the peer
    CaptureRequested,
    /// Peer sent `finished`
    CaptureDone(CaptureProgress),

    // Actuator events
    /// Arm moved down to the capture angle
    ArmLowered,
    /// Turntable advanced by one increment
    TurntableAdvanced,
    /// Full revolution done; arm raised, peer notified
    RevolutionComplete,
}

impl SessionEvent {
    /// Check if this event ends the session
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            SessionEvent::RevolutionComplete
                | SessionEvent::CaptureDone(CaptureProgress::RevolutionOvershot)
        )
    }

    /// Diagnostic text reported on the operator console
    pub fn message(&self) -> &'static str {
        match self {
            SessionEvent::PeerStart => "starting imaging session",
            SessionEvent::CaptureRequested => "requesting picture from peer",
            SessionEvent::CaptureDone(CaptureProgress::RevolutionOvershot) => {
                "turntable past revolution, imaging session finished"
            }
            SessionEvent::CaptureDone(_) => "picture finished",
            SessionEvent::ArmLowered => "arm lowered",
            SessionEvent::TurntableAdvanced => "turntable advanced",
            SessionEvent::RevolutionComplete => "imaging session finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_check_precedes_revolution_check() {
        let config = RigConfig::default();
        let home = true;
        assert_eq!(
            CaptureProgress::classify(home, 0, &config),
            CaptureProgress::ArmRaised
        );
        assert_eq!(
            CaptureProgress::classify(home, 720, &config),
            CaptureProgress::ArmRaised
        );
    }

    #[test]
    fn test_exact_revolution_is_pending() {
        let config = RigConfig::default();
        let lowered = false;
        assert_eq!(
            CaptureProgress::classify(lowered, 315, &config),
            CaptureProgress::RevolutionPending
        );
        assert_eq!(
            CaptureProgress::classify(lowered, 360, &config),
            CaptureProgress::RevolutionPending
        );
        assert_eq!(
            CaptureProgress::classify(lowered, 361, &config),
            CaptureProgress::RevolutionOvershot
        );
    }

    #[test]
    fn test_event_categories() {
        assert!(SessionEvent::RevolutionComplete.ends_session());
        assert!(SessionEvent::CaptureDone(CaptureProgress::RevolutionOvershot).ends_session());
        assert!(!SessionEvent::TurntableAdvanced.ends_session());
    }
}
