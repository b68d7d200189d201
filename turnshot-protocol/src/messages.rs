//! Handshake vocabulary on the peer channel
//!
//! Messages are divided into two categories:
//! - Peer → Station: session start, capture completion
//! - Station → Peer: capture request, end-of-session notice
//!
//! Matching is exact: no trimming beyond what the line framer already does,
//! no case folding.

const MSG_START: &str = "start";
const MSG_FINISHED: &str = "finished";
const MSG_PICTURE: &str = "picture";
const MSG_FINISHED_IMAGING: &str = "finished-imaging";

/// Messages from the imaging peer to the station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerMessage {
    /// Peer is ready, begin an imaging session
    Start,
    /// Peer has taken the requested picture
    Finished,
}

impl PeerMessage {
    /// Parse a completed line
    ///
    /// Returns `None` for anything outside the handshake vocabulary.
    pub fn from_line(line: &str) -> Option<Self> {
        match line {
            MSG_START => Some(PeerMessage::Start),
            MSG_FINISHED => Some(PeerMessage::Finished),
            _ => None,
        }
    }

    /// Wire text of this message
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerMessage::Start => MSG_START,
            PeerMessage::Finished => MSG_FINISHED,
        }
    }
}

/// Messages from the station to the imaging peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StationMessage {
    /// Ask the peer to take a picture
    Capture,
    /// The turntable completed its revolution; the session is over
    FinishedImaging,
}

impl StationMessage {
    /// Wire text of this message (terminator not included)
    pub fn as_str(&self) -> &'static str {
        match self {
            StationMessage::Capture => MSG_PICTURE,
            StationMessage::FinishedImaging => MSG_FINISHED_IMAGING,
        }
    }
}
