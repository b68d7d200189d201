//! Serial channels: a polled link plus its line buffer
//!
//! The station has two channels, the operator console and the imaging
//! peer. Each owns its own [`LineFramer`], so a partial line on one never
//! disturbs the other.

use turnshot_hal::{UartRx, UartTx};
use turnshot_protocol::{Line, LineError, LineFramer};

/// Line terminator appended to every outgoing message
const LINE_END: &[u8] = b"\n";

/// Logical endpoints of the station
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelId {
    /// Human operator console
    Operator,
    /// External imaging device
    Peer,
}

/// Errors from polling a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError<E> {
    /// Underlying link failed
    Link(E),
    /// Line framing failed; the partial line was dropped
    Framing(LineError),
}

/// One serial endpoint and its line buffer
pub struct Channel<U> {
    id: ChannelId,
    link: U,
    framer: LineFramer,
}

impl<U> Channel<U> {
    /// Create a channel over a link
    pub fn new(id: ChannelId, link: U) -> Self {
        Self {
            id,
            link,
            framer: LineFramer::new(),
        }
    }

    /// Which endpoint this is
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// The line buffer of this channel
    pub fn framer(&self) -> &LineFramer {
        &self.framer
    }

    /// The underlying link
    pub fn link(&self) -> &U {
        &self.link
    }

    /// The underlying link, mutably
    pub fn link_mut(&mut self) -> &mut U {
        &mut self.link
    }
}

impl<U: UartRx> Channel<U> {
    /// Read at most one byte and feed it to the line buffer
    ///
    /// Returns `Ok(Some(line))` only on the call that receives the
    /// terminator. Never blocks.
    pub fn poll(&mut self) -> Result<Option<Line>, ChannelError<U::Error>> {
        match self.link.try_read_byte().map_err(ChannelError::Link)? {
            Some(byte) => self.framer.feed(byte).map_err(ChannelError::Framing),
            None => Ok(None),
        }
    }
}

impl<U: UartTx> Channel<U> {
    /// Send a message followed by the line terminator
    pub fn send_line(&mut self, text: &str) -> Result<(), U::Error> {
        self.link.write_blocking(text.as_bytes())?;
        self.link.write_blocking(LINE_END)?;
        self.link.flush()
    }

    /// Send text without a terminator (prompts)
    pub fn send_raw(&mut self, text: &str) -> Result<(), U::Error> {
        self.link.write_blocking(text.as_bytes())?;
        self.link.flush()
    }
}
