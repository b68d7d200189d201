//! Turnshot Serial Line Protocol
//!
//! This crate defines the text protocol spoken on both serial channels of
//! the imaging rig: the operator console and the imaging peer (the device
//! that actually triggers the camera).
//!
//! # Protocol Overview
//!
//! Every message is a line of ASCII text terminated by `\n`:
//! ```text
//! ┌─────────────────────────────┬────┐
//! │ TEXT (0–30 bytes, no '\n')  │ \n │
//! └─────────────────────────────┴────┘
//! ```
//!
//! There is no escaping and no checksum. The operator channel carries
//! space-delimited commands (see [`command`]); the peer channel carries the
//! fixed handshake vocabulary in [`messages`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod messages;

pub use command::{
    parse_number, Args, CommandDescriptor, CommandTable, DispatchError, Invocation, TableError,
    MAX_ARGS,
};
pub use line::{Line, LineError, LineFramer, LINE_TERMINATOR, MAX_LINE_LEN};
pub use messages::{PeerMessage, StationMessage};
