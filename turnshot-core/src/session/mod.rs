//! Imaging session state machine
//!
//! Coordinates the arm, the turntable and the imaging peer through one
//! full revolution of pictures. The transition table in [`machine`] is pure;
//! [`runner`] performs the actuator moves and peer messages that produce
//! the events feeding it.

pub mod events;
pub mod machine;
pub mod runner;

pub use events::{CaptureProgress, SessionEvent};
pub use machine::SessionState;
pub use runner::{Session, SessionError, Transition};
