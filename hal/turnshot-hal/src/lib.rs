//! Turnshot Hardware Abstraction Layer
//!
//! This crate defines the serial link traits the rig controller talks
//! through. Chip HALs (or anything implementing `embedded-io`) plug in
//! underneath, so the control logic runs unchanged on the board and on
//! the host test bench.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (turnshot-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  turnshot-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  embedded-io  │       │  test mocks   │
//! │  (IoUart)     │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod uart;

// Re-export key traits at crate root for convenience
pub use uart::{ErrorType, IoUart, Uart, UartConfig, UartRx, UartTx};
