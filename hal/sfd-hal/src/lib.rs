//! SFD Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the split-flap
//! driver is written against. Chip-specific code (the RP2040 firmware,
//! host-side simulators in tests) implements them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  sfd-firmware / tests                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sfd-drivers (SfdVosloh)                │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sfd-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`], [`uart::Uart`] - Serial communication
//! - [`time::Clock`] - Millisecond time source for reply timeouts

#![no_std]
#![deny(unsafe_code)]

pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use time::Clock;
pub use uart::{ErrorType, Uart, UartConfig, UartRx, UartTx};
