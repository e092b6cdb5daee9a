//! Vosloh Split-Flap Module Protocol
//!
//! This crate defines the byte protocol spoken on the RS-485/UART bus shared
//! by the flap modules of a Vosloh split-flap display. Every module has a
//! fixed address between 1 and 127; the controller addresses them directly.
//!
//! # Protocol Overview
//!
//! Commands are unframed byte sequences:
//! ```text
//! ┌─────────┬─────────┬───────────┐
//! │ COMMAND │ ADDRESS │ CHARACTER │
//! │ 1B      │ 0–1B    │ 0–1B      │
//! └─────────┴─────────┴───────────┘
//! ```
//!
//! Written characters are only shown once an ADAPT command is sent, which
//! makes all modules flip at the same time. READ and STATE requests are
//! answered by the addressed module with a single byte.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod reply;

pub use command::{Command, ProtocolError, MAX_COMMAND_SIZE, POSITION_MAX, POSITION_MIN};
pub use reply::{CharacterReply, ModuleState};
