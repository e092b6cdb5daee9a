//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in sfd-core for split-flap displays:
//!
//! - Vosloh split-flap displays on a UART bus

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
