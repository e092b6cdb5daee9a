//! Split-flap display drivers

pub mod vosloh;

pub use vosloh::{SfdError, SfdVosloh, DEFAULT_REPLY_TIMEOUT_MS};
