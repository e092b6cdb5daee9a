//! Configuration types
//!
//! Board-agnostic configuration records produced by the configuration
//! loader and consumed by code generation.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
