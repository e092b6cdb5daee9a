//! Capability traits
//!
//! These traits define the interface between the component lifecycle
//! and hardware-specific implementations.

pub mod component;
pub mod uart_device;

pub use component::{Component, ComponentError};
pub use uart_device::UartDevice;
