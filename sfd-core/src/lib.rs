//! Board-agnostic core logic for the split-flap firmware
//!
//! This crate contains all logic that does not depend on a specific
//! chip or display model:
//!
//! - Configuration type definitions (line length, ids, UART buses)
//! - Component and UART-device capability traits
//! - The component lifecycle registry ([`app::App`])
//! - Text layout for rows of flap modules

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod app;
pub mod config;
pub mod content;
pub mod traits;

pub use app::{register_uart_device, App, AppError, ComponentState};
pub use content::{layout_content, row_start, ContentMode, Layout};
