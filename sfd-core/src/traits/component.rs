//! Lifecycle-managed component trait

use crate::config::SetupPriority;

/// Errors a component reports to the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComponentError {
    /// Transport failed while talking to the hardware
    Communication,
    /// A required collaborator (bus, parent) was never registered
    NotConfigured,
}

/// A unit of functionality driven by [`crate::app::App`]
///
/// `setup` runs once in priority order, `loop_once` on every pass of the
/// main loop afterwards. A component whose hook fails is marked failed and
/// no longer driven.
pub trait Component {
    /// One-time initialization
    fn setup(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called on every main-loop pass after a successful setup
    fn loop_once(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Log the effective configuration
    fn dump_config(&self) {}

    /// Default setup priority, used unless the configuration overrides it
    fn setup_priority(&self) -> SetupPriority {
        SetupPriority::DATA
    }
}
