//! UART-attached device capability

use sfd_hal::uart::Uart;

/// A device that talks over a UART bus it does not construct itself
///
/// The bus is handed over by [`crate::app::register_uart_device`] after
/// the device has been instantiated.
pub trait UartDevice {
    /// Concrete bus type
    type Bus: Uart;

    /// Attach the bus, replacing any previous one
    fn set_uart_parent(&mut self, bus: Self::Bus);

    /// The attached bus, if any
    fn uart_parent(&mut self) -> Option<&mut Self::Bus>;

    /// Whether a bus has been attached
    fn has_uart_parent(&self) -> bool;
}
