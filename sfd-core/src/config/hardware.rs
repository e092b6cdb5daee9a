//! Hardware configuration types
//!
//! UART bus and split-flap display records, plus the RP2040 UART pin map
//! used to check that a bus's pins belong to one peripheral.

use sfd_hal::uart::UartConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{ComponentId, LineLength, SetupPriority};

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UartId {
    Uart0,
    Uart1,
}

impl UartId {
    /// Peripheral name as used by the chip HAL
    pub fn peripheral_name(self) -> &'static str {
        match self {
            UartId::Uart0 => "UART0",
            UartId::Uart1 => "UART1",
        }
    }
}

/// Determine which UART can use a given GPIO pin
///
/// RP2040 has specific pin mappings for each UART.
pub fn gpio_to_uart(gpio: u8) -> Option<UartId> {
    // UART0: GPIO 0/1, 12/13, 16/17, 28/29
    // UART1: GPIO 4/5, 8/9, 20/21, 24/25
    match gpio {
        0 | 1 | 12 | 13 | 16 | 17 | 28 | 29 => Some(UartId::Uart0),
        4 | 5 | 8 | 9 | 20 | 21 | 24 | 25 => Some(UartId::Uart1),
        _ => None,
    }
}

/// Whether `gpio` can be the TX line of its UART
///
/// TX pins are the even pins of each pair.
pub fn is_tx_pin(gpio: u8) -> bool {
    gpio_to_uart(gpio).is_some() && gpio % 2 == 0
}

/// Whether `gpio` can be the RX line of its UART
pub fn is_rx_pin(gpio: u8) -> bool {
    gpio_to_uart(gpio).is_some() && gpio % 2 == 1
}

/// Peripheral already in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlreadyAllocated(pub UartId);

/// UART allocation state
///
/// Each UART peripheral can back at most one configured bus.
#[derive(Debug, Default)]
pub struct UartAllocator {
    uart0_allocated: bool,
    uart1_allocated: bool,
}

impl UartAllocator {
    /// Create a new UART allocator
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, id: UartId) -> &mut bool {
        match id {
            UartId::Uart0 => &mut self.uart0_allocated,
            UartId::Uart1 => &mut self.uart1_allocated,
        }
    }

    /// Allocate a UART peripheral
    pub fn allocate(&mut self, id: UartId) -> Result<(), AlreadyAllocated> {
        let slot = self.slot(id);
        if *slot {
            return Err(AlreadyAllocated(id));
        }
        *slot = true;
        Ok(())
    }

    /// Release a UART peripheral
    pub fn release(&mut self, id: UartId) {
        *self.slot(id) = false;
    }

    /// Check if a UART is allocated
    pub fn is_allocated(&self, id: UartId) -> bool {
        match id {
            UartId::Uart0 => self.uart0_allocated,
            UartId::Uart1 => self.uart1_allocated,
        }
    }
}

/// A configured UART bus
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartBusConfig {
    /// Bus identifier referenced by `uart_id`
    pub id: ComponentId,
    /// Peripheral both pins belong to
    pub peripheral: UartId,
    /// TX GPIO number
    pub tx_pin: u8,
    /// RX GPIO number
    pub rx_pin: u8,
    /// Line settings
    pub uart: UartConfig,
}

/// A configured split-flap display
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SfdVoslohConfig {
    /// Display identifier
    pub id: ComponentId,
    /// Modules per row
    #[cfg_attr(feature = "serde", serde(default))]
    pub line_length: LineLength,
    /// Setup priority override
    #[cfg_attr(feature = "serde", serde(default))]
    pub setup_priority: Option<SetupPriority>,
    /// Bus the display is attached to
    pub uart_id: ComponentId,
}

impl SfdVoslohConfig {
    /// Configuration with defaults for everything but the ids
    pub fn new(id: ComponentId, uart_id: ComponentId) -> Self {
        Self {
            id,
            line_length: LineLength::DEFAULT,
            setup_priority: None,
            uart_id,
        }
    }
}
