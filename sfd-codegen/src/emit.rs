//! Code-generation statements
//!
//! Each component turns its validated configuration into a short list of
//! [`Statement`]s. A UART bus declares itself; a display is instantiated,
//! registered with the lifecycle, attached to its bus and handed its line
//! length, in that order.

use std::fmt;

use sfd_core::config::{ComponentId, LineLength, SetupPriority, SfdVoslohConfig, UartBusConfig, UartId};
use sfd_hal::uart::Parity;

use crate::loader::Configuration;

/// One step of the generated wiring code
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Bring up a UART peripheral as a bus
    DeclareUartBus(UartBusConfig),
    /// Construct a split-flap driver for a bus on `peripheral`
    Instantiate { id: ComponentId, peripheral: UartId },
    /// Hand the component to the lifecycle registry
    RegisterComponent {
        id: ComponentId,
        priority: Option<SetupPriority>,
    },
    /// Attach the component to its bus
    RegisterUartDevice { id: ComponentId, uart_id: ComponentId },
    /// Propagate the configured line length
    SetLineLength { id: ComponentId, line_length: LineLength },
}

impl Statement {
    /// Id of the component the statement acts on
    pub fn id(&self) -> &ComponentId {
        match self {
            Statement::DeclareUartBus(bus) => &bus.id,
            Statement::Instantiate { id, .. }
            | Statement::RegisterComponent { id, .. }
            | Statement::RegisterUartDevice { id, .. }
            | Statement::SetLineLength { id, .. } => id,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::DeclareUartBus(bus) => {
                let parity = match bus.uart.parity {
                    Parity::None => 'N',
                    Parity::Even => 'E',
                    Parity::Odd => 'O',
                };
                write!(
                    f,
                    "declare uart bus {} on {} (tx GPIO{}, rx GPIO{}, {} baud {}{}{})",
                    bus.id,
                    bus.peripheral.peripheral_name(),
                    bus.tx_pin,
                    bus.rx_pin,
                    bus.uart.baudrate,
                    bus.uart.data_bits.count(),
                    parity,
                    bus.uart.stop_bits.count()
                )
            }
            Statement::Instantiate { id, peripheral } => {
                write!(f, "instantiate sfd_vosloh {} on {}", id, peripheral.peripheral_name())
            }
            Statement::RegisterComponent { id, priority } => match priority {
                Some(p) => write!(f, "register component {} (setup priority {})", id, p),
                None => write!(f, "register component {}", id),
            },
            Statement::RegisterUartDevice { id, uart_id } => {
                write!(f, "register uart device {} on {}", id, uart_id)
            }
            Statement::SetLineLength { id, line_length } => {
                write!(f, "set line length of {} to {}", id, line_length)
            }
        }
    }
}

/// Statements for a UART bus
pub fn uart_to_code(bus: &UartBusConfig, out: &mut Vec<Statement>) {
    out.push(Statement::DeclareUartBus(bus.clone()));
}

/// Statements for a split-flap display on `bus`
pub fn sfd_vosloh_to_code(display: &SfdVoslohConfig, bus: &UartBusConfig, out: &mut Vec<Statement>) {
    out.push(Statement::Instantiate {
        id: display.id.clone(),
        peripheral: bus.peripheral,
    });
    out.push(Statement::RegisterComponent {
        id: display.id.clone(),
        priority: display.setup_priority,
    });
    out.push(Statement::RegisterUartDevice {
        id: display.id.clone(),
        uart_id: bus.id.clone(),
    });
    out.push(Statement::SetLineLength {
        id: display.id.clone(),
        line_length: display.line_length,
    });
}

/// Statements for a whole configuration, buses first
pub fn emit(config: &Configuration) -> Vec<Statement> {
    let mut out = Vec::new();
    for bus in config.uarts() {
        uart_to_code(bus, &mut out);
    }
    for display in config.displays() {
        // a validated configuration only references declared buses
        if let Some(bus) = config.uart(&display.uart_id) {
            sfd_vosloh_to_code(display, bus, &mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfd_hal::uart::UartConfig;

    fn id(s: &str) -> ComponentId {
        ComponentId::new(s).unwrap()
    }

    fn bus() -> UartBusConfig {
        UartBusConfig {
            id: id("bus"),
            peripheral: UartId::Uart1,
            tx_pin: 8,
            rx_pin: 9,
            uart: UartConfig::default(),
        }
    }

    #[test]
    fn test_display_statement_order() {
        let mut display = SfdVoslohConfig::new(id("sign"), id("bus"));
        display.line_length = LineLength::new(20).unwrap();

        let mut out = Vec::new();
        sfd_vosloh_to_code(&display, &bus(), &mut out);

        assert_eq!(
            out,
            [
                Statement::Instantiate {
                    id: id("sign"),
                    peripheral: UartId::Uart1
                },
                Statement::RegisterComponent {
                    id: id("sign"),
                    priority: None
                },
                Statement::RegisterUartDevice {
                    id: id("sign"),
                    uart_id: id("bus")
                },
                Statement::SetLineLength {
                    id: id("sign"),
                    line_length: LineLength::new(20).unwrap()
                },
            ]
        );
        assert!(out.iter().all(|s| s.id().as_str() == "sign"));
    }

    #[test]
    fn test_plan_lines() {
        let bus = Statement::DeclareUartBus(bus());
        assert_eq!(
            bus.to_string(),
            "declare uart bus bus on UART1 (tx GPIO8, rx GPIO9, 19200 baud 8N1)"
        );

        let register = Statement::RegisterComponent {
            id: id("sign"),
            priority: Some(SetupPriority::LATE),
        };
        assert_eq!(register.to_string(), "register component sign (setup priority -100.0)");

        let set = Statement::SetLineLength {
            id: id("sign"),
            line_length: LineLength::DEFAULT,
        };
        assert_eq!(set.to_string(), "set line length of sign to 127");
    }
}
