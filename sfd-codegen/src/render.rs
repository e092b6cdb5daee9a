//! Rust source rendering
//!
//! Turns [`Statement`]s into a module the firmware includes from
//! `$OUT_DIR`. The module expects the including crate to provide
//! `crate::Irqs` (bound to the buffered UART interrupt handlers) and the
//! `crate::uart` glue (`RpUart`, `EmbassyClock`, `rp_config`,
//! `BUFFER_SIZE`). Every other path is fully qualified.

use std::fmt::{self, Write};

use sfd_core::config::ComponentId;
use sfd_hal::uart::{DataBits, Parity, StopBits, UartConfig};

use crate::emit::Statement;

/// Render the wiring module for `statements`
pub fn render_rust(statements: &[Statement]) -> String {
    let mut out = String::new();
    // formatting into a String never fails
    let _ = write_module(&mut out, statements);
    out
}

fn write_module(out: &mut String, statements: &[Statement]) -> fmt::Result {
    let count = statements
        .iter()
        .filter(|s| matches!(s, Statement::RegisterComponent { .. }))
        .count();

    writeln!(out, "// @generated by sfd-codegen. Do not edit.")?;
    writeln!(out)?;
    writeln!(out, "/// Number of components registered by [`build_components`]")?;
    writeln!(out, "pub const COMPONENT_COUNT: usize = {};", count)?;
    writeln!(out)?;

    for statement in statements {
        match statement {
            Statement::DeclareUartBus(bus) => {
                for half in ["TX", "RX"] {
                    writeln!(
                        out,
                        "static {}: static_cell::StaticCell<[u8; crate::uart::BUFFER_SIZE]> = static_cell::StaticCell::new();",
                        buffer_static(&bus.id, half)
                    )?;
                }
            }
            Statement::Instantiate { id, .. } => {
                writeln!(
                    out,
                    "static {}: static_cell::StaticCell<core::cell::RefCell<{}>> = static_cell::StaticCell::new();",
                    display_static(id),
                    DISPLAY_TYPE
                )?;
            }
            _ => {}
        }
    }

    writeln!(out)?;
    writeln!(out, "/// Bring up every configured bus and component")?;
    writeln!(out, "#[allow(unused_variables, non_snake_case)]")?;
    writeln!(out, "pub fn build_components(")?;
    writeln!(out, "    app: &mut sfd_core::app::App<'static, COMPONENT_COUNT>,")?;
    writeln!(out, "    p: embassy_rp::Peripherals,")?;
    writeln!(out, ") -> Result<(), sfd_core::app::AppError> {{")?;

    for statement in statements {
        writeln!(out, "    // {}", statement)?;
        write_statement(out, statement)?;
    }

    writeln!(out, "    Ok(())")?;
    writeln!(out, "}}")
}

fn write_statement(out: &mut String, statement: &Statement) -> fmt::Result {
    match statement {
        Statement::DeclareUartBus(bus) => {
            writeln!(out, "    let {} = crate::uart::RpUart::new(", bus.id)?;
            writeln!(out, "        embassy_rp::uart::Uart::new_blocking(")?;
            writeln!(out, "            p.{},", bus.peripheral.peripheral_name())?;
            writeln!(out, "            p.PIN_{},", bus.tx_pin)?;
            writeln!(out, "            p.PIN_{},", bus.rx_pin)?;
            writeln!(out, "            crate::uart::rp_config(&{}),", uart_config(&bus.uart))?;
            writeln!(out, "        )")?;
            writeln!(out, "        .into_buffered(")?;
            writeln!(out, "            crate::Irqs,")?;
            for half in ["TX", "RX"] {
                writeln!(
                    out,
                    "            {}.init([0; crate::uart::BUFFER_SIZE]),",
                    buffer_static(&bus.id, half)
                )?;
            }
            writeln!(out, "        ),")?;
            writeln!(out, "    );")
        }
        Statement::Instantiate { id, .. } => {
            writeln!(
                out,
                "    let {}: &'static core::cell::RefCell<_> = {}.init(core::cell::RefCell::new(",
                id,
                display_static(id)
            )?;
            writeln!(out, "        sfd_drivers::display::SfdVosloh::new(crate::uart::EmbassyClock),")?;
            writeln!(out, "    ));")
        }
        Statement::RegisterComponent { id, priority } => {
            let priority = match priority {
                Some(p) => format!("Some(sfd_core::config::SetupPriority({:?}))", p.value()),
                None => "None".to_string(),
            };
            writeln!(out, "    app.register_component(\"{}\", {}, {})?;", id, id, priority)
        }
        Statement::RegisterUartDevice { id, uart_id } => {
            writeln!(out, "    sfd_core::app::register_uart_device({}, {})?;", id, uart_id)
        }
        Statement::SetLineLength { id, line_length } => {
            writeln!(out, "    {}.borrow_mut().set_line_length(const {{", id)?;
            writeln!(out, "        match sfd_core::config::LineLength::new({}) {{", line_length)?;
            writeln!(out, "            Ok(l) => l,")?;
            writeln!(out, "            Err(_) => panic!(\"line_length out of range\"),")?;
            writeln!(out, "        }}")?;
            writeln!(out, "    }});")
        }
    }
}

fn buffer_static(id: &ComponentId, half: &str) -> String {
    format!("BUS_{}_{}", id.as_str().to_ascii_uppercase(), half)
}

fn display_static(id: &ComponentId) -> String {
    format!("SFD_{}", id.as_str().to_ascii_uppercase())
}

const DISPLAY_TYPE: &str =
    "sfd_drivers::display::SfdVosloh<crate::uart::RpUart, crate::uart::EmbassyClock>";

fn uart_config(config: &UartConfig) -> String {
    let data_bits = match config.data_bits {
        DataBits::Five => "Five",
        DataBits::Six => "Six",
        DataBits::Seven => "Seven",
        DataBits::Eight => "Eight",
    };
    let parity = match config.parity {
        Parity::None => "None",
        Parity::Even => "Even",
        Parity::Odd => "Odd",
    };
    let stop_bits = match config.stop_bits {
        StopBits::One => "One",
        StopBits::Two => "Two",
    };
    format!(
        "sfd_hal::uart::UartConfig {{ baudrate: {}, data_bits: sfd_hal::uart::DataBits::{}, parity: sfd_hal::uart::Parity::{}, stop_bits: sfd_hal::uart::StopBits::{} }}",
        config.baudrate, data_bits, parity, stop_bits
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfd_core::config::{LineLength, SetupPriority, UartBusConfig, UartId};

    fn id(s: &str) -> ComponentId {
        ComponentId::new(s).unwrap()
    }

    fn statements() -> Vec<Statement> {
        vec![
            Statement::DeclareUartBus(UartBusConfig {
                id: id("rs485"),
                peripheral: UartId::Uart0,
                tx_pin: 16,
                rx_pin: 17,
                uart: UartConfig {
                    baudrate: 9600,
                    parity: Parity::Even,
                    ..UartConfig::default()
                },
            }),
            Statement::Instantiate {
                id: id("platform"),
                peripheral: UartId::Uart0,
            },
            Statement::RegisterComponent {
                id: id("platform"),
                priority: Some(SetupPriority::HARDWARE),
            },
            Statement::RegisterUartDevice {
                id: id("platform"),
                uart_id: id("rs485"),
            },
            Statement::SetLineLength {
                id: id("platform"),
                line_length: LineLength::new(24).unwrap(),
            },
        ]
    }

    #[test]
    fn test_render_declares_statics() {
        let source = render_rust(&statements());

        assert!(source.starts_with("// @generated"));
        assert!(source.contains("pub const COMPONENT_COUNT: usize = 1;"));
        assert!(source.contains("static BUS_RS485_TX: static_cell::StaticCell<[u8; crate::uart::BUFFER_SIZE]>"));
        assert!(source.contains("static BUS_RS485_RX:"));
        assert!(source.contains(
            "static SFD_PLATFORM: static_cell::StaticCell<core::cell::RefCell<sfd_drivers::display::SfdVosloh<crate::uart::RpUart, crate::uart::EmbassyClock>>>"
        ));
    }

    #[test]
    fn test_render_wiring_calls() {
        let source = render_rust(&statements());

        assert!(source.contains("p.UART0,\n            p.PIN_16,\n            p.PIN_17,"));
        assert!(source.contains("baudrate: 9600"));
        assert!(source.contains("parity: sfd_hal::uart::Parity::Even"));
        assert!(source.contains(
            "app.register_component(\"platform\", platform, Some(sfd_core::config::SetupPriority(800.0)))?;"
        ));
        assert!(source.contains("sfd_core::app::register_uart_device(platform, rs485)?;"));
        assert!(source.contains("platform.borrow_mut().set_line_length(const {"));
        assert!(source.contains("sfd_core::config::LineLength::new(24)"));
        assert!(source.trim_end().ends_with("Ok(())\n}"));
    }

    #[test]
    fn test_render_orders_calls() {
        let source = render_rust(&statements());
        let position = |needle: &str| source.find(needle).unwrap();

        assert!(position("let rs485") < position("let platform"));
        assert!(position("let platform") < position("app.register_component"));
        assert!(position("app.register_component") < position("register_uart_device"));
        assert!(position("register_uart_device") < position("set_line_length"));
    }
}
