//! Known component sections and their schemas

use sfd_core::config::LineLength;
use sfd_hal::uart::MAX_BAUDRATE;

use crate::schema::{Key, Schema, Validator};

/// A top-level configuration section
#[derive(Debug, Clone, Copy)]
pub struct ComponentSpec {
    /// Section name in the TOML document
    pub name: &'static str,
    /// Sections that must also be present
    pub dependencies: &'static [&'static str],
    pub schema: fn() -> Schema,
}

pub const UART: ComponentSpec = ComponentSpec {
    name: "uart",
    dependencies: &[],
    schema: uart_schema,
};

pub const SFD_VOSLOH: ComponentSpec = ComponentSpec {
    name: "sfd_vosloh",
    dependencies: &["uart"],
    schema: sfd_vosloh_schema,
};

/// Every section the loader accepts
pub const COMPONENTS: &[ComponentSpec] = &[UART, SFD_VOSLOH];

/// Look up a section by name
pub fn component(name: &str) -> Option<&'static ComponentSpec> {
    COMPONENTS.iter().find(|c| c.name == name)
}

pub const PARITIES: &[&str] = &["none", "even", "odd"];

/// Keys every lifecycle-managed component accepts
pub fn component_schema() -> Schema {
    Schema::new().key(Key::optional("setup_priority", Validator::Priority))
}

/// Keys every device on a UART bus accepts
pub fn uart_device_schema() -> Schema {
    Schema::new().key(Key::optional("uart_id", Validator::IdReference))
}

pub fn uart_schema() -> Schema {
    Schema::new()
        .key(Key::optional("id", Validator::Identifier))
        .key(Key::required("tx_pin", Validator::Pin))
        .key(Key::required("rx_pin", Validator::Pin))
        .key(Key::required(
            "baud_rate",
            Validator::IntRange {
                min: 1,
                max: i64::from(MAX_BAUDRATE),
            },
        ))
        .key(Key::with_default(
            "data_bits",
            Validator::IntRange { min: 5, max: 8 },
            8i64,
        ))
        .key(Key::with_default("parity", Validator::OneOf(PARITIES), "none"))
        .key(Key::with_default(
            "stop_bits",
            Validator::IntRange { min: 1, max: 2 },
            1i64,
        ))
}

pub fn sfd_vosloh_schema() -> Schema {
    Schema::new()
        .key(Key::optional("id", Validator::Identifier))
        .key(Key::with_default(
            "line_length",
            Validator::IntRange {
                min: i64::from(LineLength::MIN),
                max: i64::from(LineLength::MAX),
            },
            i64::from(LineLength::DEFAULT.get()),
        ))
        .extend(component_schema())
        .extend(uart_device_schema())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Presence;

    #[test]
    fn test_sfd_vosloh_schema() {
        let schema = sfd_vosloh_schema();
        let names: Vec<&str> = schema.keys().map(|k| k.name).collect();
        assert_eq!(names, ["id", "line_length", "setup_priority", "uart_id"]);

        let line_length = schema.get("line_length").unwrap();
        assert_eq!(line_length.presence, Presence::Default(toml::Value::Integer(127)));
        assert_eq!(line_length.validator, Validator::IntRange { min: 1, max: 127 });
    }

    #[test]
    fn test_lookup() {
        assert_eq!(component("sfd_vosloh").map(|c| c.dependencies), Some(&["uart"][..]));
        assert!(component("wifi").is_none());
    }
}
