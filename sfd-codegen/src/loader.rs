//! Configuration loading
//!
//! Parses a TOML document, validates every section against its schema and
//! checks the document as a whole: component dependencies, unique ids,
//! bus references and UART pin assignments. Every problem is collected
//! before giving up.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::debug;
use toml::{Table, Value};

use sfd_core::config::{
    gpio_to_uart, is_rx_pin, is_tx_pin, ComponentId, SfdVoslohConfig, UartAllocator, UartBusConfig,
    UartId,
};
use sfd_hal::uart::{DataBits, Parity, StopBits, UartConfig};

use crate::components::{self, COMPONENTS};
use crate::error::{ConfigError, SchemaError, ValidationErrors};

/// Names used by the generated wiring code, unavailable as ids
pub const RESERVED_IDS: &[&str] = &["app", "p", "Ok", "Err", "Some", "None"];

/// A validated configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    uarts: Vec<UartBusConfig>,
    displays: Vec<SfdVoslohConfig>,
}

impl Configuration {
    /// Declared UART buses, in document order
    pub fn uarts(&self) -> &[UartBusConfig] {
        &self.uarts
    }

    /// Declared displays, in document order
    pub fn displays(&self) -> &[SfdVoslohConfig] {
        &self.displays
    }

    /// The bus with id `id`
    pub fn uart(&self, id: &ComponentId) -> Option<&UartBusConfig> {
        self.uarts.iter().find(|u| &u.id == id)
    }
}

/// Load and validate a configuration file
pub fn load_file(path: impl AsRef<Path>) -> Result<Configuration, ConfigError> {
    let path = path.as_ref();
    debug!("Loading {}", path.display());
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&source)
}

/// Parse and validate a configuration document
pub fn load_str(source: &str) -> Result<Configuration, ConfigError> {
    let document: Table = toml::from_str(source)?;
    Ok(validate_document(&document)?)
}

/// Validate a parsed configuration document
pub fn validate_document(document: &Table) -> Result<Configuration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for name in document.keys() {
        if components::component(name).is_none() {
            errors.push(name.clone(), SchemaError::UnknownSection);
        }
    }

    for spec in COMPONENTS.iter().filter(|c| document.contains_key(c.name)) {
        for &requires in spec.dependencies {
            if !document.contains_key(requires) {
                errors.push(
                    spec.name,
                    SchemaError::MissingDependency {
                        component: spec.name,
                        requires,
                    },
                );
            }
        }
    }

    let mut ids = IdRegistry::new(document);
    let mut loader = UartLoader::default();
    let uart_entries = entries(document, components::UART.name, &mut errors);
    for (index, (path, table)) in uart_entries.into_iter().enumerate() {
        let table = components::uart_schema().validate(table, &path, &mut errors);
        loader.load(index, &path, &table, &mut ids, &mut errors);
    }
    debug!("{} uart bus(es)", loader.buses.len());

    let mut displays = Vec::new();
    let mut bound = HashSet::new();
    let display_entries = entries(document, components::SFD_VOSLOH.name, &mut errors);
    for (index, (path, table)) in display_entries.into_iter().enumerate() {
        let mut table = components::sfd_vosloh_schema().validate(table, &path, &mut errors);

        let id = ids.resolve(&path, &table, components::SFD_VOSLOH.name, index, &mut errors);
        let uart_id = loader.resolve(&path, &table, &mut errors);

        if let Some(uart_id) = &uart_id {
            if !bound.insert(uart_id.clone()) {
                errors.push(format!("{}.uart_id", path), SchemaError::BusShared(uart_id.to_string()));
            }
        }

        if let (Some(id), Some(uart_id)) = (id, uart_id) {
            table.insert("id".into(), Value::String(id.to_string()));
            table.insert("uart_id".into(), Value::String(uart_id.to_string()));
            match Value::Table(table).try_into::<SfdVoslohConfig>() {
                Ok(display) => displays.push(display),
                Err(e) => errors.push(path, SchemaError::Malformed(e.to_string())),
            }
        }
    }
    debug!("{} display(s)", displays.len());

    errors.into_result(Configuration {
        uarts: loader.buses,
        displays,
    })
}

/// The tables of one section, with their paths
///
/// A section is either a single table or an array of tables.
fn entries<'d>(document: &'d Table, name: &str, errors: &mut ValidationErrors) -> Vec<(String, &'d Table)> {
    match document.get(name) {
        None => Vec::new(),
        Some(Value::Table(table)) => vec![(name.to_string(), table)],
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let path = format!("{}[{}]", name, i);
                match item {
                    Value::Table(table) => Some((path, table)),
                    other => {
                        errors.push(
                            path,
                            SchemaError::WrongType {
                                expected: "table",
                                found: other.type_str(),
                            },
                        );
                        None
                    }
                }
            })
            .collect(),
        Some(other) => {
            errors.push(
                name,
                SchemaError::WrongType {
                    expected: "table or array of tables",
                    found: other.type_str(),
                },
            );
            Vec::new()
        }
    }
}

/// Ids claimed so far
///
/// Generated code derives static names from ids in upper case, so ids
/// must be unique ignoring case. Every explicit id in the document is
/// known up front so that generated ids never take one.
#[derive(Default)]
struct IdRegistry {
    explicit: HashSet<String>,
    seen: HashSet<String>,
}

impl IdRegistry {
    fn new(document: &Table) -> Self {
        let explicit = COMPONENTS
            .iter()
            .filter_map(|c| document.get(c.name))
            .flat_map(|section| match section {
                Value::Array(items) => items.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .filter_map(|entry| entry.get("id").and_then(Value::as_str))
            .map(str::to_ascii_lowercase)
            .collect();

        Self {
            explicit,
            seen: HashSet::new(),
        }
    }

    /// First `<name>_<n>`, from `n = index`, not claimed by any id
    fn generate(&self, name: &str, index: usize) -> String {
        let mut n = index;
        loop {
            let candidate = format!("{}_{}", name, n);
            let key = candidate.to_ascii_lowercase();
            if !self.explicit.contains(&key) && !self.seen.contains(&key) {
                return candidate;
            }
            n += 1;
        }
    }

    /// The explicit id of `table`, or a generated one
    fn resolve(
        &mut self,
        path: &str,
        table: &Table,
        name: &str,
        index: usize,
        errors: &mut ValidationErrors,
    ) -> Option<ComponentId> {
        let id_path = format!("{}.id", path);
        let id = match table.get("id") {
            Some(Value::String(s)) => s.clone(),
            // present but invalid, already reported
            Some(_) => return None,
            None if errors.has_error_at(&id_path) => return None,
            None => self.generate(name, index),
        };

        if RESERVED_IDS.contains(&id.as_str()) {
            errors.push(id_path, SchemaError::ReservedId(id));
            return None;
        }
        if !self.seen.insert(id.to_ascii_lowercase()) {
            errors.push(id_path, SchemaError::DuplicateId(id));
            return None;
        }

        match ComponentId::new(&id) {
            Ok(id) => Some(id),
            Err(e) => {
                errors.push(id_path, SchemaError::InvalidId(e));
                None
            }
        }
    }
}

/// Builds UART buses and resolves references to them
#[derive(Default)]
struct UartLoader {
    buses: Vec<UartBusConfig>,
    /// Every declared id, including buses that failed validation
    declared: Vec<ComponentId>,
    allocator: UartAllocator,
}

impl UartLoader {
    fn load(
        &mut self,
        index: usize,
        path: &str,
        table: &Table,
        ids: &mut IdRegistry,
        errors: &mut ValidationErrors,
    ) {
        let id = ids.resolve(path, table, components::UART.name, index, errors);
        if let Some(id) = &id {
            self.declared.push(id.clone());
        }

        let pins = self.load_pins(path, table, errors);
        let uart = load_line_settings(path, table, errors);

        if let (Some(id), Some((peripheral, tx_pin, rx_pin)), Some(uart)) = (id, pins, uart) {
            debug!("{}: {} tx GPIO{} rx GPIO{}", id, peripheral.peripheral_name(), tx_pin, rx_pin);
            self.buses.push(UartBusConfig {
                id,
                peripheral,
                tx_pin,
                rx_pin,
                uart,
            });
        }
    }

    fn load_pins(
        &mut self,
        path: &str,
        table: &Table,
        errors: &mut ValidationErrors,
    ) -> Option<(UartId, u8, u8)> {
        let tx = small_int(table, "tx_pin");
        let rx = small_int(table, "rx_pin");

        if let Some(tx) = tx.filter(|p| !is_tx_pin(*p)) {
            errors.push(format!("{}.tx_pin", path), SchemaError::NotTxPin(tx));
        }
        if let Some(rx) = rx.filter(|p| !is_rx_pin(*p)) {
            errors.push(format!("{}.rx_pin", path), SchemaError::NotRxPin(rx));
        }

        let (tx, rx) = (tx.filter(|p| is_tx_pin(*p))?, rx.filter(|p| is_rx_pin(*p))?);
        let peripheral = match (gpio_to_uart(tx), gpio_to_uart(rx)) {
            (Some(a), Some(b)) if a == b => a,
            _ => {
                errors.push(path, SchemaError::PinMismatch { tx, rx });
                return None;
            }
        };

        if let Err(e) = self.allocator.allocate(peripheral) {
            errors.push(path, SchemaError::PeripheralInUse(e.0));
            return None;
        }
        Some((peripheral, tx, rx))
    }

    /// The bus a device at `path` is attached to
    ///
    /// Without an explicit `uart_id` the only declared bus is used.
    fn resolve(&self, path: &str, table: &Table, errors: &mut ValidationErrors) -> Option<ComponentId> {
        let uart_path = format!("{}.uart_id", path);
        match table.get("uart_id").and_then(Value::as_str) {
            Some(reference) => {
                let Some(id) = self.declared.iter().find(|id| id.as_str() == reference) else {
                    errors.push(uart_path, SchemaError::UnknownUart(reference.to_string()));
                    return None;
                };
                // buses that failed validation are already reported
                self.buses.iter().find(|b| &b.id == id).map(|b| b.id.clone())
            }
            None if errors.has_error_at(&uart_path) => None,
            None => match self.buses.as_slice() {
                [only] => Some(only.id.clone()),
                // declared buses that failed validation are already reported
                [] if !self.declared.is_empty() => None,
                [] => {
                    errors.push(uart_path, SchemaError::NoUart);
                    None
                }
                _ => {
                    errors.push(uart_path, SchemaError::AmbiguousUart);
                    None
                }
            },
        }
    }
}

fn small_int(table: &Table, key: &str) -> Option<u8> {
    table
        .get(key)
        .and_then(Value::as_integer)
        .and_then(|n| u8::try_from(n).ok())
}

fn load_line_settings(path: &str, table: &Table, errors: &mut ValidationErrors) -> Option<UartConfig> {
    let baudrate = table
        .get("baud_rate")
        .and_then(Value::as_integer)
        .and_then(|b| u32::try_from(b).ok())?;
    let data_bits = DataBits::from_count(small_int(table, "data_bits")?).ok()?;
    let stop_bits = StopBits::from_count(small_int(table, "stop_bits")?).ok()?;
    let parity = match table.get("parity").and_then(Value::as_str)? {
        "even" => Parity::Even,
        "odd" => Parity::Odd,
        _ => Parity::None,
    };

    let config = UartConfig {
        baudrate,
        data_bits,
        parity,
        stop_bits,
    };
    if let Err(e) = config.validate() {
        errors.push(path, SchemaError::InvalidUart(e));
        return None;
    }
    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_of(source: &str) -> ValidationErrors {
        match load_str(source) {
            Err(ConfigError::Invalid(errors)) => errors,
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_uart_defaults() {
        let config = load_str(
            r#"
            [[uart]]
            tx_pin = "GPIO4"
            rx_pin = "GPIO5"
            baud_rate = 19200
            "#,
        )
        .unwrap();

        let bus = &config.uarts()[0];
        assert_eq!(bus.id.as_str(), "uart_0");
        assert_eq!(bus.peripheral, UartId::Uart1);
        assert_eq!(bus.uart, UartConfig::default());
    }

    #[test]
    fn test_pins_must_share_a_peripheral() {
        let errors = errors_of(
            r#"
            [[uart]]
            tx_pin = "GPIO0"
            rx_pin = "GPIO5"
            baud_rate = 9600
            "#,
        );
        assert_eq!(errors.iter().next().map(|e| &e.error), Some(&SchemaError::PinMismatch { tx: 0, rx: 5 }));
    }

    #[test]
    fn test_pin_roles() {
        let errors = errors_of(
            r#"
            [[uart]]
            tx_pin = "GPIO1"
            rx_pin = "GPIO2"
            baud_rate = 9600
            "#,
        );
        assert!(errors.has_error_at("uart[0].tx_pin"));
        assert!(errors.has_error_at("uart[0].rx_pin"));
    }

    #[test]
    fn test_peripheral_used_twice() {
        let errors = errors_of(
            r#"
            [[uart]]
            tx_pin = "GPIO0"
            rx_pin = "GPIO1"
            baud_rate = 9600

            [[uart]]
            tx_pin = "GPIO16"
            rx_pin = "GPIO17"
            baud_rate = 9600
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors.has_error_at("uart[1]"));
    }

    #[test]
    fn test_reserved_and_case_insensitive_ids() {
        let errors = errors_of(
            r#"
            [[uart]]
            id = "app"
            tx_pin = 0
            rx_pin = 1
            baud_rate = 9600

            [[uart]]
            id = "Bus"
            tx_pin = 4
            rx_pin = 5
            baud_rate = 9600

            [[sfd_vosloh]]
            id = "bus"
            uart_id = "Bus"
            "#,
        );
        assert!(errors.has_error_at("uart[0].id"));
        assert!(errors.has_error_at("sfd_vosloh[0].id"));
    }

    #[test]
    fn test_section_must_be_a_table() {
        let errors = errors_of("uart = 3");
        assert!(errors.has_error_at("uart"));
    }
}
