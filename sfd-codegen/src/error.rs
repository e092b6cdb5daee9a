//! Configuration errors

use std::fmt;
use std::path::PathBuf;

use sfd_core::config::{ComponentIdError, UartId};
use sfd_hal::uart::UartConfigError;

/// Errors from loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration:\n{0}")]
    Invalid(#[from] ValidationErrors),
}

/// A single problem found while validating a configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown key")]
    UnknownKey,

    #[error("required key missing")]
    MissingKey,

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} out of range [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("invalid id: {0}")]
    InvalidId(ComponentIdError),

    #[error("setup priority {0} does not fit a 32-bit float")]
    PriorityOutOfRange(f64),

    #[error("invalid pin {0:?}, expected GPIO0 to GPIO29")]
    InvalidPin(String),

    #[error("expected one of {allowed:?}, found {found:?}")]
    NotOneOf {
        allowed: &'static [&'static str],
        found: String,
    },

    #[error("unknown component section")]
    UnknownSection,

    #[error("component {component} requires component {requires}")]
    MissingDependency {
        component: &'static str,
        requires: &'static str,
    },

    #[error("id {0} is used more than once")]
    DuplicateId(String),

    #[error("id {0} is reserved")]
    ReservedId(String),

    #[error("no uart bus with id {0}")]
    UnknownUart(String),

    #[error("no uart bus is declared")]
    NoUart,

    #[error("several uart buses are declared, set uart_id")]
    AmbiguousUart,

    #[error("GPIO{0} cannot be used as a UART TX pin")]
    NotTxPin(u8),

    #[error("GPIO{0} cannot be used as a UART RX pin")]
    NotRxPin(u8),

    #[error("tx pin GPIO{tx} and rx pin GPIO{rx} belong to different UARTs")]
    PinMismatch { tx: u8, rx: u8 },

    #[error("{} already backs another bus", .0.peripheral_name())]
    PeripheralInUse(UartId),

    #[error("uart bus {0} already drives another display")]
    BusShared(String),

    #[error("invalid uart settings: {0:?}")]
    InvalidUart(UartConfigError),

    #[error("{0}")]
    Malformed(String),
}

/// A [`SchemaError`] and where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Location such as `sfd_vosloh[0].line_length`
    pub path: String,
    pub error: SchemaError,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

/// Every problem found in one validation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem at `path`
    pub fn push(&mut self, path: impl Into<String>, error: SchemaError) {
        self.0.push(ValidationError {
            path: path.into(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Check if any problem was recorded at `path`
    pub fn has_error_at(&self, path: &str) -> bool {
        self.0.iter().any(|e| e.path == path)
    }

    /// `Ok(value)` if nothing was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}", e)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
