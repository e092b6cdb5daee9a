//! Configuration type definitions
//!
//! Validated value types shared by the configuration loader, the code
//! generator and the drivers. Each type can only hold values that passed
//! validation.

use core::fmt;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum identifier length
pub const MAX_ID_LEN: usize = 32;

/// Number of flap modules per display row
///
/// Always within [`LineLength::MIN`]..=[`LineLength::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct LineLength(u8);

/// Line length out of range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineLengthError {
    /// Value outside 1..=127
    OutOfRange(i64),
}

impl fmt::Display for LineLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineLengthError::OutOfRange(v) => write!(
                f,
                "line length {} out of range [{}, {}]",
                v,
                LineLength::MIN,
                LineLength::MAX
            ),
        }
    }
}

impl LineLength {
    /// Shortest row
    pub const MIN: u8 = 1;
    /// Longest row, equal to the highest module address
    pub const MAX: u8 = 127;
    /// Value used when the configuration does not set one
    pub const DEFAULT: LineLength = LineLength(Self::MAX);

    /// Create a line length, rejecting values outside 1..=127
    pub const fn new(value: u8) -> Result<Self, LineLengthError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(LineLength(value))
        } else {
            Err(LineLengthError::OutOfRange(value as i64))
        }
    }

    /// Create from any integer, as read from a configuration file
    pub fn from_i64(value: i64) -> Result<Self, LineLengthError> {
        u8::try_from(value)
            .ok()
            .and_then(|v| Self::new(v).ok())
            .ok_or(LineLengthError::OutOfRange(value))
    }

    /// The number of modules per row
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for LineLength {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for LineLength {
    type Error = LineLengthError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LineLength> for u8 {
    fn from(value: LineLength) -> Self {
        value.0
    }
}

impl fmt::Display for LineLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rust keywords, which cannot be used as component ids
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Invalid component identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComponentIdError {
    /// Identifier is empty
    Empty,
    /// Identifier longer than [`MAX_ID_LEN`]
    TooLong,
    /// Character not allowed at this position
    InvalidCharacter(char),
    /// Identifier is a reserved word
    Reserved,
}

impl fmt::Display for ComponentIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentIdError::Empty => f.write_str("id must not be empty"),
            ComponentIdError::TooLong => write!(f, "id longer than {} characters", MAX_ID_LEN),
            ComponentIdError::InvalidCharacter(c) => {
                write!(f, "invalid character {:?} in id", c)
            }
            ComponentIdError::Reserved => f.write_str("id is a reserved word"),
        }
    }
}

/// Identifier of a configured component
///
/// Matches `[A-Za-z_][A-Za-z0-9_]*`, since generated code uses it as a
/// binding name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "String<MAX_ID_LEN>", into = "String<MAX_ID_LEN>")
)]
pub struct ComponentId(String<MAX_ID_LEN>);

impl ComponentId {
    /// Validate and create an identifier
    pub fn new(id: &str) -> Result<Self, ComponentIdError> {
        let mut chars = id.chars();
        let first = chars.next().ok_or(ComponentIdError::Empty)?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(ComponentIdError::InvalidCharacter(first));
        }
        if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(ComponentIdError::InvalidCharacter(c));
        }
        if id == "_" || KEYWORDS.contains(&id) {
            return Err(ComponentIdError::Reserved);
        }
        let inner = String::try_from(id).map_err(|_| ComponentIdError::TooLong)?;
        Ok(ComponentId(inner))
    }

    /// The identifier text
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String<MAX_ID_LEN>> for ComponentId {
    type Error = ComponentIdError;

    fn try_from(value: String<MAX_ID_LEN>) -> Result<Self, Self::Error> {
        Self::new(value.as_str())
    }
}

impl From<ComponentId> for String<MAX_ID_LEN> {
    fn from(value: ComponentId) -> Self {
        value.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which components are set up
///
/// Higher values are set up first.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SetupPriority(pub f32);

impl SetupPriority {
    /// Communication buses
    pub const BUS: SetupPriority = SetupPriority(1000.0);
    /// Port expanders and other IO
    pub const IO: SetupPriority = SetupPriority(900.0);
    /// Hardware drivers
    pub const HARDWARE: SetupPriority = SetupPriority(800.0);
    /// Data producers (default for components)
    pub const DATA: SetupPriority = SetupPriority(600.0);
    /// Data consumers
    pub const PROCESSOR: SetupPriority = SetupPriority(400.0);
    /// Components that need a network connection
    pub const AFTER_CONNECTION: SetupPriority = SetupPriority(100.0);
    /// Everything else
    pub const LATE: SetupPriority = SetupPriority(-100.0);

    /// Raw priority value
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for SetupPriority {
    fn default() -> Self {
        Self::DATA
    }
}

impl fmt::Display for SetupPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_line_length_default() {
        assert_eq!(LineLength::default().get(), 127);
        assert_eq!(LineLength::DEFAULT, LineLength::new(127).unwrap());
    }

    #[test]
    fn test_line_length_bounds() {
        assert!(LineLength::new(1).is_ok());
        assert!(LineLength::new(127).is_ok());
        assert_eq!(LineLength::new(0), Err(LineLengthError::OutOfRange(0)));
        assert_eq!(LineLength::new(128), Err(LineLengthError::OutOfRange(128)));
        assert_eq!(LineLength::from_i64(-5), Err(LineLengthError::OutOfRange(-5)));
        assert_eq!(LineLength::from_i64(1000), Err(LineLengthError::OutOfRange(1000)));
    }

    #[test]
    fn test_component_id_validation() {
        assert!(ComponentId::new("platform_sign").is_ok());
        assert!(ComponentId::new("_hidden2").is_ok());
        assert_eq!(ComponentId::new(""), Err(ComponentIdError::Empty));
        assert_eq!(
            ComponentId::new("2fast"),
            Err(ComponentIdError::InvalidCharacter('2'))
        );
        assert_eq!(
            ComponentId::new("front-sign"),
            Err(ComponentIdError::InvalidCharacter('-'))
        );
        assert_eq!(ComponentId::new("loop"), Err(ComponentIdError::Reserved));
        assert_eq!(ComponentId::new("_"), Err(ComponentIdError::Reserved));

        let long = "a".repeat(MAX_ID_LEN + 1);
        assert_eq!(ComponentId::new(&long), Err(ComponentIdError::TooLong));
    }

    #[test]
    fn test_setup_priority_order() {
        assert!(SetupPriority::BUS > SetupPriority::DATA);
        assert!(SetupPriority::DATA > SetupPriority::LATE);
        assert_eq!(SetupPriority::default(), SetupPriority::DATA);
    }

    proptest! {
        #[test]
        fn prop_line_length_accepts_range(n in 1u8..=127) {
            prop_assert_eq!(LineLength::new(n).map(LineLength::get), Ok(n));
        }

        #[test]
        fn prop_line_length_rejects_outside(n in prop_oneof![i64::MIN..1i64, 128i64..i64::MAX]) {
            prop_assert_eq!(LineLength::from_i64(n), Err(LineLengthError::OutOfRange(n)));
        }

        #[test]
        fn prop_identifiers_accepted(id in "[a-z][a-z0-9_]{0,20}_[0-9]") {
            prop_assert_eq!(ComponentId::new(&id).map(|c| c.as_str().len()), Ok(id.len()));
        }
    }
}
