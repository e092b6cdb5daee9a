//! Composable configuration schemas
//!
//! A [`Schema`] is a list of [`Key`]s. Components build their schema by
//! extending the shared ones (component, UART device) with their own keys.
//! Validation returns a normalized table: defaults filled in, pins turned
//! into GPIO numbers, floats widened.

use sfd_core::config::ComponentId;
use toml::{Table, Value};

use crate::error::{SchemaError, ValidationErrors};

/// Highest GPIO number on the RP2040
pub const MAX_GPIO: i64 = 29;

/// How a value is checked
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// Integer within `min..=max`
    IntRange { min: i64, max: i64 },
    /// Finite number, integers accepted
    Float,
    /// Finite number that also fits an `f32`
    Priority,
    /// New component id
    Identifier,
    /// Id of another component
    IdReference,
    /// `"GPIOn"` or a bare GPIO number
    Pin,
    /// One of the listed strings
    OneOf(&'static [&'static str]),
}

impl Validator {
    /// Check `value`, returning its normalized form
    pub fn check(&self, value: &Value) -> Result<Value, SchemaError> {
        match *self {
            Validator::IntRange { min, max } => {
                let v = value.as_integer().ok_or_else(|| wrong_type("integer", value))?;
                if v < min || v > max {
                    return Err(SchemaError::OutOfRange { value: v, min, max });
                }
                Ok(Value::Integer(v))
            }
            Validator::Float => finite(value).map(Value::Float),
            Validator::Priority => {
                let v = finite(value)?;
                if v.abs() > f64::from(f32::MAX) {
                    return Err(SchemaError::PriorityOutOfRange(v));
                }
                Ok(Value::Float(v))
            }
            Validator::Identifier | Validator::IdReference => {
                let s = value.as_str().ok_or_else(|| wrong_type("string", value))?;
                ComponentId::new(s).map_err(SchemaError::InvalidId)?;
                Ok(value.clone())
            }
            Validator::Pin => parse_pin(value).map(Value::Integer),
            Validator::OneOf(allowed) => {
                let s = value.as_str().ok_or_else(|| wrong_type("string", value))?;
                let lower = s.to_ascii_lowercase();
                if allowed.contains(&lower.as_str()) {
                    Ok(Value::String(lower))
                } else {
                    Err(SchemaError::NotOneOf {
                        allowed,
                        found: s.to_string(),
                    })
                }
            }
        }
    }
}

fn wrong_type(expected: &'static str, found: &Value) -> SchemaError {
    SchemaError::WrongType {
        expected,
        found: found.type_str(),
    }
}

fn finite(value: &Value) -> Result<f64, SchemaError> {
    let v = match value {
        Value::Float(f) => *f,
        Value::Integer(i) => *i as f64,
        other => return Err(wrong_type("number", other)),
    };
    if !v.is_finite() {
        return Err(SchemaError::Malformed(format!("{} is not a finite number", v)));
    }
    Ok(v)
}

fn parse_pin(value: &Value) -> Result<i64, SchemaError> {
    let number = match value {
        Value::Integer(i) => Some(*i),
        Value::String(s) => {
            let lower = s.to_ascii_lowercase();
            lower
                .strip_prefix("gpio")
                .and_then(|n| n.parse::<i64>().ok())
        }
        other => return Err(wrong_type("pin", other)),
    };

    match number {
        Some(n) if (0..=MAX_GPIO).contains(&n) => Ok(n),
        _ => Err(SchemaError::InvalidPin(value.to_string())),
    }
}

/// Whether a key must be present
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    /// Filled in with this value when absent
    Default(Value),
}

/// A named configuration key
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub name: &'static str,
    pub presence: Presence,
    pub validator: Validator,
}

impl Key {
    pub fn required(name: &'static str, validator: Validator) -> Self {
        Self {
            name,
            presence: Presence::Required,
            validator,
        }
    }

    pub fn optional(name: &'static str, validator: Validator) -> Self {
        Self {
            name,
            presence: Presence::Optional,
            validator,
        }
    }

    pub fn with_default(name: &'static str, validator: Validator, default: impl Into<Value>) -> Self {
        Self {
            name,
            presence: Presence::Default(default.into()),
            validator,
        }
    }
}

/// Set of keys accepted by a configuration table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    keys: Vec<Key>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key
    pub fn key(mut self, key: Key) -> Self {
        debug_assert!(
            self.get(key.name).is_none(),
            "key {} declared twice",
            key.name
        );
        self.keys.push(key);
        self
    }

    /// Add every key of `other`
    pub fn extend(self, other: Schema) -> Self {
        other.keys.into_iter().fold(self, Schema::key)
    }

    pub fn get(&self, name: &str) -> Option<&Key> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Validate `table`, recording problems under `path`
    ///
    /// Keys that fail validation are left out of the returned table.
    pub fn validate(&self, table: &Table, path: &str, errors: &mut ValidationErrors) -> Table {
        for name in table.keys() {
            if self.get(name).is_none() {
                errors.push(format!("{}.{}", path, name), SchemaError::UnknownKey);
            }
        }

        let mut normalized = Table::new();
        for key in &self.keys {
            let key_path = format!("{}.{}", path, key.name);
            match (table.get(key.name), &key.presence) {
                (Some(value), _) => match key.validator.check(value) {
                    Ok(v) => {
                        normalized.insert(key.name.to_string(), v);
                    }
                    Err(e) => errors.push(key_path, e),
                },
                (None, Presence::Required) => errors.push(key_path, SchemaError::MissingKey),
                (None, Presence::Optional) => {}
                (None, Presence::Default(default)) => {
                    normalized.insert(key.name.to_string(), default.clone());
                }
            }
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> Table {
        toml::from_str::<Table>(src).unwrap()
    }

    fn schema() -> Schema {
        Schema::new()
            .key(Key::required("pin", Validator::Pin))
            .key(Key::with_default("count", Validator::IntRange { min: 1, max: 10 }, 3))
            .key(Key::optional("weight", Validator::Float))
    }

    #[test]
    fn test_int_range() {
        let v = Validator::IntRange { min: 1, max: 127 };
        assert_eq!(v.check(&Value::Integer(1)), Ok(Value::Integer(1)));
        assert_eq!(v.check(&Value::Integer(127)), Ok(Value::Integer(127)));
        assert_eq!(
            v.check(&Value::Integer(0)),
            Err(SchemaError::OutOfRange {
                value: 0,
                min: 1,
                max: 127
            })
        );
        assert_eq!(
            v.check(&Value::String("12".into())),
            Err(SchemaError::WrongType {
                expected: "integer",
                found: "string"
            })
        );
        assert!(v.check(&Value::Float(12.0)).is_err());
    }

    #[test]
    fn test_pins() {
        assert_eq!(Validator::Pin.check(&Value::String("GPIO4".into())), Ok(Value::Integer(4)));
        assert_eq!(Validator::Pin.check(&Value::String("gpio29".into())), Ok(Value::Integer(29)));
        assert_eq!(Validator::Pin.check(&Value::Integer(0)), Ok(Value::Integer(0)));
        assert!(matches!(
            Validator::Pin.check(&Value::String("GPIO30".into())),
            Err(SchemaError::InvalidPin(_))
        ));
        assert!(matches!(
            Validator::Pin.check(&Value::String("D4".into())),
            Err(SchemaError::InvalidPin(_))
        ));
    }

    #[test]
    fn test_one_of_and_ids() {
        let v = Validator::OneOf(&["none", "even", "odd"]);
        assert_eq!(v.check(&Value::String("Even".into())), Ok(Value::String("even".into())));
        assert!(matches!(
            v.check(&Value::String("mark".into())),
            Err(SchemaError::NotOneOf { .. })
        ));

        assert!(Validator::Identifier.check(&Value::String("sign_1".into())).is_ok());
        assert!(matches!(
            Validator::Identifier.check(&Value::String("1sign".into())),
            Err(SchemaError::InvalidId(_))
        ));
    }

    #[test]
    fn test_float_widens_integers() {
        assert_eq!(Validator::Float.check(&Value::Integer(600)), Ok(Value::Float(600.0)));
        assert!(Validator::Float.check(&Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_priority_fits_f32() {
        assert_eq!(Validator::Priority.check(&Value::Integer(-100)), Ok(Value::Float(-100.0)));
        assert_eq!(
            Validator::Priority.check(&Value::Float(1e38)),
            Ok(Value::Float(1e38))
        );
        assert_eq!(
            Validator::Priority.check(&Value::Float(1e39)),
            Err(SchemaError::PriorityOutOfRange(1e39))
        );
        assert_eq!(
            Validator::Priority.check(&Value::Float(-1e39)),
            Err(SchemaError::PriorityOutOfRange(-1e39))
        );
        assert!(Validator::Priority.check(&Value::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_validate_fills_defaults() {
        let mut errors = ValidationErrors::new();
        let out = schema().validate(&table("pin = \"GPIO8\""), "x", &mut errors);

        assert!(errors.is_empty());
        assert_eq!(out.get("pin"), Some(&Value::Integer(8)));
        assert_eq!(out.get("count"), Some(&Value::Integer(3)));
        assert_eq!(out.get("weight"), None);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut errors = ValidationErrors::new();
        let out = schema().validate(&table("count = 11\ncolour = \"red\""), "x[2]", &mut errors);

        assert_eq!(errors.len(), 3);
        assert!(errors.has_error_at("x[2].colour"));
        assert!(errors.has_error_at("x[2].pin"));
        assert!(errors.has_error_at("x[2].count"));
        assert!(out.get("count").is_none());
    }

    #[test]
    fn test_extend() {
        let base = Schema::new().key(Key::optional("a", Validator::Float));
        let extended = base.extend(Schema::new().key(Key::optional("b", Validator::Float)));
        let names: Vec<&str> = extended.keys().map(|k| k.name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "declared twice")]
    fn test_extend_duplicate_key() {
        let a = Schema::new().key(Key::optional("a", Validator::Float));
        let _ = a.clone().extend(a);
    }
}
