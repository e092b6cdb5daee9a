//! Configuration validation and wiring code generation
//!
//! Reads a `display.toml` describing UART buses and split-flap displays,
//! validates it and produces the statements that bring the components up:
//!
//! ```text
//! display.toml ──► loader ──► Configuration ──► emit ──► [Statement] ──► render ──► components.rs
//! ```
//!
//! The firmware build script runs this at compile time; the `sfd-codegen`
//! binary exposes the same steps for checking a configuration by hand.

pub mod components;
pub mod emit;
pub mod error;
pub mod loader;
pub mod render;
pub mod schema;

pub use emit::{emit, Statement};
pub use error::{ConfigError, SchemaError, ValidationError, ValidationErrors};
pub use loader::{load_file, load_str, validate_document, Configuration};
pub use render::render_rust;

/// Validate `source` and render the wiring module
pub fn generate(source: &str) -> Result<String, ConfigError> {
    let config = load_str(source)?;
    Ok(render_rust(&emit(&config)))
}
