//! Build script for sfd-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates display.toml and generates the component wiring

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sfd_codegen::ConfigError;

fn main() {
    setup_linker();
    generate_components();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = out_dir();

    // Copy memory.x to the output directory
    if let Err(e) = fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")) {
        panic!("failed to copy memory.x: {}", e);
    }

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Turn display.toml into `$OUT_DIR/components.rs`
fn generate_components() {
    println!("cargo:rerun-if-changed=display.toml");

    let config_path = Path::new("display.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: display.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a display.toml configuration file.        ║\n\
            ║  Please create one in the sfd-firmware directory.                ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config = match sfd_codegen::load_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            let title = match &e {
                ConfigError::Io { .. } | ConfigError::Write { .. } => "Failed to read display.toml",
                ConfigError::Toml(_) => "Invalid TOML syntax in display.toml",
                ConfigError::Invalid(_) => "Invalid configuration in display.toml",
            };
            let detail = match &e {
                ConfigError::Invalid(errors) => errors.to_string(),
                other => other.to_string(),
            };
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: {:<56} ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                title,
                format_error_lines(&detail)
            );
        }
    };

    let statements = sfd_codegen::emit(&config);
    let source = sfd_codegen::render_rust(&statements);
    let target = out_dir().join("components.rs");
    if let Err(e) = fs::write(&target, source) {
        panic!("failed to write {}: {}", target.display(), e);
    }

    println!(
        "cargo:warning=display.toml validated successfully ({} uart bus(es), {} display(s))",
        config.uarts().len(),
        config.displays().len()
    );
}

fn out_dir() -> PathBuf {
    match env::var_os("OUT_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => panic!("OUT_DIR is not set"),
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let line = line.trim_start();
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
