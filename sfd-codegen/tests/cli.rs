//! The `sfd-codegen` binary end to end

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

const CONFIG: &str = r#"
[[uart]]
id = "bus"
tx_pin = "GPIO4"
rx_pin = "GPIO5"
baud_rate = 19200

[sfd_vosloh]
id = "sign"
line_length = 16
"#;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn sfd_codegen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sfd-codegen"))
}

#[test]
fn test_check() {
    let file = config_file(CONFIG);
    let output = sfd_codegen().arg("check").arg(file.path()).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("ok (1 uart bus(es), 1 display(s))"));
}

#[test]
fn test_check_reports_errors() {
    let file = config_file("[sfd_vosloh]\nline_length = 0\n");
    let output = sfd_codegen().arg("check").arg(file.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("requires component uart"));
    assert!(stderr.contains("sfd_vosloh.line_length"));
}

#[test]
fn test_plan() {
    let file = config_file(CONFIG);
    let output = sfd_codegen().arg("plan").arg(file.path()).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "declare uart bus bus on UART1 (tx GPIO4, rx GPIO5, 19200 baud 8N1)",
            "instantiate sfd_vosloh sign on UART1",
            "register component sign",
            "register uart device sign on bus",
            "set line length of sign to 16",
        ]
    );
}

#[test]
fn test_generate_to_file() {
    let file = config_file(CONFIG);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("components.rs");

    let status = sfd_codegen()
        .arg("generate")
        .arg(file.path())
        .arg("-o")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let source = std::fs::read_to_string(&out).unwrap();
    assert_eq!(source, sfd_codegen::generate(CONFIG).unwrap());
    assert!(source.contains("sfd_core::app::register_uart_device(sign, bus)?;"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = sfd_codegen()
        .arg("check")
        .arg(dir.path().join("absent.toml"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}
