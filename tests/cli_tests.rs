// Command-line behavior of the umtty binary

mod common;

use common::{halt, input, ortho, out};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use umtty::loader::bytes_from_words;

fn umtty() -> Command {
    Command::new(env!("CARGO_BIN_EXE_umtty"))
}

/// Write `bytes` to a scratch file named after the calling test
fn image(name: &str, bytes: &[u8]) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(format!("{}.um", name));
    std::fs::write(&path, bytes).unwrap();
    path
}

fn run_with_stdin(path: &PathBuf, stdin: &[u8]) -> Output {
    let mut child = umtty()
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_no_arguments_prints_usage() {
    let output = umtty().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No program file provided"));
    assert!(stderr.contains("Usage:"));
}

#[test]
fn test_two_programs_rejected() {
    let path = image("two_programs", &bytes_from_words(&[halt()]));
    let output = umtty().arg(&path).arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Expected exactly one program file"));
}

#[test]
fn test_missing_file() {
    let output = umtty().arg("/nonexistent/program.um").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_misaligned_image() {
    let path = image("misaligned", &[0, 0, 0]);
    let output = umtty().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Load error"));
    assert!(stderr.contains("3 bytes"));
}

#[test]
fn test_halt_exits_successfully() {
    let path = image("hello", &bytes_from_words(&[ortho(0, u32::from(b'H')), out(0), halt()]));
    let output = umtty().arg(&path).stdin(Stdio::null()).output().unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, b"H");
}

#[test]
fn test_fault_exits_with_dump() {
    let path = image("fault", &bytes_from_words(&[0xF000_0000]));
    let output = umtty().arg(&path).stdin(Stdio::null()).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MACHINE STATE"));
    assert!(stderr.contains("Invalid opcode 15"));
}

#[test]
fn test_empty_stdin_is_end_of_input() {
    // The low byte of 0xFFFFFFFF reaches stdout
    let path = image("eof", &bytes_from_words(&[input(0), out(0), halt()]));
    let output = umtty().arg(&path).stdin(Stdio::null()).output().unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, vec![0xFF]);
}

#[test]
fn test_stdin_line_is_delivered() {
    let program = [input(0), out(0), input(0), out(0), halt()];
    let path = image("echo_two", &bytes_from_words(&program));
    let output = run_with_stdin(&path, b"ok\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"ok");
}
