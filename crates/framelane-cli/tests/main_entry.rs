//! Integration tests for the `framelane` binary entry point.

use assert_cmd::cargo::cargo_bin_cmd;
use framelane_protocol::{HEADER_LEN, encode_response};
use predicates::prelude::*;

#[test]
fn generate_emits_header_and_payload() {
    let output = cargo_bin_cmd!("framelane")
        .args(["generate", "--size", "96", "--frame-size", "32", "--seed", "5"])
        .output()
        .expect("run framelane");
    assert!(output.status.success());
    assert_eq!(output.stdout.len(), HEADER_LEN + 96);
    assert_eq!(output.stdout.get(..4), Some(&[0xDE, 0xAD, 0xBE, 0xEF][..]));
}

#[test]
fn read_prints_decoded_values() {
    let response = encode_response(&[1, 22, 333]).expect("encode");
    cargo_bin_cmd!("framelane")
        .arg("read")
        .write_stdin(response)
        .assert()
        .success()
        .stdout("1 22 333\n");
}

#[test]
fn read_fails_on_truncated_input() {
    cargo_bin_cmd!("framelane")
        .arg("read")
        .write_stdin(vec![0xDE, 0xAD])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid response"));
}

#[test]
fn send_reports_unreachable_server() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("spare port")
        .port();
    cargo_bin_cmd!("framelane")
        .args(["send", "--port", &port.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to connect"));
}
