#![cfg(feature = "cli")]

use std::process::{Command, Output};

use jausprims_frame::catalog::{self, velocity_bits};
use jausprims_frame::{Address, Message};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jausprims"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("jausprims should run")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn velocity_report() -> Message {
    let mut msg = Message::new(&catalog::REPORT_VELOCITY_STATE).unwrap();
    msg.set_source(Address::new(1, 1, 42, 1));
    msg.set_destination(Address::new(1, 2, 33, 1));
    msg.set_presence_bit(velocity_bits::VELOCITY_X).unwrap();
    msg.set_presence_bit(velocity_bits::YAW_RATE).unwrap();
    msg.set_real(1, 2.0).unwrap();
    msg.set_real(7, -0.25).unwrap();
    msg
}

#[test]
fn decode_native_report() {
    let msg = velocity_report();
    let mut buf = vec![0u8; msg.size()];
    msg.encode_native(&mut buf, 0).unwrap();

    let output = run(&["decode", &hex::encode(&buf)]);
    assert!(output.status.success(), "{output:?}");

    let out = json(&output);
    assert_eq!(out["framing"], "native");
    assert_eq!(out["layout"], "ReportVelocityState");
    assert_eq!(out["header"]["command_code"], "0x4404");
    assert_eq!(out["header"]["source"], "1.1.42.1");
    assert_eq!(out["header"]["data_size"], 8);

    let fields = out["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 10);
    assert_eq!(fields[1]["name"], "velocity_x");
    assert_eq!(fields[1]["present"], true);
    assert_eq!(fields[2]["present"], false);
    let vx = fields[1]["real"].as_f64().unwrap();
    assert!((vx - 2.0).abs() < 1e-6);
}

#[test]
fn decode_udp_with_offset() {
    let msg = Message::new(&catalog::QUERY_COMPONENT_STATUS).unwrap();
    let mut buf = vec![0u8; msg.udp_size() + 2];
    msg.encode_udp(&mut buf, 2).unwrap();

    let output = run(&["decode", "--udp", "--offset", "2", &hex::encode(&buf)]);
    assert!(output.status.success(), "{output:?}");
    let out = json(&output);
    assert_eq!(out["framing"], "udp");
    assert_eq!(out["layout"], "QueryComponentStatus");
}

#[test]
fn decode_truncated_is_data_invalid() {
    let msg = velocity_report();
    let mut buf = vec![0u8; msg.size()];
    msg.encode_native(&mut buf, 0).unwrap();
    buf.truncate(buf.len() - 1);

    let output = run(&["decode", &hex::encode(&buf)]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("too short"), "{stderr}");
}

#[test]
fn decode_unknown_code_keeps_payload() {
    let raw = jausprims_frame::RawMessage::new(jausprims_frame::Header::new(0x7F00), vec![0xAB, 0xCD])
        .unwrap();
    let mut buf = vec![0u8; raw.size()];
    raw.encode_native(&mut buf, 0).unwrap();

    let output = run(&["decode", &hex::encode(&buf)]);
    assert!(output.status.success(), "{output:?}");
    let out = json(&output);
    assert!(out["layout"].is_null());
    assert_eq!(out["payload"], "ABCD");
    assert_eq!(out["header"]["command_name"], "UNKNOWN_INFORM");
}

#[test]
fn decode_rejects_bad_hex() {
    let output = run(&["decode", "xyz"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn scale_real_to_raw() {
    let output = run(&["scale", "ushort", "--min", "0", "--max", "1092", "--real", "546"]);
    assert!(output.status.success(), "{output:?}");
    let out = json(&output);
    assert_eq!(out["raw"], 32768);
    assert_eq!(out["hex"], "8000");
    assert_eq!(out["clamped"], false);
}

#[test]
fn scale_reports_clamping() {
    let output = run(&["scale", "short", "--min", "-1", "--max", "1", "--real", "-5"]);
    assert!(output.status.success(), "{output:?}");
    let out = json(&output);
    assert_eq!(out["raw"], -32767);
    assert_eq!(out["clamped"], true);
}

#[test]
fn scale_raw_out_of_width_is_usage() {
    let output = run(&["scale", "byte", "--min", "0", "--max", "1", "--raw", "256"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn layouts_lists_catalog() {
    let output = run(&["layouts"]);
    assert!(output.status.success());
    let out = json(&output);
    let names: Vec<&str> = out
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), catalog::ALL.len());
    assert!(names.contains(&"ConfirmServiceConnection"));

    let output = run(&["layouts", "0x4404"]);
    let out = json(&output);
    assert_eq!(out["fields"][9]["name"], "time_stamp");
    assert_eq!(out["fields"][9]["presence_bit"], 8);

    let output = run(&["layouts", "missing"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = run(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("jausprims {}", env!("CARGO_PKG_VERSION")));
}
