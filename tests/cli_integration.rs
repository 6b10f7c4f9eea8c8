//! End-to-end tests for the `scte35` binary.

use assert_cmd::Command;
use predicates::prelude::*;

const INSERT_SAMPLE: &str = "/DAvAAAAAAAA///wFAVIAACPf+/+c2nALv4AUsz1AAAAAAAKAAhDVUVJAAABNWLbowo=";
const HEARTBEAT: &str = "/DARAAAAAAAAAP/wAAAAAHpPv/8=";
const BAD_CRC: &str =
    "/DA4AAAAAAAAAP/wFAUABDEAf+//mWEhzP4Azf5gAQAAAAATAhFDVUVJAAAAAX+/AQIwNAEAAKeYO3Q=";

fn scte35() -> Command {
    Command::cargo_bin("scte35").unwrap()
}

#[test]
fn decode_text_output() {
    scte35()
        .args(["decode", INSERT_SAMPLE])
        .assert()
        .success()
        .stdout(predicate::str::contains("splice_info_section() {"))
        .stdout(predicate::str::contains("splice_insert() {"))
        .stdout(predicate::str::contains("avail_descriptor() {"))
        .stdout(predicate::str::contains("provider_avail_id: 309"));
}

#[test]
fn decode_json_output() {
    let output = scte35()
        .args(["decode", "--out", "json", INSERT_SAMPLE])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["spliceCommand"]["type"], 5);
    assert_eq!(json["spliceCommand"]["spliceEventId"], 0x4800_008Fu32);
    assert_eq!(json["spliceDescriptors"][0]["type"], 0);
    assert_eq!(json["tier"], 4095);
}

#[test]
fn decode_xml_output() {
    scte35()
        .args(["decode", "--out", "xml", INSERT_SAMPLE])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<SpliceInfoSection xmlns="http://www.scte.org/schemas/35""#,
        ))
        .stdout(predicate::str::contains("<SpliceInsert"))
        .stdout(predicate::str::contains("<AvailDescriptor"));
}

#[test]
fn decode_accepts_hex_framing() {
    scte35()
        .args(["decode", "0xFC301100000000000000FFF0000000007A4FBFFF"])
        .assert()
        .success()
        .stdout(predicate::str::contains("splice_null() {"));
}

#[test]
fn decode_rejects_invalid_base64() {
    scte35()
        .args(["decode", "/DBaf%^"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported encoding"));
}

#[test]
fn decode_still_prints_on_crc_mismatch() {
    // A CRC fault is reported on stderr but the best-effort structure is
    // printed and the invocation succeeds.
    scte35()
        .args(["decode", BAD_CRC])
        .assert()
        .success()
        .stdout(predicate::str::contains("splice_insert() {"))
        .stderr(predicate::str::contains("invalid CRC_32"));
}

#[test]
fn encode_json_document() {
    scte35()
        .args(["encode", r#"{"spliceCommand": {"type": 0}}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Base64: {HEARTBEAT}")))
        .stdout(predicate::str::contains(
            "Hex: 0xFC301100000000000000FFF0000000007A4FBFFF",
        ));
}

#[test]
fn xml_decode_encode_round_trip() {
    let output = scte35()
        .args(["decode", "--out", "xml", INSERT_SAMPLE])
        .output()
        .unwrap();
    assert!(output.status.success());
    let document = String::from_utf8(output.stdout).unwrap();

    scte35()
        .arg("encode")
        .write_stdin(document)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Base64: {INSERT_SAMPLE}")));
}
