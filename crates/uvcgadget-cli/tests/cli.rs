// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Integration tests for the uvc-gadget CLI
//!
//! Everything here stops before the gadget is started: argument errors and
//! --dry-run never load libuvcgadget, so no hardware is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::env;

/// Helper to create a Command for the uvc-gadget binary
/// Uses UVC_GADGET_BIN environment variable if set, otherwise the cargo-built binary
fn uvc_gadget_cmd() -> Command {
    let mut cmd = match env::var("UVC_GADGET_BIN") {
        Ok(bin_path) => Command::new(bin_path),
        Err(_) => Command::cargo_bin("uvc-gadget").unwrap(),
    };
    cmd.env_remove("RUST_LOG");
    cmd
}

fn dry_run_json(args: &[&str]) -> serde_json::Value {
    let output = uvc_gadget_cmd()
        .args(args)
        .args(["--dry-run", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help() {
    uvc_gadget_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--colour-gains"))
        .stdout(predicate::str::contains("--slideshow"))
        .stdout(predicate::str::contains("g1/functions/uvc.1"))
        .stdout(predicate::str::contains("musb-hdrc.0.auto"))
        .stdout(predicate::str::contains("colour gains every second"));
}

#[test]
fn test_version() {
    uvc_gadget_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("uvc-gadget"));
}

#[test]
fn test_unknown_option_exits_1() {
    uvc_gadget_cmd().arg("--frobnicate").assert().code(1);
}

#[test]
fn test_invalid_awb() {
    uvc_gadget_cmd()
        .args(["-c", "0", "--awb", "sunny"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid --awb value: sunny"))
        .stderr(predicate::str::contains("daylight"))
        .stderr(predicate::str::contains("Usage:"))
        .stderr(predicate::str::contains("g1/functions/uvc.1"))
        .stderr(predicate::str::contains("Sources:"));
}

#[test]
fn test_mode_matching_is_case_sensitive() {
    uvc_gadget_cmd()
        .args(["-c", "0", "--exposure", "Normal"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid --exposure value: Normal"));
}

#[test]
fn test_colour_gains_out_of_range() {
    uvc_gadget_cmd()
        .args(["-c", "0", "--colour-gains", "33.0,1.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("colour-gains"))
        .stderr(predicate::str::contains("[0.0, 32.0]"));
}

#[test]
fn test_colour_gains_single_value() {
    uvc_gadget_cmd()
        .args(["-c", "0", "--awbgains", "1.5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid format"));
}

#[test]
fn test_non_finite_rejected() {
    uvc_gadget_cmd()
        .args(["-c", "0", "--contrast", "nan"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid --contrast value"));
}

#[test]
fn test_device_and_image_conflict() {
    uvc_gadget_cmd()
        .args(["-d", "/dev/video0", "-i", "test.jpg", "--dry-run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Both capture device and still image specified",
        ));
}

#[test]
fn test_controls_require_camera() {
    uvc_gadget_cmd()
        .args(["--awb", "daylight"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--camera"));
}

#[test]
fn test_dry_run_default_source() {
    uvc_gadget_cmd()
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Source: test pattern"))
        .stdout(predicate::str::contains("Controls: automatic"));
}

#[test]
fn test_dry_run_priority() {
    uvc_gadget_cmd()
        .args(["-c", "0", "-s", "/srv/slides", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Source: libcamera (0)"));
}

#[test]
fn test_dry_run_negative_brightness() {
    uvc_gadget_cmd()
        .args(["-c", "0", "--brightness", "-0.5", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Brightness = -0.5"));
}

#[test]
fn test_dry_run_json_default() {
    let report = dry_run_json(&[]);
    assert_eq!(report["backend"]["kind"], "synthetic-pattern");
    assert_eq!(report["requests"].as_array().unwrap().len(), 0);
}

#[test]
fn test_dry_run_json_colour_gains() {
    let report = dry_run_json(&["uvc.0", "-c", "0", "--colour-gains", "1.0,2.0"]);

    assert_eq!(report["backend"]["kind"], "camera-pipeline");
    assert_eq!(report["backend"]["locator"], "0");
    assert_eq!(report["controls"]["colour_gains"]["red"], 1.0);
    assert_eq!(report["controls"]["colour_gains"]["blue"], 2.0);

    let requests = report["requests"].as_array().unwrap();
    assert_eq!(requests[0]["control"], "AwbEnable");
    assert_eq!(requests[0]["value"], false);
    assert_eq!(requests[1]["control"], "ColourGains");
}

#[test]
fn test_dry_run_json_sport_exposure() {
    let report = dry_run_json(&["-c", "0", "--exposure", "sport"]);

    assert_eq!(report["controls"]["exposure_mode"], "sport");
    assert_eq!(report["requests"][0]["control"], "AeExposureMode");
    assert_eq!(report["requests"][0]["value"], "short");
}

#[test]
fn test_json_requires_dry_run() {
    uvc_gadget_cmd().arg("--json").assert().code(1);
}
