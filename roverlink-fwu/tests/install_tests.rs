// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Tests for startup-time state reconciliation.

use std::ffi::OsString;
use std::fs;
use std::time::Duration;

use roverlink_fwu::persist::{write_record, InitialResult};
use roverlink_fwu::{FirmwareBackend, FwUpdate, TxParams};

fn startup_args() -> Vec<OsString> {
    vec![OsString::from("roverlink-client")]
}

#[test]
fn test_first_boot_reports_success() {
    let dir = tempfile::tempdir().unwrap();

    let (session, state) =
        FwUpdate::install(dir.path().join("fw-marker"), None, None, &startup_args());

    // Missing marker means the previous install committed.
    assert_eq!(state.result, InitialResult::Success);
    assert_eq!(state.resume_offset, 0);
    assert_eq!(state.persisted_uri, None);
    assert!(!session.is_stream_open());
}

#[test]
fn test_partial_download_resumes_at_file_length() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fw-marker");
    let partial = dir.path().join("fw-partial");
    fs::write(&partial, b"first 17 bytes...").unwrap();

    write_record(
        &marker,
        InitialResult::Downloading,
        Some("coaps://server/fw"),
        partial.to_str(),
        false,
        Some(b"etag-1"),
    )
    .unwrap();

    let (mut session, state) = FwUpdate::install(&marker, None, None, &startup_args());

    assert_eq!(state.result, InitialResult::Downloading);
    assert_eq!(state.resume_offset, 17);
    assert_eq!(state.persisted_uri.as_deref(), Some("coaps://server/fw"));
    assert_eq!(state.resume_etag.as_deref(), Some(b"etag-1".as_slice()));
    // The marker was consumed; bookkeeping is in-session from here on.
    assert!(!marker.exists());

    // The reopened stream appends past the partial content.
    assert!(session.is_stream_open());
    session.write(b" and more").unwrap();
    assert_eq!(fs::read(&partial).unwrap(), b"first 17 bytes... and more");
}

#[test]
fn test_unopenable_partial_downgrades_to_neutral() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fw-marker");

    write_record(
        &marker,
        InitialResult::Downloading,
        Some("coaps://server/fw"),
        Some("/no/such/path/fw-partial"),
        false,
        None,
    )
    .unwrap();

    let (session, state) = FwUpdate::install(&marker, None, None, &startup_args());

    assert_eq!(state.result, InitialResult::Neutral);
    assert_eq!(state.resume_offset, 0);
    assert!(!session.is_stream_open());
    assert!(!marker.exists());
}

#[test]
fn test_idle_state_deletes_leftover_firmware_file() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fw-marker");
    let leftover = dir.path().join("fw-leftover");
    fs::write(&leftover, b"stale image").unwrap();

    write_record(
        &marker,
        InitialResult::Success,
        None,
        leftover.to_str(),
        false,
        None,
    )
    .unwrap();

    let (session, state) = FwUpdate::install(&marker, None, None, &startup_args());

    assert_eq!(state.result, InitialResult::Success);
    assert!(!leftover.exists());
    assert_eq!(session.target_path(), None);
}

#[test]
fn test_downloaded_state_keeps_firmware_file() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fw-marker");
    let image = dir.path().join("fw-image");
    fs::write(&image, b"installed image").unwrap();

    write_record(
        &marker,
        InitialResult::Downloaded,
        Some("coaps://server/fw"),
        image.to_str(),
        false,
        None,
    )
    .unwrap();

    let (session, state) = FwUpdate::install(&marker, None, None, &startup_args());

    // Downloaded means the package is ready to install; it must survive the
    // restart so perform_upgrade can launch it.
    assert_eq!(state.result, InitialResult::Downloaded);
    assert!(image.exists());
    assert_eq!(session.target_path(), Some(image.as_path()));
}

#[test]
fn test_configured_transfer_parameters_are_exposed() {
    let dir = tempfile::tempdir().unwrap();
    let params = TxParams {
        ack_timeout: Duration::from_secs(2),
        ack_random_factor: 1.5,
        max_retransmit: 4,
        nstart: 1,
    };

    let (session, _) =
        FwUpdate::install(dir.path().join("fw-marker"), None, Some(params), &startup_args());

    let got = session.tx_params("coaps://server/fw").unwrap();
    assert_eq!(got.ack_timeout, Duration::from_secs(2));
    assert_eq!(got.ack_random_factor, 1.5);
    assert_eq!(got.max_retransmit, 4);
    assert_eq!(got.nstart, 1);
}

#[test]
fn test_administrative_path_is_restored() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fw-marker");
    let forced = dir.path().join("forced-target");
    fs::write(&forced, b"image").unwrap();

    write_record(
        &marker,
        InitialResult::Downloaded,
        None,
        forced.to_str(),
        true,
        None,
    )
    .unwrap();

    let (session, _) = FwUpdate::install(&marker, None, None, &startup_args());

    assert_eq!(session.administrative_path(), Some(forced.as_path()));
    assert_eq!(session.target_path(), Some(forced.as_path()));
}
