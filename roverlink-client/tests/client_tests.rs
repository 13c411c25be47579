// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Client glue tests driven through the loopback runtime.

use std::ffi::OsString;
use std::path::Path;

use roverlink_client::client::{Client, ClientConfig};
use roverlink_client::objects::{headlights, humidity};
use roverlink_client::runtime::{
    LoopbackRuntime, Object, ObjectError, Registration, ResourceValue,
};
use roverlink_fwu::persist::{read_record, InitialResult};
use roverlink_fwu::{FirmwareBackend, SecurityInfo};

fn config_in(dir: &Path) -> ClientConfig {
    ClientConfig {
        registration: Registration {
            ssid: 1,
            endpoint_name: "test-vehicle".to_owned(),
            server_uri: "coaps://127.0.0.1:5684".to_owned(),
            binding_mode: "U".to_owned(),
            lifetime: 86400,
            bootstrap: false,
            security: None,
        },
        fw_marker_path: dir.join("fw-marker"),
        fw_security: Some(SecurityInfo {
            psk_identity: b"test-vehicle".to_vec(),
            psk_key: b"secret".to_vec(),
        }),
        startup_args: vec![OsString::from("roverlink-client")],
    }
}

#[test]
fn test_client_registers_objects_and_firmware() {
    let dir = tempfile::tempdir().unwrap();
    let client = Client::new(LoopbackRuntime::new(), config_in(dir.path())).unwrap();

    let runtime = client.runtime();
    assert!(runtime.object(humidity::HUMIDITY_SENSOR_OID).is_some());
    assert!(runtime.object(headlights::HEADLIGHTS_CONTROL_OID).is_some());
    assert_eq!(
        runtime.registration().unwrap().endpoint_name,
        "test-vehicle"
    );
    // Fresh start: no marker on disk means the last install committed.
    assert_eq!(
        runtime.initial_state().unwrap().result,
        InitialResult::Success
    );
}

#[test]
fn test_pushes_are_readable_and_notified() {
    let dir = tempfile::tempdir().unwrap();
    let mut client = Client::new(LoopbackRuntime::new(), config_in(dir.path())).unwrap();

    client.push_humidity(77.19, true);
    client.push_headlights(true, 75);

    let runtime = client.runtime();
    let sensor = runtime.object(humidity::HUMIDITY_SENSOR_OID).unwrap();
    assert_eq!(
        sensor.borrow().read(humidity::RID_SENSOR_VALUE),
        Ok(ResourceValue::Double(77.19))
    );
    assert_eq!(
        sensor.borrow().read(humidity::RID_SENSOR_STATE),
        Ok(ResourceValue::Bool(true))
    );

    let lights = runtime.object(headlights::HEADLIGHTS_CONTROL_OID).unwrap();
    assert_eq!(
        lights.borrow().read(headlights::RID_BRIGHTNESS),
        Ok(ResourceValue::Int(75))
    );

    let notified = runtime.notifications();
    assert!(notified.contains(&(humidity::HUMIDITY_SENSOR_OID, humidity::RID_SENSOR_VALUE)));
    assert!(notified.contains(&(humidity::HUMIDITY_SENSOR_OID, humidity::RID_TIME_STAMP)));
    assert!(notified.contains(&(
        headlights::HEADLIGHTS_CONTROL_OID,
        headlights::RID_CONTROL_STATE
    )));
}

#[test]
fn test_server_writes_are_validated() {
    let dir = tempfile::tempdir().unwrap();
    let client = Client::new(LoopbackRuntime::new(), config_in(dir.path())).unwrap();
    let runtime = client.runtime();

    let sensor = runtime.object(humidity::HUMIDITY_SENSOR_OID).unwrap();
    assert_eq!(
        sensor
            .borrow_mut()
            .write(humidity::RID_SENSOR_VALUE, ResourceValue::Double(41.0)),
        Err(ObjectError::BadRequest)
    );
    assert_eq!(
        sensor
            .borrow_mut()
            .write(humidity::RID_SENSOR_VALUE, ResourceValue::Double(22.5)),
        Ok(())
    );
    assert_eq!(
        sensor.borrow().read(humidity::RID_SENSOR_VALUE),
        Ok(ResourceValue::Double(22.5))
    );
    assert_eq!(
        sensor.borrow().read(9999),
        Err(ObjectError::NotFound)
    );

    let lights = runtime.object(headlights::HEADLIGHTS_CONTROL_OID).unwrap();
    assert_eq!(
        lights
            .borrow_mut()
            .write(headlights::RID_BRIGHTNESS, ResourceValue::Int(101)),
        Err(ObjectError::BadRequest)
    );
    assert_eq!(
        lights
            .borrow_mut()
            .write(headlights::RID_BRIGHTNESS, ResourceValue::Bool(true)),
        Err(ObjectError::BadRequest)
    );
}

#[test]
fn test_firmware_backend_serves_a_download_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("fw-marker");
    let mut client = Client::new(LoopbackRuntime::new(), config_in(dir.path())).unwrap();

    let firmware = client.runtime_mut().firmware_mut().unwrap();
    assert_eq!(firmware.package_name(), "Roverlink_FW");
    assert_eq!(firmware.package_version(), "1.0");
    assert!(firmware
        .security_info("coaps://server/fw")
        .is_some_and(|info| info.psk_identity == b"test-vehicle"));

    firmware.open(Some("coaps://server/fw"), None).unwrap();
    firmware.write(b"new vehicle firmware").unwrap();
    firmware.finish().unwrap();
    assert_eq!(read_record(&marker).result, InitialResult::Downloaded);

    // The server changed its mind; everything is cleaned up.
    firmware.reset();
    assert_eq!(read_record(&marker).result, InitialResult::Success);
}
