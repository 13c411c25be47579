// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Client wiring: registration, objects and the firmware update backend.

use std::cell::RefCell;
use std::ffi::OsString;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info};

use roverlink_fwu::{FwUpdate, SecurityInfo};

use crate::objects::headlights::{self, HeadlightsControl};
use crate::objects::humidity::{self, HumiditySensor};
use crate::runtime::{Registration, Runtime};

/// Everything needed to bring the client up.
pub struct ClientConfig {
    pub registration: Registration,
    /// Firmware update persistence marker file.
    pub fw_marker_path: PathBuf,
    /// Credentials for authenticated firmware downloads, if any.
    pub fw_security: Option<SecurityInfo>,
    /// Original process argument vector, reused for self-re-exec after a
    /// firmware install.
    pub startup_args: Vec<OsString>,
}

/// The vehicle client: data-model objects plus the firmware update backend,
/// registered with a hosting runtime.
pub struct Client<R: Runtime> {
    runtime: R,
    humidity: Rc<RefCell<HumiditySensor>>,
    headlights: Rc<RefCell<HeadlightsControl>>,
}

impl<R: Runtime> Client<R> {
    pub fn new(mut runtime: R, config: ClientConfig) -> Result<Self> {
        runtime
            .configure_registration(&config.registration)
            .context("could not configure server registration")?;

        let humidity = Rc::new(RefCell::new(HumiditySensor::new()));
        let headlights = Rc::new(RefCell::new(HeadlightsControl::new()));
        runtime
            .register_object(humidity.clone())
            .context("could not register humidity object")?;
        runtime
            .register_object(headlights.clone())
            .context("could not register headlights object")?;

        let (backend, initial) = FwUpdate::install(
            &config.fw_marker_path,
            config.fw_security,
            None,
            &config.startup_args,
        );
        runtime
            .install_firmware(Box::new(backend), initial)
            .context("could not install firmware update object")?;

        Ok(Self {
            runtime,
            humidity,
            headlights,
        })
    }

    /// Publishes a locally measured humidity value.
    pub fn push_humidity(&mut self, sensor_value: f64, sensor_state: bool) {
        info!("push humidity: value {sensor_value}, state {sensor_state}");
        self.humidity.borrow_mut().set_data(sensor_value, sensor_state);
        for rid in [
            humidity::RID_SENSOR_VALUE,
            humidity::RID_SENSOR_STATE,
            humidity::RID_TIME_STAMP,
        ] {
            self.runtime.notify_changed(humidity::HUMIDITY_SENSOR_OID, rid);
        }
    }

    /// Publishes a local headlights change.
    pub fn push_headlights(&mut self, control_state: bool, brightness: i64) {
        info!("push headlights: state {control_state}, brightness {brightness}");
        self.headlights.borrow_mut().set_data(control_state, brightness);
        for rid in [
            headlights::RID_CONTROL_STATE,
            headlights::RID_BRIGHTNESS,
            headlights::RID_TIME_STAMP,
        ] {
            self.runtime
                .notify_changed(headlights::HEADLIGHTS_CONTROL_OID, rid);
        }
    }

    /// Runs one iteration of the runtime's event loop, reconnecting when the
    /// engine reports that every connection is down.
    pub fn poll_sockets(&mut self, max_wait: Duration) {
        if let Err(err) = self.runtime.poll(max_wait) {
            error!("runtime poll failed: {err:#}");
        }
        if self.runtime.all_connections_failed() {
            error!("all connections failed, trying to reconnect...");
            self.runtime.schedule_reconnect();
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }
}
