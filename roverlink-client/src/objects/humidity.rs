// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Humidity sensor object.

use log::debug;

use crate::objects::current_timestamp;
use crate::runtime::{Object, ObjectError, Oid, ResourceValue, Rid};

pub const HUMIDITY_SENSOR_OID: Oid = 33204;

/// Last or current measured value from the sensor.
pub const RID_SENSOR_VALUE: Rid = 5500;
/// Remote control state of the sensor (on/off).
pub const RID_SENSOR_STATE: Rid = 5501;
/// Time of the last sensor value change.
pub const RID_TIME_STAMP: Rid = 5502;

pub struct HumiditySensor {
    sensor_value: f64,
    sensor_state: bool,
    changed_at: String,
}

impl HumiditySensor {
    pub fn new() -> Self {
        Self {
            // most comfortable humidity, relay off
            sensor_value: 35.0,
            sensor_state: false,
            changed_at: current_timestamp(),
        }
    }

    /// Applies a locally measured value; the caller is responsible for
    /// notifying the runtime about the changed resources.
    pub fn set_data(&mut self, sensor_value: f64, sensor_state: bool) {
        self.sensor_value = sensor_value;
        self.sensor_state = sensor_state;
        self.changed_at = current_timestamp();
    }
}

impl Default for HumiditySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for HumiditySensor {
    fn oid(&self) -> Oid {
        HUMIDITY_SENSOR_OID
    }

    fn read(&self, rid: Rid) -> Result<ResourceValue, ObjectError> {
        debug!("read /{HUMIDITY_SENSOR_OID}/0/{rid}");
        match rid {
            RID_SENSOR_VALUE => Ok(ResourceValue::Double(self.sensor_value)),
            RID_SENSOR_STATE => Ok(ResourceValue::Bool(self.sensor_state)),
            RID_TIME_STAMP => Ok(ResourceValue::Text(self.changed_at.clone())),
            _ => Err(ObjectError::NotFound),
        }
    }

    fn write(&mut self, rid: Rid, value: ResourceValue) -> Result<(), ObjectError> {
        debug!("write /{HUMIDITY_SENSOR_OID}/0/{rid}");
        match (rid, value) {
            (RID_SENSOR_VALUE, ResourceValue::Double(value)) => {
                if !(0.0..=40.0).contains(&value) {
                    return Err(ObjectError::BadRequest);
                }
                self.sensor_value = value;
                Ok(())
            }
            (RID_SENSOR_STATE, ResourceValue::Bool(state)) => {
                self.sensor_state = state;
                Ok(())
            }
            (RID_SENSOR_VALUE | RID_SENSOR_STATE, _) => Err(ObjectError::BadRequest),
            _ => Err(ObjectError::NotFound),
        }
    }
}
