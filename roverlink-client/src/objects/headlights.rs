// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Headlights control object.

use log::debug;

use crate::objects::current_timestamp;
use crate::runtime::{Object, ObjectError, Oid, ResourceValue, Rid};

pub const HEADLIGHTS_CONTROL_OID: Oid = 33205;

/// Relay state of the headlights (on/off).
pub const RID_CONTROL_STATE: Rid = 5850;
/// Brightness level of the headlights, set by PWM (0..=100).
pub const RID_BRIGHTNESS: Rid = 5851;
/// Time of the last headlights change.
pub const RID_TIME_STAMP: Rid = 5518;

pub struct HeadlightsControl {
    control_state: bool,
    brightness: i64,
    changed_at: String,
}

impl HeadlightsControl {
    pub fn new() -> Self {
        Self {
            control_state: false,
            brightness: 50,
            changed_at: current_timestamp(),
        }
    }

    pub fn set_data(&mut self, control_state: bool, brightness: i64) {
        self.control_state = control_state;
        self.brightness = brightness;
        self.changed_at = current_timestamp();
    }
}

impl Default for HeadlightsControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for HeadlightsControl {
    fn oid(&self) -> Oid {
        HEADLIGHTS_CONTROL_OID
    }

    fn read(&self, rid: Rid) -> Result<ResourceValue, ObjectError> {
        debug!("read /{HEADLIGHTS_CONTROL_OID}/0/{rid}");
        match rid {
            RID_CONTROL_STATE => Ok(ResourceValue::Bool(self.control_state)),
            RID_BRIGHTNESS => Ok(ResourceValue::Int(self.brightness)),
            RID_TIME_STAMP => Ok(ResourceValue::Text(self.changed_at.clone())),
            _ => Err(ObjectError::NotFound),
        }
    }

    fn write(&mut self, rid: Rid, value: ResourceValue) -> Result<(), ObjectError> {
        debug!("write /{HEADLIGHTS_CONTROL_OID}/0/{rid}");
        match (rid, value) {
            (RID_CONTROL_STATE, ResourceValue::Bool(state)) => {
                self.control_state = state;
                Ok(())
            }
            (RID_BRIGHTNESS, ResourceValue::Int(brightness)) => {
                if !(0..=100).contains(&brightness) {
                    return Err(ObjectError::BadRequest);
                }
                self.brightness = brightness;
                Ok(())
            }
            (RID_CONTROL_STATE | RID_BRIGHTNESS, _) => Err(ObjectError::BadRequest),
            _ => Err(ObjectError::NotFound),
        }
    }
}
