// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Crash-safe firmware update core for the roverlink LwM2M vehicle client.
//!
//! This crate owns the device-side firmware replacement lifecycle:
//! - [`persist`]: binary persistence of update progress across restarts
//! - [`target`]: collision-free candidate firmware files
//! - [`unpack`]: atomic write-to-temp/rename/chmod installation of packages
//! - [`update`]: the [`FwUpdate`] session and its [`FirmwareBackend`] handler
//!   surface driven by the hosting device-management runtime
//! - [`install`]: startup reconciliation, including partial-download resume
//!
//! The CoAP/DTLS transport, registration handshake and request dispatch are
//! the hosting runtime's business; this crate only reacts to the handler
//! calls it receives and replaces the process image on a committed upgrade.

pub mod error;
pub mod install;
pub mod persist;
pub mod target;
pub mod unpack;
pub mod update;

pub use error::FwError;
pub use install::InitialState;
pub use persist::{InitialResult, PersistedRecord, ETAG_ABSENT};
pub use update::{
    FirmwareBackend, FwUpdate, SecurityInfo, TxParams, PACKAGE_NAME, PACKAGE_VERSION,
};
