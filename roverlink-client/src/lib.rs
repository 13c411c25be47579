// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! LwM2M vehicle client glue.
//!
//! The heavy lifting (CoAP/DTLS, registration, request dispatch) belongs to
//! an external device-management engine reached through the
//! [`runtime::Runtime`] trait. This crate contributes everything around it:
//! the vehicle data-model objects, the client wiring that registers them and
//! the firmware update backend, and the command-line front end.

pub mod cli;
pub mod client;
pub mod objects;
pub mod runtime;
