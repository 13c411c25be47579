// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use clap::Parser;

use roverlink_fwu::SecurityInfo;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "roverlink-client")]
#[command(about = "LwM2M vehicle client with over-the-air firmware update")]
pub struct Cli {
    /// Endpoint name the client registers under (device ID)
    #[arg(short, long, default_value = "RPI_3B+")]
    pub endpoint_name: String,

    /// Management server URI; only coaps:// is supported
    #[arg(
        short = 'u',
        long,
        default_value = "coaps://127.0.0.1:5684",
        value_parser = parse_server_uri
    )]
    pub server_uri: String,

    /// Registration lifetime in seconds (minimum 60)
    #[arg(short, long, default_value_t = 86400, value_parser = parse_lifetime)]
    pub lifetime: i64,

    /// Register through a bootstrap server
    #[arg(short, long)]
    pub bootstrap: bool,

    /// Firmware update persistence marker file
    #[arg(
        short = 'w',
        long = "fw-updated-marker-path",
        default_value = "/tmp/roverlink_fw-updated"
    )]
    pub fw_updated_marker_path: PathBuf,

    /// PSK identity for the secure transport
    #[arg(long, requires = "psk_key")]
    pub psk_identity: Option<String>,

    /// PSK key for the secure transport
    #[arg(long, requires = "psk_identity")]
    pub psk_key: Option<String>,
}

impl Cli {
    /// Transport credentials, when both PSK halves were given.
    pub fn security(&self) -> Option<SecurityInfo> {
        match (&self.psk_identity, &self.psk_key) {
            (Some(identity), Some(key)) => Some(SecurityInfo {
                psk_identity: identity.as_bytes().to_vec(),
                psk_key: key.as_bytes().to_vec(),
            }),
            _ => None,
        }
    }
}

/// Only the secure CoAP binding is supported.
fn parse_server_uri(uri: &str) -> Result<String, String> {
    if uri.starts_with("coaps://") {
        Ok(uri.to_owned())
    } else {
        Err("unknown protocol - coaps expected".to_owned())
    }
}

fn parse_lifetime(value: &str) -> Result<i64, String> {
    let lifetime: i64 = value
        .parse()
        .map_err(|err| format!("invalid lifetime: {err}"))?;
    if lifetime < 60 {
        return Err("lifetime is too short (minimum 60 seconds)".to_owned());
    }
    Ok(lifetime)
}
