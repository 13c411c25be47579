// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

use std::ffi::OsString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::flag;

use roverlink_client::cli::Cli;
use roverlink_client::client::{Client, ClientConfig};
use roverlink_client::runtime::{LoopbackRuntime, Registration};

const MAX_WAIT_TIME: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();

    // Captured before parsing: perform_upgrade re-execs the installed image
    // with this exact vector.
    let startup_args: Vec<OsString> = std::env::args_os().collect();
    let cli = Cli::parse();

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        flag::register(signal, Arc::clone(&shutdown))
            .context("could not register signal handler")?;
    }

    let config = ClientConfig {
        registration: Registration {
            ssid: 1,
            endpoint_name: cli.endpoint_name.clone(),
            server_uri: cli.server_uri.clone(),
            binding_mode: "U".to_owned(),
            lifetime: cli.lifetime,
            bootstrap: cli.bootstrap,
            security: cli.security(),
        },
        fw_marker_path: cli.fw_updated_marker_path.clone(),
        fw_security: cli.security(),
        startup_args,
    };

    let mut client =
        Client::new(LoopbackRuntime::new(), config).context("failed to create client")?;

    client.push_headlights(true, 75);
    client.push_humidity(77.19, false);

    while !shutdown.load(Ordering::Relaxed) {
        client.poll_sockets(MAX_WAIT_TIME);
    }

    info!("exiting remote controller process");
    Ok(())
}
