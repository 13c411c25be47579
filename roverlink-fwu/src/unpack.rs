// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Turning a downloaded package into a runnable image.
//!
//! The package format is a raw executable, so "unpacking" is a verified copy:
//! the package is streamed into a fresh candidate file, the candidate is
//! atomically renamed over the target, and the result is marked executable.
//! A failure at any step removes both the candidate and the target so no
//! half-installed image survives.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use log::{debug, error};

use crate::error::FwError;
use crate::target;

const COPY_CHUNK_SIZE: usize = 4096;

/// Unpacks the firmware package at `target_path` in place.
///
/// On success only the target survives, owner-executable. On failure the
/// target is deleted along with the staging candidate and the error surfaces
/// as [`FwError::UnsupportedPackage`]; the protocol layer maps that to an
/// unsupported-package-type result.
pub fn unpack_in_place(target_path: &Path) -> Result<(), FwError> {
    let candidate = match target::generate_target_path() {
        Ok(path) => path,
        Err(err) => {
            error!("could not generate staging file to unpack firmware: {err}");
            return Err(FwError::Io(err));
        }
    };

    let result = unpack_to_file(target_path, &candidate)
        .and_then(|()| fs::rename(&candidate, target_path))
        .and_then(|()| fs::set_permissions(target_path, fs::Permissions::from_mode(0o700)));

    // The candidate must never survive; after a successful rename this is a
    // no-op.
    target::delete_if_present(&candidate);

    match result {
        Ok(()) => {
            debug!("unpacked firmware at {}", target_path.display());
            Ok(())
        }
        Err(err) => {
            error!("could not unpack firmware {}: {err}", target_path.display());
            target::delete_if_present(target_path);
            Err(FwError::UnsupportedPackage)
        }
    }
}

fn unpack_to_file(package: &Path, destination: &Path) -> io::Result<()> {
    let mut source = File::open(package)?;
    let mut staged = OpenOptions::new().write(true).truncate(true).open(destination)?;
    copy_file_contents(&mut staged, &mut source)
}

/// Fixed-size chunked copy. Short writes fail the copy instead of silently
/// truncating.
fn copy_file_contents(destination: &mut File, source: &mut File) -> io::Result<()> {
    let mut buffer = [0u8; COPY_CHUNK_SIZE];
    loop {
        let read = source.read(&mut buffer)?;
        if read == 0 {
            return Ok(());
        }
        destination.write_all(&buffer[..read])?;
    }
}
