// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Candidate firmware file management.
//!
//! Target files hold downloaded firmware images before they are installed.
//! They live in the system temp directory under randomized names so that
//! concurrent sessions never collide, and are created with owner-only
//! permissions.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Prefix of generated firmware file names.
pub const TARGET_PREFIX: &str = "roverlink_fw-";

/// Creates an empty candidate firmware file with a randomized name and
/// returns its path.
///
/// The file is created with mode 0700 (owner read/write/execute, nothing for
/// group/other) and is left on disk; the caller owns it from here on.
pub fn generate_target_path() -> io::Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix(TARGET_PREFIX)
        .permissions(fs::Permissions::from_mode(0o700))
        .tempfile()?;
    let (_, path) = file.keep().map_err(|err| err.error)?;
    debug!("generated firmware target {}", path.display());
    Ok(path)
}

/// Removes `path` if it exists. Idempotent; never reports an error.
pub fn delete_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("deleted {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("could not delete {}: {err}", path.display()),
    }
}
