// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error taxonomy of the firmware update core.

use thiserror::Error;

/// Failures surfaced to the hosting device-management runtime.
///
/// Every lower-level failure is mapped to one of these at the state-machine
/// boundary; the runtime decides the protocol-level consequence (typically an
/// LwM2M Update Result code reported to the server).
#[derive(Debug, Error)]
pub enum FwError {
    /// Filesystem or stream failure (create/open/write/rename/chmod).
    #[error("firmware i/o failure")]
    Io(#[from] std::io::Error),

    /// A download stream is already open on this session.
    #[error("firmware download already in progress")]
    AlreadyOpen,

    /// The operation requires an open download stream.
    #[error("no firmware download stream open")]
    NotOpen,

    /// The downloaded package could not be unpacked into a runnable image.
    #[error("unsupported firmware package")]
    UnsupportedPackage,

    /// Writing a received chunk to the target file failed.
    #[error("not enough space to store firmware chunk")]
    NotEnoughSpace,

    /// The persisted state record failed validation.
    #[error("firmware state record corrupt")]
    CorruptRecord,

    /// The download ETag does not fit the persisted record format.
    #[error("ETag too long to persist")]
    EtagTooLong,

    /// The installed image could not replace the running process.
    #[error("could not launch installed firmware")]
    UpgradeFailed(#[source] std::io::Error),
}
