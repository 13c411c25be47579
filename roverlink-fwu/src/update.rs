// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware update session and lifecycle state machine.
//!
//! A single [`FwUpdate`] session lives for the whole process and may pass
//! through many download/install cycles. The hosting device-management
//! runtime drives it through the [`FirmwareBackend`] handler surface:
//! `open` → zero or more `write`s → `finish`, then either `perform_upgrade`
//! or `reset`. Progress is persisted after every transition so a crash or
//! restart can resume via [`FwUpdate::install`](crate::install).

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::{debug, error, info};

use crate::error::FwError;
use crate::persist::{self, InitialResult};
use crate::target;
use crate::unpack;

/// Name of the firmware update package, reported to the server.
pub const PACKAGE_NAME: &str = "Roverlink_FW";
/// Version of the firmware update package, reported to the server.
pub const PACKAGE_VERSION: &str = "1.0";

/// Transport credentials for authenticated firmware downloads (PSK mode).
#[derive(Debug, Clone)]
pub struct SecurityInfo {
    pub psk_identity: Vec<u8>,
    pub psk_key: Vec<u8>,
}

/// CoAP transmission timing parameters for the download transfer.
#[derive(Debug, Clone, Copy)]
pub struct TxParams {
    pub ack_timeout: Duration,
    pub ack_random_factor: f64,
    pub max_retransmit: u32,
    pub nstart: u32,
}

/// Handler surface the core exposes to the hosting runtime.
///
/// Names and call order are fixed by the external protocol contract: the
/// runtime guarantees `open` → `write`* → `finish` strictly in that order for
/// a given download and never interleaves two downloads on one session.
/// `reset` may arrive at any point and must always be safe.
pub trait FirmwareBackend {
    fn open(&mut self, uri: Option<&str>, etag: Option<&[u8]>) -> Result<(), FwError>;
    fn write(&mut self, data: &[u8]) -> Result<(), FwError>;
    fn finish(&mut self) -> Result<(), FwError>;
    fn reset(&mut self);
    fn package_name(&self) -> &str;
    fn package_version(&self) -> &str;
    /// Replaces the process image with the installed firmware. Only ever
    /// returns on failure, in which case the process keeps running on the
    /// old image.
    fn perform_upgrade(&mut self) -> FwError;
    /// Credentials for the download transport, if any were configured.
    fn security_info(&self, uri: &str) -> Option<&SecurityInfo>;
    /// Transfer timing parameters, if any were configured.
    fn tx_params(&self, uri: &str) -> Option<TxParams>;
}

/// Live state of a firmware update in progress.
pub struct FwUpdate {
    /// Operator-forced destination path; once set it is always reused and
    /// never overwritten by a server-initiated download.
    pub(crate) administrative_path: Option<PathBuf>,
    /// Path currently designated to receive/hold the firmware. Owned by the
    /// session; created lazily, deleted on reset and failure.
    pub(crate) next_target_path: Option<PathBuf>,
    pub(crate) package_uri: Option<String>,
    pub(crate) persistence_file: PathBuf,
    /// Exclusive write handle to `next_target_path` while a download is in
    /// progress. At most one per session; implies `next_target_path` is set.
    pub(crate) stream: Option<File>,
    pub(crate) startup_args: Vec<OsString>,
    pub(crate) security_info: Option<SecurityInfo>,
    pub(crate) tx_params: Option<TxParams>,
}

impl FwUpdate {
    /// Begins a download: resolves the target path (administrative path
    /// first, else a fresh candidate), opens it for writing and persists the
    /// `Downloading` stage. Any failure leaves the session reset.
    pub fn open(&mut self, uri: Option<&str>, etag: Option<&[u8]>) -> Result<(), FwError> {
        if self.stream.is_some() {
            error!("cannot open firmware stream: download already in progress");
            return Err(FwError::AlreadyOpen);
        }
        info!("open firmware update stream");
        let result = self.open_stream(uri, etag);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn open_stream(&mut self, uri: Option<&str>, etag: Option<&[u8]>) -> Result<(), FwError> {
        let path = self.ensure_target_file()?;
        self.stream = Some(File::create(&path)?);
        self.package_uri = uri.map(str::to_owned);
        persist::write_record(
            &self.persistence_file,
            InitialResult::Downloading,
            uri,
            path.to_str(),
            self.administrative_path.is_some(),
            etag,
        )
    }

    /// Appends a received chunk to the target file.
    ///
    /// Download progress is observed externally by polling the file size, so
    /// every chunk must land in the file before this call returns; nothing
    /// is buffered between calls.
    pub fn write(&mut self, data: &[u8]) -> Result<(), FwError> {
        let stream = match self.stream.as_mut() {
            Some(stream) => stream,
            None => {
                error!("firmware stream not open");
                return Err(FwError::NotOpen);
            }
        };
        if data.is_empty() {
            return Ok(());
        }
        stream
            .write_all(data)
            .and_then(|()| stream.flush())
            .map_err(|err| {
                error!("could not store firmware chunk: {err}");
                FwError::NotEnoughSpace
            })
    }

    /// Closes the stream, unpacks the package in place and persists the
    /// `Downloaded` stage. Any failure performs a full reset.
    pub fn finish(&mut self) -> Result<(), FwError> {
        if self.stream.take().is_none() {
            error!("firmware stream not open");
            return Err(FwError::NotOpen);
        }
        let result = self.preprocess_firmware();
        if result.is_err() {
            self.reset();
        }
        debug!("firmware stream finished");
        result
    }

    fn preprocess_firmware(&mut self) -> Result<(), FwError> {
        let path = self.next_target_path.clone().ok_or(FwError::NotOpen)?;
        unpack::unpack_in_place(&path)?;
        info!("firmware downloaded successfully");
        persist::write_record(
            &self.persistence_file,
            InitialResult::Downloaded,
            self.package_uri.as_deref(),
            path.to_str(),
            self.administrative_path.is_some(),
            None,
        )
    }

    /// Abandons any download in progress: closes the stream, deletes the
    /// firmware file and the persisted record, clears the source URI.
    /// Idempotent and safe to call at any point, mid-stream included.
    pub fn reset(&mut self) {
        debug!("reset firmware update session");
        self.stream = None;
        self.package_uri = None;
        self.delete_target_file();
        target::delete_if_present(&self.persistence_file);
    }

    /// Persists the `Success` stage and replaces the running process with
    /// the installed image, passing the original startup argument vector
    /// through unchanged.
    ///
    /// Only ever returns on failure; the persisted record is removed so the
    /// old image does not mistake the next restart for a completed upgrade.
    pub fn perform_upgrade(&mut self) -> FwError {
        let path = match self.next_target_path.clone() {
            Some(path) => path,
            None => {
                error!("no installed firmware image to launch");
                return FwError::UpgradeFailed(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no installed firmware image",
                ));
            }
        };
        if let Err(err) = persist::write_record(
            &self.persistence_file,
            InitialResult::Success,
            None,
            path.to_str(),
            self.administrative_path.is_some(),
            None,
        ) {
            return err;
        }

        info!("|| =========== FIRMWARE UPDATE STARTED: {} =========== ||", path.display());
        let mut command = Command::new(&path);
        let mut args = self.startup_args.iter();
        if let Some(arg0) = args.next() {
            command.arg0(arg0);
        }
        command.args(args);
        let err = command.exec();

        error!("exec failed: {err}");
        target::delete_if_present(&self.persistence_file);
        FwError::UpgradeFailed(err)
    }

    /// Forces the destination path for subsequent downloads. Rejected while
    /// a download is streaming.
    pub fn set_package_path(&mut self, path: impl Into<PathBuf>) -> Result<(), FwError> {
        if self.stream.is_some() {
            error!("cannot set package path while a download is in progress");
            return Err(FwError::AlreadyOpen);
        }
        let path = path.into();
        info!("firmware package path set to {}", path.display());
        self.administrative_path = Some(path);
        Ok(())
    }

    /// Path currently holding (or receiving) the firmware, if any.
    pub fn target_path(&self) -> Option<&Path> {
        self.next_target_path.as_deref()
    }

    /// Operator-forced destination path, if one was set.
    pub fn administrative_path(&self) -> Option<&Path> {
        self.administrative_path.as_deref()
    }

    /// Source URI of the download in progress, if known.
    pub fn package_uri(&self) -> Option<&str> {
        self.package_uri.as_deref()
    }

    /// True while a download stream is open.
    pub fn is_stream_open(&self) -> bool {
        self.stream.is_some()
    }

    fn ensure_target_file(&mut self) -> Result<PathBuf, FwError> {
        if let Some(path) = &self.next_target_path {
            return Ok(path.clone());
        }
        let path = match &self.administrative_path {
            Some(admin) => admin.clone(),
            None => target::generate_target_path()?,
        };
        info!("created {}", path.display());
        self.next_target_path = Some(path.clone());
        Ok(path)
    }

    pub(crate) fn delete_target_file(&mut self) {
        if let Some(path) = self.next_target_path.take() {
            target::delete_if_present(&path);
        }
    }
}

impl FirmwareBackend for FwUpdate {
    fn open(&mut self, uri: Option<&str>, etag: Option<&[u8]>) -> Result<(), FwError> {
        FwUpdate::open(self, uri, etag)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), FwError> {
        FwUpdate::write(self, data)
    }

    fn finish(&mut self) -> Result<(), FwError> {
        FwUpdate::finish(self)
    }

    fn reset(&mut self) {
        FwUpdate::reset(self)
    }

    fn package_name(&self) -> &str {
        PACKAGE_NAME
    }

    fn package_version(&self) -> &str {
        PACKAGE_VERSION
    }

    fn perform_upgrade(&mut self) -> FwError {
        FwUpdate::perform_upgrade(self)
    }

    fn security_info(&self, _uri: &str) -> Option<&SecurityInfo> {
        self.security_info.as_ref()
    }

    fn tx_params(&self, _uri: &str) -> Option<TxParams> {
        self.tx_params
    }
}
