// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Startup-time reconciliation of leftover update state.
//!
//! On process start the persistence file (if any) is read and immediately
//! deleted; in-session bookkeeping takes over from there. An interrupted
//! download is reopened for append so the runtime can resume it at the right
//! offset, and anything the session is not supposed to have while idle is
//! cleaned up.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom};
use std::path::PathBuf;

use log::{info, warn};

use crate::error::FwError;
use crate::persist::{self, InitialResult};
use crate::target;
use crate::update::{FwUpdate, SecurityInfo, TxParams};

/// Restored state handed to the runtime when the handler set is registered.
///
/// `resume_offset` and `resume_etag` let the runtime continue an interrupted
/// transfer instead of restarting it from scratch.
#[derive(Debug, Clone)]
pub struct InitialState {
    pub result: InitialResult,
    pub persisted_uri: Option<String>,
    pub resume_offset: u64,
    pub resume_etag: Option<Vec<u8>>,
}

impl FwUpdate {
    /// Creates the session for this process, reconciling whatever the
    /// previous run left behind.
    ///
    /// `startup_args` is the original process argument vector, reused for
    /// self-re-exec on a successful install. The returned [`InitialState`]
    /// must be passed to the hosting runtime together with the session.
    pub fn install(
        persistence_file: impl Into<PathBuf>,
        security_info: Option<SecurityInfo>,
        tx_params: Option<TxParams>,
        startup_args: &[OsString],
    ) -> (FwUpdate, InitialState) {
        let persistence_file = persistence_file.into();
        let record = persist::read_record(&persistence_file);
        target::delete_if_present(&persistence_file);
        info!("initial firmware upgrade state: {:?}", record.result);

        let mut session = FwUpdate {
            administrative_path: None,
            next_target_path: record.download_path.as_deref().map(PathBuf::from),
            package_uri: None,
            persistence_file,
            stream: None,
            startup_args: startup_args.to_vec(),
            security_info,
            tx_params,
        };
        if record.administrative {
            session.administrative_path = session.next_target_path.clone();
        }

        let mut state = InitialState {
            result: record.result,
            persisted_uri: record.uri,
            resume_offset: 0,
            resume_etag: record.etag,
        };

        if state.result == InitialResult::Downloading {
            match session.reopen_partial() {
                Ok(offset) => state.resume_offset = offset,
                Err(err) => {
                    // Conservative fallback: restart the download.
                    warn!("could not resume partial download: {err}");
                    state.result = InitialResult::Neutral;
                }
            }
        }

        if state.result.is_idle() {
            // No firmware file is supposed to exist while idle; drop any
            // leftover from the previous run.
            session.delete_target_file();
        }

        (session, state)
    }

    fn reopen_partial(&mut self) -> Result<u64, FwError> {
        let path = self.next_target_path.as_ref().ok_or(FwError::NotOpen)?;
        let mut stream = OpenOptions::new().append(true).open(path)?;
        let offset = stream.seek(SeekFrom::End(0))?;
        self.stream = Some(stream);
        Ok(offset)
    }
}
