// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Binary persistence of firmware update progress.
//!
//! A small record is rewritten after every lifecycle transition and consumed
//! once on process restart. The layout is fixed and little-endian, with no
//! magic or version header:
//!
//! | field               | encoding                                        |
//! |---------------------|-------------------------------------------------|
//! | result code         | 1 signed byte, one of six valid values          |
//! | source URI          | u32 length + bytes, 0 = absent                  |
//! | download path       | u32 length + bytes, 0 = absent                  |
//! | administrative flag | 1 byte boolean                                  |
//! | ETag length         | u16, [`ETAG_ABSENT`] = no ETag                  |
//! | ETag bytes          | present only if length <= 255                   |
//!
//! Writes are all-or-nothing: a failed write deletes the partial file rather
//! than leaving a truncated record behind. Reads never fail: a missing file
//! reads as [`InitialResult::Success`] (the marker being gone means the last
//! install committed) and anything unparseable degrades to
//! [`InitialResult::Neutral`] with all fields cleared.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::error::FwError;
use crate::target;

/// Magic ETag length meaning "there is no ETag".
pub const ETAG_ABSENT: u16 = u16::MAX;

/// Last committed lifecycle stage, as stored in the persistence record.
///
/// The raw values are part of the on-disk format and must not change.
/// Negative values are the in-flight stages, non-negative values are
/// idle/terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum InitialResult {
    Downloaded = -3,
    Downloading = -2,
    Neutral = 0,
    Success = 1,
    IntegrityFailure = 2,
    Failed = 4,
}

impl InitialResult {
    /// Decodes a raw result byte, rejecting anything outside the six valid
    /// values.
    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            -3 => Some(Self::Downloaded),
            -2 => Some(Self::Downloading),
            0 => Some(Self::Neutral),
            1 => Some(Self::Success),
            2 => Some(Self::IntegrityFailure),
            4 => Some(Self::Failed),
            _ => None,
        }
    }

    /// True for states in which no download or install is outstanding and no
    /// firmware file is supposed to exist on disk.
    pub fn is_idle(self) -> bool {
        self as i8 >= 0
    }
}

/// Decoded contents of the persistence file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRecord {
    pub result: InitialResult,
    pub uri: Option<String>,
    pub download_path: Option<String>,
    pub administrative: bool,
    pub etag: Option<Vec<u8>>,
}

impl PersistedRecord {
    fn empty(result: InitialResult) -> Self {
        Self {
            result,
            uri: None,
            download_path: None,
            administrative: false,
            etag: None,
        }
    }
}

fn put_string(out: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(s) => {
            out.extend_from_slice(&(s.len() as u32).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        None => out.extend_from_slice(&0u32.to_le_bytes()),
    }
}

/// Writes the state record at `path`, replacing any previous one.
///
/// All-or-nothing: on any failure the file is removed and the error is
/// reported, so a reader can never observe a truncated record. An ETag
/// longer than 255 bytes cannot be represented in the format and is rejected
/// as [`FwError::EtagTooLong`]; ETags come from the download server, so this
/// must stay an error, not an abort.
pub fn write_record(
    path: &Path,
    result: InitialResult,
    uri: Option<&str>,
    download_path: Option<&str>,
    administrative: bool,
    etag: Option<&[u8]>,
) -> Result<(), FwError> {
    if let Some(tag) = etag {
        if tag.len() > u8::MAX as usize {
            warn!("cannot persist {}-byte ETag", tag.len());
            target::delete_if_present(path);
            return Err(FwError::EtagTooLong);
        }
    }

    let mut out = Vec::new();
    out.push(result as i8 as u8);
    put_string(&mut out, uri);
    put_string(&mut out, download_path);
    out.push(administrative as u8);
    match etag {
        Some(tag) => {
            out.extend_from_slice(&(tag.len() as u16).to_le_bytes());
            out.extend_from_slice(tag);
        }
        None => out.extend_from_slice(&ETAG_ABSENT.to_le_bytes()),
    }

    if let Err(err) = fs::write(path, &out) {
        warn!("could not write firmware state record: {err}");
        target::delete_if_present(path);
        return Err(FwError::Io(err));
    }
    debug!("persisted firmware state {result:?} at {}", path.display());
    Ok(())
}

/// Reads the state record at `path`. Never fails.
///
/// A missing file reads as `Success` with no fields populated; an existing
/// but unparseable file reads as `Neutral` with no fields populated.
pub fn read_record(path: &Path) -> PersistedRecord {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return PersistedRecord::empty(InitialResult::Success);
        }
        Err(err) => {
            warn!("could not read firmware state record: {err}");
            return PersistedRecord::empty(InitialResult::Neutral);
        }
    };

    decode(&bytes).unwrap_or_else(|_| {
        warn!("invalid data in firmware state record {}", path.display());
        PersistedRecord::empty(InitialResult::Neutral)
    })
}

fn decode(bytes: &[u8]) -> Result<PersistedRecord, FwError> {
    let mut reader = Reader { bytes, pos: 0 };

    let raw = reader.take(1)?[0] as i8;
    let result = InitialResult::from_raw(raw).ok_or(FwError::CorruptRecord)?;
    let uri = reader.string()?;
    let download_path = reader.string()?;
    let administrative = reader.take(1)?[0] != 0;

    let etag_len = u16::from_le_bytes(reader.take(2)?.try_into().unwrap());
    // Any length wider than one byte, the absent sentinel included, decodes
    // as "no ETag".
    let etag = if etag_len <= u8::MAX as u16 {
        Some(reader.take(etag_len as usize)?.to_vec())
    } else {
        None
    };

    Ok(PersistedRecord {
        result,
        uri,
        download_path,
        administrative,
        etag,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], FwError> {
        let end = self.pos.checked_add(len).ok_or(FwError::CorruptRecord)?;
        if end > self.bytes.len() {
            return Err(FwError::CorruptRecord);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn string(&mut self) -> Result<Option<String>, FwError> {
        let len = u32::from_le_bytes(self.take(4)?.try_into().unwrap());
        if len == 0 {
            return Ok(None);
        }
        let bytes = self.take(len as usize)?;
        let value = std::str::from_utf8(bytes).map_err(|_| FwError::CorruptRecord)?;
        Ok(Some(value.to_owned()))
    }
}
