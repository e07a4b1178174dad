// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable entity storage
//!
//! One JSON entry per line, each carrying a CRC32 of its operation. Every
//! append is fsynced before returning. A torn or corrupt tail (crash during
//! append) ends replay and is cut off when the log is reopened for writing.

use lifecycle_core::Operation;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    /// Microseconds since the Unix epoch
    pub timestamp_micros: u64,
    pub op: Operation,
    pub checksum: u32,
}

impl WalEntry {
    pub fn new(seq: u64, op: Operation) -> Result<Self, WalError> {
        let timestamp_micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        let checksum = Self::checksum(&op)?;
        Ok(Self {
            seq,
            timestamp_micros,
            op,
            checksum,
        })
    }

    fn checksum(op: &Operation) -> Result<u32, WalError> {
        let json = serde_json::to_string(op)?;
        Ok(crc32fast::hash(json.as_bytes()))
    }

    /// Whether the stored checksum matches the operation
    pub fn verify(&self) -> bool {
        Self::checksum(&self.op)
            .map(|sum| sum == self.checksum)
            .unwrap_or(false)
    }
}

/// Result of reading a log from disk
#[derive(Debug, Default)]
pub struct Replay {
    pub operations: Vec<Operation>,
    pub last_sequence: u64,
    /// Byte length of the intact prefix
    pub valid_len: u64,
    /// Whether a torn or corrupt tail was found after the intact prefix
    pub truncated: bool,
}

/// Append-only operation log
pub struct Wal {
    file: File,
    sequence: u64,
}

impl Wal {
    /// Open or create a log, cutting off any corrupt tail
    pub fn open(path: &Path) -> Result<Self, WalError> {
        Ok(Self::recover(path)?.0)
    }

    /// Like [`Wal::open`], also returning the intact operations it read
    pub fn recover(path: &Path) -> Result<(Self, Replay), WalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let replay = Self::replay(path)?;
        if replay.truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(replay.valid_len)?;
            file.sync_all()?;
            tracing::warn!(
                path = %path.display(),
                valid_len = replay.valid_len,
                "truncated corrupt wal tail"
            );
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let wal = Self {
            file,
            sequence: replay.last_sequence,
        };
        Ok((wal, replay))
    }

    /// Append an operation and fsync; returns its sequence number
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        let entry = WalEntry::new(self.sequence + 1, op.clone())?;
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_all()?;
        self.sequence = entry.seq;
        Ok(self.sequence)
    }

    /// Sequence number of the last appended entry
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Read every intact entry from the log; a missing file is an empty log
    pub fn replay(path: &Path) -> Result<Replay, WalError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Replay::default()),
            Err(e) => return Err(e.into()),
        };

        let mut replay = Replay::default();
        let mut offset = 0u64;

        for raw in bytes.split_inclusive(|b| *b == b'\n') {
            let Some(body) = raw.strip_suffix(b"\n") else {
                // Last line never got its newline
                replay.truncated = true;
                break;
            };
            offset += raw.len() as u64;

            if body.iter().all(u8::is_ascii_whitespace) {
                replay.valid_len = offset;
                continue;
            }

            match serde_json::from_slice::<WalEntry>(body) {
                Ok(entry) if entry.verify() => {
                    replay.last_sequence = entry.seq;
                    replay.operations.push(entry.op);
                    replay.valid_len = offset;
                }
                Ok(entry) => {
                    tracing::warn!(seq = entry.seq, "wal checksum mismatch, stopping replay");
                    replay.truncated = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable wal entry, stopping replay");
                    replay.truncated = true;
                    break;
                }
            }
        }

        Ok(replay)
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
