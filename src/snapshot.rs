//! Live coverage snapshot retrieval from a running instrumented process.

use std::fs;
use std::path::Path;

use crate::engine::CoverageEngine;
use crate::error::Result;

/// Client side of an engine's coverage-dump endpoint.
///
/// One blocking network round-trip per call, no retry, and no timeout
/// beyond the transport default: a hung endpoint blocks the caller. The
/// wire protocol itself belongs to the engine.
#[derive(Debug, Clone)]
pub struct SnapshotRetriever {
    address: String,
    port: u16,
}

impl SnapshotRetriever {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Dump the remote process's current execution data and overwrite
    /// `exec_out` with it, returning the written size in bytes.
    ///
    /// With `reset` set, the remote counters are cleared after the dump;
    /// the next dump then reflects only activity since this one.
    ///
    /// Any dump or write failure propagates as-is, and `exec_out` must
    /// not be trusted afterwards. The write is a plain whole-file
    /// overwrite with no atomic rename, so a crash mid-write can leave a
    /// truncated file; extraction then fails to parse it rather than
    /// reading it as empty coverage.
    pub fn retrieve<E: CoverageEngine>(
        &self,
        engine: &E,
        exec_out: &Path,
        reset: bool,
    ) -> Result<u64> {
        let blob = engine.dump(&self.address, self.port, reset)?;
        fs::write(exec_out, &blob)?;

        log::info!("wrote {} ({} bytes)", exec_out.display(), blob.len());
        Ok(blob.len() as u64)
    }
}
