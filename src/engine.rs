//! Seam to the external coverage-instrumentation engine.
//!
//! Bytecode analysis, the binary exec-data format, and the dump wire
//! protocol all stay on the engine's side of this boundary. This crate
//! needs exactly three capabilities from a concrete engine: load a raw
//! execution-data blob, statically analyze compiled classes against it,
//! and request a live dump from a running instrumented process.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// A covered/missed pair for one probe dimension, as reported by the
/// engine's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    pub covered: u32,
    pub missed: u32,
}

impl Counter {
    pub fn new(covered: u32, missed: u32) -> Self {
        Self { covered, missed }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.covered + self.missed
    }
}

/// Coverage status of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    NotCovered,
    PartlyCovered,
    FullyCovered,
}

/// Per-method counters from class analysis.
#[derive(Debug, Clone)]
pub struct MethodCoverage {
    pub name: String,
    /// JVM-style descriptor, e.g. `(I)V`. Informational; not part of unit
    /// identity.
    pub desc: String,
    pub lines: Counter,
    pub branches: Counter,
    pub instructions: Counter,
}

/// Analysis result for one class file.
#[derive(Debug, Clone)]
pub struct ClassCoverage {
    /// Internal class name, e.g. `pkg/Foo`.
    pub name: String,
    pub methods: Vec<MethodCoverage>,
    /// Class-level counter totals.
    pub lines: Counter,
    pub branches: Counter,
    pub instructions: Counter,
    pub method_count: Counter,
    /// Status per source line number.
    pub line_status: BTreeMap<u32, LineStatus>,
}

impl ClassCoverage {
    /// Fully-qualified source name: `pkg.Foo` for `pkg/Foo`.
    #[must_use]
    pub fn source_name(&self) -> String {
        self.name.replace('/', ".")
    }
}

/// Narrow capability interface over a concrete coverage engine.
///
/// Implementations surface their failures through this crate's error type
/// and those failures propagate unchanged: no retry, no partial results.
pub trait CoverageEngine {
    /// In-memory execution data, opaque outside the engine.
    type Store;

    /// Load a raw execution-data blob from disk into a store.
    fn load_execution_data(&self, exec_file: &Path) -> Result<Self::Store>;

    /// Statically analyze every class file under `classes_dir` against
    /// previously loaded execution data.
    fn analyze(&self, store: &Self::Store, classes_dir: &Path) -> Result<Vec<ClassCoverage>>;

    /// Request a coverage dump from a running instrumented process.
    ///
    /// When `reset` is true the remote counters are cleared after the
    /// dump, so a later dump reflects only activity since this one. That
    /// is a stateful side effect on the remote process.
    fn dump(&self, address: &str, port: u16, reset: bool) -> Result<Vec<u8>>;
}
