use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use covdelta::engine::{ClassCoverage, Counter, CoverageEngine, LineStatus, MethodCoverage};
use covdelta::error::{CovDeltaError, Result};
use tempfile::TempDir;

/// Exec blobs written by the fake engine start with this magic; anything
/// else fails to load, the way a truncated real blob would.
pub const EXEC_MAGIC: &[u8] = b"FAKEEXEC";

/// In-memory stand-in for the external coverage engine.
///
/// Exec blobs are `FAKEEXEC<key>`; `analyze` returns the canned per-class
/// analysis registered under `<key>`. Dumps replay a configured blob and
/// record the reset flags they were invoked with.
#[derive(Default)]
pub struct FakeEngine {
    pub snapshots: BTreeMap<String, Vec<ClassCoverage>>,
    pub dump_blob: Option<Vec<u8>>,
    pub dump_resets: RefCell<Vec<bool>>,
}

pub struct FakeStore {
    key: String,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(key: &str, classes: Vec<ClassCoverage>) -> Self {
        let mut engine = Self::new();
        engine.add_snapshot(key, classes);
        engine
    }

    pub fn add_snapshot(&mut self, key: &str, classes: Vec<ClassCoverage>) {
        self.snapshots.insert(key.to_string(), classes);
    }

    /// The blob that `load_execution_data` resolves back to `key`.
    pub fn blob(key: &str) -> Vec<u8> {
        let mut blob = EXEC_MAGIC.to_vec();
        blob.extend_from_slice(key.as_bytes());
        blob
    }
}

impl CoverageEngine for FakeEngine {
    type Store = FakeStore;

    fn load_execution_data(&self, exec_file: &Path) -> Result<FakeStore> {
        let data = std::fs::read(exec_file)?;
        let Some(key) = data.strip_prefix(EXEC_MAGIC) else {
            return Err(CovDeltaError::ExecData(format!(
                "Not an execution data file: {}",
                exec_file.display()
            )));
        };
        let key = String::from_utf8(key.to_vec())
            .map_err(|_| CovDeltaError::ExecData("Garbled snapshot key".to_string()))?;
        Ok(FakeStore { key })
    }

    fn analyze(&self, store: &FakeStore, _classes_dir: &Path) -> Result<Vec<ClassCoverage>> {
        self.snapshots.get(&store.key).cloned().ok_or_else(|| {
            CovDeltaError::Analysis(format!("No analysis for snapshot '{}'", store.key))
        })
    }

    fn dump(&self, address: &str, port: u16, reset: bool) -> Result<Vec<u8>> {
        match &self.dump_blob {
            Some(blob) => {
                self.dump_resets.borrow_mut().push(reset);
                Ok(blob.clone())
            }
            None => Err(CovDeltaError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("Connection refused: {}:{}", address, port),
            ))),
        }
    }
}

/// Method coverage from (covered, missed) pairs per dimension.
pub fn method(
    name: &str,
    lines: (u32, u32),
    branches: (u32, u32),
    instructions: (u32, u32),
) -> MethodCoverage {
    MethodCoverage {
        name: name.to_string(),
        desc: "()V".to_string(),
        lines: Counter::new(lines.0, lines.1),
        branches: Counter::new(branches.0, branches.1),
        instructions: Counter::new(instructions.0, instructions.1),
    }
}

/// Class coverage with class totals derived from the methods.
pub fn class(name: &str, methods: Vec<MethodCoverage>) -> ClassCoverage {
    let mut lines = Counter::default();
    let mut branches = Counter::default();
    let mut instructions = Counter::default();
    let mut covered_methods = 0;

    for m in &methods {
        lines.covered += m.lines.covered;
        lines.missed += m.lines.missed;
        branches.covered += m.branches.covered;
        branches.missed += m.branches.missed;
        instructions.covered += m.instructions.covered;
        instructions.missed += m.instructions.missed;
        if m.lines.covered > 0 || m.branches.covered > 0 || m.instructions.covered > 0 {
            covered_methods += 1;
        }
    }

    let method_count = Counter::new(covered_methods, methods.len() as u32 - covered_methods);
    ClassCoverage {
        name: name.to_string(),
        methods,
        lines,
        branches,
        instructions,
        method_count,
        line_status: BTreeMap::new(),
    }
}

pub fn with_line_status(mut class: ClassCoverage, statuses: &[(u32, LineStatus)]) -> ClassCoverage {
    class.line_status = statuses.iter().copied().collect();
    class
}

/// Fresh workspace: a temp dir holding an empty `classes/` subdirectory
/// and an exec blob for `key`. The caller must hold onto the `TempDir`
/// to keep it alive.
pub fn setup_workspace(key: &str) -> (TempDir, PathBuf, PathBuf) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let classes_dir = dir.path().join("classes");
    std::fs::create_dir(&classes_dir).unwrap();
    let exec_file = dir.path().join(format!("{key}.exec"));
    std::fs::write(&exec_file, FakeEngine::blob(key)).unwrap();
    (dir, classes_dir, exec_file)
}
