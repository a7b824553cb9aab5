use std::path::{Path, PathBuf};

use crate::engine::{ClassCoverage, CoverageEngine};
use crate::error::{CovDeltaError, Result};
use crate::model::CoverageSet;
use crate::unit::{CoverageKind, CoveredUnit};

/// Extracts covered units at method granularity from one execution-data
/// blob:
///
/// ```text
/// pkg/Foo::bar|LINE
/// pkg/Foo::bar|BRANCH
/// ```
///
/// All bytecode analysis is delegated to the engine; this type only turns
/// per-method counters into unit identities.
pub struct CoverageExtractor<E> {
    engine: E,
    classes_dir: PathBuf,
}

impl<E: CoverageEngine> CoverageExtractor<E> {
    /// The classes directory must exist up front; execution data is only
    /// read per extraction.
    pub fn new(engine: E, classes_dir: impl Into<PathBuf>) -> Result<Self> {
        let classes_dir = classes_dir.into();
        if !classes_dir.is_dir() {
            return Err(CovDeltaError::InvalidArgument(format!(
                "Classes directory does not exist: {}",
                classes_dir.display()
            )));
        }
        Ok(Self {
            engine,
            classes_dir,
        })
    }

    pub fn classes_dir(&self) -> &Path {
        &self.classes_dir
    }

    /// Raw per-class analysis of `exec_file` against the classes
    /// directory. Feeds instruction rollups, revision deltas, and
    /// line-level deltas, which need more than unit identities.
    pub fn analyze(&self, exec_file: &Path) -> Result<Vec<ClassCoverage>> {
        let store = self.engine.load_execution_data(exec_file)?;
        self.engine.analyze(&store, &self.classes_dir)
    }

    /// Extract the covered-unit snapshot for one execution-data blob.
    ///
    /// A method emits a LINE unit when its line counter covered anything
    /// and a BRANCH unit when its branch counter did; a method covered on
    /// neither dimension emits nothing. Engine failures abort the whole
    /// extraction; there is no partial set.
    pub fn extract(&self, exec_file: &Path) -> Result<CoverageSet> {
        let classes = self.analyze(exec_file)?;

        let mut units = Vec::new();
        for class in &classes {
            for method in &class.methods {
                if method.lines.covered > 0 {
                    units.push(CoveredUnit::new(
                        class.name.as_str(),
                        method.name.as_str(),
                        CoverageKind::Line,
                    ));
                }
                if method.branches.covered > 0 {
                    units.push(CoveredUnit::new(
                        class.name.as_str(),
                        method.name.as_str(),
                        CoverageKind::Branch,
                    ));
                }
            }
        }

        log::debug!(
            "extracted {} covered units from {} analyzed classes",
            units.len(),
            classes.len()
        );
        Ok(units.into_iter().collect())
    }
}
