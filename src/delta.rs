//! Set algebra over coverage snapshots and its per-class / per-test
//! rollups.
//!
//! [`added_units`] is the single primitive: every rollup here is a
//! regrouping of `candidate \ baseline`, never a second diff path.

use std::collections::{BTreeMap, BTreeSet};

use crate::engine::{ClassCoverage, Counter, LineStatus};
use crate::error::{CovDeltaError, Result};
use crate::model::{ClassDelta, CoverageSet, LineDeltaRow, TestDelta, TestId};
use crate::unit::{CoverageKind, CoveredUnit};

/// Units in `candidate` that are absent from `baseline`.
#[must_use]
pub fn added_units(candidate: &CoverageSet, baseline: &CoverageSet) -> CoverageSet {
    candidate.subtract(baseline)
}

/// Rolls added coverage up against a baseline held as state.
///
/// Supports the incremental evaluation loop: evaluate a candidate test,
/// keep it, [`absorb`](DeltaAggregator::absorb) its coverage, move on.
/// Asking for a delta before any baseline exists is an error, not a
/// comparison against an implicit empty set.
#[derive(Debug, Clone, Default)]
pub struct DeltaAggregator {
    baseline: Option<CoverageSet>,
}

impl DeltaAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline(baseline: CoverageSet) -> Self {
        Self {
            baseline: Some(baseline),
        }
    }

    pub fn set_baseline(&mut self, baseline: CoverageSet) {
        self.baseline = Some(baseline);
    }

    pub fn baseline(&self) -> Option<&CoverageSet> {
        self.baseline.as_ref()
    }

    /// Union `set` into the baseline. The first call seeds it.
    pub fn absorb(&mut self, set: &CoverageSet) {
        self.baseline = Some(match self.baseline.take() {
            Some(baseline) => baseline.union(set),
            None => set.clone(),
        });
    }

    /// `candidate \ baseline`.
    pub fn added(&self, candidate: &CoverageSet) -> Result<CoverageSet> {
        Ok(added_units(candidate, self.require_baseline()?))
    }

    /// Per-class rollup of the added units.
    ///
    /// `analysis` is the candidate run's per-class analysis; it supplies
    /// the instruction counters, which unit identities alone do not carry.
    /// Classes that added nothing are omitted rather than emitted with
    /// zero counts, and callers must treat absence as zero added value.
    /// Sorted by added lines, descending.
    pub fn class_deltas(
        &self,
        candidate: &CoverageSet,
        analysis: &[ClassCoverage],
    ) -> Result<Vec<ClassDelta>> {
        let added = self.added(candidate)?;

        let mut deltas: Vec<ClassDelta> = group_by_owner(&added)
            .into_iter()
            .map(|(owner, group)| roll_up(owner, &group, analysis))
            .collect();
        deltas.sort_by(|a, b| {
            b.added_lines
                .cmp(&a.added_lines)
                .then_with(|| a.class_name.cmp(&b.class_name))
        });
        Ok(deltas)
    }

    /// Per-test rollup: the same added units, summed across classes and
    /// keyed by the test selector. `None` when the test adds nothing.
    pub fn test_delta(
        &self,
        test: &TestId,
        candidate: &CoverageSet,
        analysis: &[ClassCoverage],
    ) -> Result<Option<TestDelta>> {
        let per_class = self.class_deltas(candidate, analysis)?;
        if per_class.is_empty() {
            return Ok(None);
        }

        let mut delta = TestDelta {
            test_selector: test.to_string(),
            added_lines: 0,
            added_methods: 0,
            added_branches: 0,
            added_instructions: 0,
        };
        for class in &per_class {
            delta.added_lines += class.added_lines;
            delta.added_methods += class.added_methods;
            delta.added_branches += class.added_branches;
            delta.added_instructions += class.added_instructions;
        }
        Ok(Some(delta))
    }

    fn require_baseline(&self) -> Result<&CoverageSet> {
        self.baseline.as_ref().ok_or_else(|| {
            CovDeltaError::InvalidArgument("No baseline coverage set".to_string())
        })
    }
}

fn group_by_owner(added: &CoverageSet) -> BTreeMap<&str, Vec<&CoveredUnit>> {
    let mut groups: BTreeMap<&str, Vec<&CoveredUnit>> = BTreeMap::new();
    for unit in added.iter() {
        groups.entry(unit.owner.as_str()).or_default().push(unit);
    }
    groups
}

fn roll_up(owner: &str, group: &[&CoveredUnit], analysis: &[ClassCoverage]) -> ClassDelta {
    let added_lines = group
        .iter()
        .filter(|u| u.kind == CoverageKind::Line)
        .count() as u32;
    let added_branches = group
        .iter()
        .filter(|u| u.kind == CoverageKind::Branch)
        .count() as u32;

    // Methods that gained at least one unit, on either dimension.
    let gained: BTreeSet<&str> = group.iter().map(|u| u.member.as_str()).collect();

    ClassDelta {
        class_name: owner.to_string(),
        added_lines,
        added_methods: gained.len() as u32,
        added_branches,
        added_instructions: instructions_covered(owner, &gained, analysis),
    }
}

/// Candidate-run instruction covered-counts, summed over exactly the
/// methods that gained a unit. A method missing from the analysis
/// contributes nothing.
fn instructions_covered(owner: &str, gained: &BTreeSet<&str>, analysis: &[ClassCoverage]) -> u32 {
    analysis
        .iter()
        .filter(|class| class.name == owner)
        .flat_map(|class| class.methods.iter())
        .filter(|method| gained.contains(method.name.as_str()))
        .map(|method| method.instructions.covered)
        .sum()
}

/// Counter-level delta between two analyzed revisions (or runs), per
/// class. Works on covered-counts directly rather than units, so it also
/// sees growth inside methods that were already covered on both
/// dimensions.
///
/// Classes are keyed by dot-normalized name; counts saturate at zero, so
/// a candidate covering less than the baseline reports no "added" value
/// for that counter. All-zero classes are skipped. Sorted by added lines,
/// descending.
#[must_use]
pub fn revision_deltas(baseline: &[ClassCoverage], candidate: &[ClassCoverage]) -> Vec<ClassDelta> {
    let base: BTreeMap<String, &ClassCoverage> = baseline
        .iter()
        .map(|class| (class.source_name(), class))
        .collect();

    let mut deltas = Vec::new();
    for cand in candidate {
        let name = cand.source_name();
        let b = base.get(&name).copied();

        let added_lines = diff_covered(cand.lines, b.map(|c| c.lines));
        let added_instructions = diff_covered(cand.instructions, b.map(|c| c.instructions));
        let added_branches = diff_covered(cand.branches, b.map(|c| c.branches));
        let added_methods = diff_covered(cand.method_count, b.map(|c| c.method_count));

        if added_lines != 0 || added_instructions != 0 || added_branches != 0 || added_methods != 0
        {
            deltas.push(ClassDelta {
                class_name: name,
                added_lines,
                added_methods,
                added_branches,
                added_instructions,
            });
        }
    }
    deltas.sort_by(|a, b| {
        b.added_lines
            .cmp(&a.added_lines)
            .then_with(|| a.class_name.cmp(&b.class_name))
    });
    deltas
}

fn diff_covered(cand: Counter, base: Option<Counter>) -> u32 {
    cand.covered.saturating_sub(base.map_or(0, |c| c.covered))
}

/// Line-level view of what a test changed: lines it covered for the first
/// time, and lines it upgraded from partial to full coverage. Classes
/// where neither happened are omitted.
#[must_use]
pub fn line_deltas(
    test: &TestId,
    baseline: &[ClassCoverage],
    candidate: &[ClassCoverage],
) -> Vec<LineDeltaRow> {
    let base: BTreeMap<&str, &ClassCoverage> = baseline
        .iter()
        .map(|class| (class.name.as_str(), class))
        .collect();

    let mut rows = Vec::new();
    for cand in candidate {
        let base_status = base.get(cand.name.as_str()).map(|c| &c.line_status);

        let mut newly_covered = Vec::new();
        let mut upgraded = Vec::new();
        for (&line, &status) in &cand.line_status {
            let before = base_status
                .and_then(|m| m.get(&line))
                .copied()
                .unwrap_or(LineStatus::NotCovered);

            if before == LineStatus::NotCovered && status != LineStatus::NotCovered {
                newly_covered.push(line);
            } else if before == LineStatus::PartlyCovered && status == LineStatus::FullyCovered {
                upgraded.push(line);
            }
        }

        if !newly_covered.is_empty() || !upgraded.is_empty() {
            rows.push(LineDeltaRow {
                test_selector: test.to_string(),
                class_name: cand.name.clone(),
                newly_covered_lines: newly_covered,
                upgraded_to_full_lines: upgraded,
            });
        }
    }
    rows
}
