//! Immutable value objects shared across extraction, delta computation,
//! and reporting. A set or delta is constructed once with all of its
//! fields and never mutated afterwards.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CovDeltaError;
use crate::unit::CoveredUnit;

/// The set of covered units observed in one run.
///
/// A snapshot value, built once per (classes dir, exec data) pair; it does
/// not track later changes to either input. Equality is set equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageSet {
    units: BTreeSet<CoveredUnit>,
}

impl CoverageSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[must_use]
    pub fn contains(&self, unit: &CoveredUnit) -> bool {
        self.units.contains(unit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoveredUnit> {
        self.units.iter()
    }

    #[must_use]
    pub fn union(&self, other: &CoverageSet) -> CoverageSet {
        CoverageSet {
            units: self.units.union(&other.units).cloned().collect(),
        }
    }

    /// Units in `self` that are absent from `other` (asymmetric).
    #[must_use]
    pub fn subtract(&self, other: &CoverageSet) -> CoverageSet {
        CoverageSet {
            units: self.units.difference(&other.units).cloned().collect(),
        }
    }

    /// True when this set holds at least one unit absent from `baseline`.
    #[must_use]
    pub fn adds_anything_beyond(&self, baseline: &CoverageSet) -> bool {
        self.units.iter().any(|u| !baseline.units.contains(u))
    }

    /// Canonical forms of all units, in set order.
    #[must_use]
    pub fn canonical_forms(&self) -> Vec<String> {
        self.units.iter().map(CoveredUnit::canonical).collect()
    }
}

impl FromIterator<CoveredUnit> for CoverageSet {
    fn from_iter<I: IntoIterator<Item = CoveredUnit>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

/// Newly added coverage, aggregated for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDelta {
    pub class_name: String,
    pub added_lines: u32,
    pub added_methods: u32,
    pub added_branches: u32,
    pub added_instructions: u32,
}

/// Coverage value contributed by one test against a baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestDelta {
    pub test_selector: String,
    pub added_lines: u32,
    pub added_methods: u32,
    pub added_branches: u32,
    pub added_instructions: u32,
}

/// Line-level added coverage for one (test, class) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDeltaRow {
    pub test_selector: String,
    pub class_name: String,
    /// Lines covered for the first time.
    pub newly_covered_lines: Vec<u32>,
    /// Lines upgraded from partial to full coverage.
    pub upgraded_to_full_lines: Vec<u32>,
}

/// Selector for a test class or a single test method.
///
/// Textual form is `fully.qualified.Class` or
/// `fully.qualified.Class#method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestId {
    class_name: String,
    method_name: Option<String>,
}

impl TestId {
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: None,
        }
    }

    pub fn method(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: Some(method_name.into()),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    /// A class-only selector runs the whole test class.
    #[must_use]
    pub fn is_class_only(&self) -> bool {
        self.method_name.is_none()
    }
}

impl FromStr for TestId {
    type Err = CovDeltaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CovDeltaError::InvalidArgument(
                "Empty test selector".to_string(),
            ));
        }

        match trimmed.rfind('#') {
            None => Ok(TestId::class(trimmed)),
            Some(idx) if idx == 0 || idx == trimmed.len() - 1 => {
                Err(CovDeltaError::InvalidArgument(format!(
                    "Expected format fqcn or fqcn#method, got: {}",
                    s
                )))
            }
            Some(idx) => Ok(TestId::method(
                trimmed[..idx].trim(),
                trimmed[idx + 1..].trim(),
            )),
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method_name {
            Some(m) => write!(f, "{}#{}", self.class_name, m),
            None => f.write_str(&self.class_name),
        }
    }
}
