//! Canonical identity of a single coverage fact.
//!
//! A covered unit is a (class, method, dimension) triple meaning "this
//! method had non-zero coverage on this dimension in this run". Its
//! canonical textual form is `owner::member|KIND`, e.g. `pkg/Foo::bar|LINE`.
//! Delta computation compares these forms for exact equality, so the
//! spelling is stable.

use std::fmt;
use std::str::FromStr;

use crate::error::{CovDeltaError, Result};

/// The two independent coverage dimensions tracked per method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoverageKind {
    Line,
    Branch,
}

impl CoverageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageKind::Line => "LINE",
            CoverageKind::Branch => "BRANCH",
        }
    }
}

impl fmt::Display for CoverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageKind {
    type Err = CovDeltaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "LINE" => Ok(CoverageKind::Line),
            "BRANCH" => Ok(CoverageKind::Branch),
            _ => Err(CovDeltaError::InvalidArgument(format!(
                "Unknown coverage kind: '{}'. Expected LINE or BRANCH",
                s
            ))),
        }
    }
}

/// One observable coverage fact at method granularity.
///
/// States that a method had at least one covered line or branch in a run;
/// it does not encode how many.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoveredUnit {
    /// Internal class name, e.g. `pkg/Foo`.
    pub owner: String,
    /// Method name.
    pub member: String,
    pub kind: CoverageKind,
}

impl CoveredUnit {
    pub fn new(owner: impl Into<String>, member: impl Into<String>, kind: CoverageKind) -> Self {
        Self {
            owner: owner.into(),
            member: member.into(),
            kind,
        }
    }

    /// Canonical form: `owner::member|KIND`.
    ///
    /// Injective as long as `owner` and `member` avoid the `::` and `|`
    /// delimiters; JVM internal names and method names do. An identifier
    /// containing a delimiter is an accepted limitation, not checked here.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}::{}|{}", self.owner, self.member, self.kind.as_str())
    }

    /// Parse a canonical form back into its parts.
    pub fn parse(s: &str) -> Result<Self> {
        let (rest, kind) = s.rsplit_once('|').ok_or_else(|| malformed(s))?;
        let (owner, member) = rest.split_once("::").ok_or_else(|| malformed(s))?;
        if owner.is_empty() || member.is_empty() {
            return Err(malformed(s));
        }
        Ok(Self {
            owner: owner.to_string(),
            member: member.to_string(),
            kind: kind.parse()?,
        })
    }
}

impl fmt::Display for CoveredUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}|{}", self.owner, self.member, self.kind.as_str())
    }
}

impl FromStr for CoveredUnit {
    type Err = CovDeltaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn malformed(s: &str) -> CovDeltaError {
    CovDeltaError::InvalidArgument(format!(
        "Malformed covered unit: '{}'. Expected owner::member|KIND",
        s
    ))
}
