//! Delta reports on disk: CSV and JSON writers for class/test/line
//! deltas, plus the selector-list files that drive test evaluation.
//!
//! Each `write_*` function builds the full report as a `String` and
//! writes it in one shot, creating parent directories as needed.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::model::{ClassDelta, LineDeltaRow, TestDelta, TestId};

pub fn write_class_deltas(out: &Path, rows: &[ClassDelta]) -> Result<()> {
    let mut s =
        String::from("class_name,added_lines,added_methods,added_branches,added_instructions\n");
    for d in rows {
        writeln!(
            s,
            "{},{},{},{},{}",
            csv(&d.class_name),
            d.added_lines,
            d.added_methods,
            d.added_branches,
            d.added_instructions
        )
        .unwrap();
    }
    write_file(out, &s)
}

pub fn write_test_deltas(out: &Path, rows: &[TestDelta]) -> Result<()> {
    let mut s = String::from(
        "test_selector,added_lines,added_methods,added_branches,added_instructions\n",
    );
    for t in rows {
        writeln!(
            s,
            "{},{},{},{},{}",
            csv(&t.test_selector),
            t.added_lines,
            t.added_methods,
            t.added_branches,
            t.added_instructions
        )
        .unwrap();
    }
    write_file(out, &s)
}

pub fn write_line_deltas(out: &Path, rows: &[LineDeltaRow]) -> Result<()> {
    let mut s =
        String::from("test_selector,class_name,newly_covered_lines,upgraded_to_full_lines\n");
    for r in rows {
        writeln!(
            s,
            "{},{},{},{}",
            csv(&r.test_selector),
            csv(&r.class_name),
            csv(&to_ranges(&r.newly_covered_lines)),
            csv(&to_ranges(&r.upgraded_to_full_lines))
        )
        .unwrap();
    }
    write_file(out, &s)
}

/// The list of selectors that survived filtering, one per row.
pub fn write_kept_selectors(out: &Path, selectors: &[TestId]) -> Result<()> {
    let mut s = String::from("test_selector\n");
    for sel in selectors {
        writeln!(s, "{}", csv(&sel.to_string())).unwrap();
    }
    write_file(out, &s)
}

pub fn write_class_deltas_json(out: &Path, rows: &[ClassDelta]) -> Result<()> {
    write_json(out, rows)
}

pub fn write_test_deltas_json(out: &Path, rows: &[TestDelta]) -> Result<()> {
    write_json(out, rows)
}

/// Read back a test-delta CSV written by [`write_test_deltas`].
///
/// The reader matches the writer above and assumes its output: the
/// header row is skipped, blank lines and short rows are skipped, and
/// unparseable counts read as zero.
pub fn read_test_deltas(path: &Path) -> Result<Vec<TestDelta>> {
    let content = fs::read_to_string(path)?;
    let mut out = Vec::new();

    for line in content.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 5 {
            continue;
        }
        out.push(TestDelta {
            test_selector: parts[0].trim().to_string(),
            added_lines: parse_count(parts[1]),
            added_methods: parse_count(parts[2]),
            added_branches: parse_count(parts[3]),
            added_instructions: parse_count(parts[4]),
        });
    }
    Ok(out)
}

/// Read a selector list, one selector per line. Blank lines and `#`
/// comment lines are skipped.
pub fn read_selectors(path: &Path) -> Result<Vec<TestId>> {
    let content = fs::read_to_string(path)?;
    let mut out = Vec::new();

    for line in content.lines() {
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        out.push(s.parse()?);
    }
    Ok(out)
}

/// Compress line numbers into semicolon-separated ranges: `3;5-7`.
/// Input order does not matter; duplicates collapse.
#[must_use]
pub fn to_ranges(lines: &[u32]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut sorted = lines.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut out = String::new();
    let mut start = sorted[0];
    let mut prev = start;
    for &cur in &sorted[1..] {
        if cur == prev + 1 {
            prev = cur;
            continue;
        }
        push_range(&mut out, start, prev);
        out.push(';');
        start = cur;
        prev = cur;
    }
    push_range(&mut out, start, prev);
    out
}

fn push_range(out: &mut String, start: u32, end: u32) {
    if start == end {
        write!(out, "{}", start).unwrap();
    } else {
        write!(out, "{}-{}", start, end).unwrap();
    }
}

fn parse_count(s: &str) -> u32 {
    s.trim().parse().unwrap_or(0)
}

fn csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_json<T: Serialize>(out: &Path, rows: &[T]) -> Result<()> {
    let mut json = serde_json::to_string_pretty(rows)?;
    json.push('\n');
    write_file(out, &json)
}

fn write_file(out: &Path, content: &str) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(out, content)?;
    Ok(())
}
