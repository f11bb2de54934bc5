//! Test-identity matching between a prior report and the current run.
//!
//! Tests are keyed by `(file path, test name)`; names are opaque byte
//! strings. When generated tests share a name within a file, the start
//! position tells the instances apart: each side's definition is
//! closed to the next distinct test start (or end-of-file) and the
//! closed ranges are compared through [`ranges_match`].

use std::collections::BTreeMap;

use crate::model::{Location, Position, TestResult};
use crate::project::Project;
use crate::schema::{IncrementalReport, OpenEndLocation, TestFileResult};
use crate::source_span::{ranges_match, LineIndex};

/// One prior test with its location closed.
#[derive(Debug, Clone)]
struct PriorTest {
    id: String,
    /// Closed definition span; `None` when the definition carried no
    /// location at all.
    location: Option<Location>,
}

#[derive(Debug, Default)]
struct TestIndex {
    tests: Vec<PriorTest>,
    by_key: BTreeMap<(String, String), Vec<usize>>,
}

impl TestIndex {
    fn from_report(report: &IncrementalReport) -> Self {
        let mut index = Self::default();
        for (path, file) in &report.test_files {
            index.add_file(path, file);
        }
        index
    }

    fn add_file(&mut self, path: &str, file: &TestFileResult) {
        let lines = LineIndex::new(&file.source);
        let mut starts: Vec<Position> = file
            .tests
            .iter()
            .filter_map(|test| test.location.as_ref())
            .map(|location| location.start)
            .collect();
        starts.sort_unstable();
        starts.dedup();

        for definition in &file.tests {
            let location = definition
                .location
                .map(|open| close_location(open, &starts, &lines));
            let slot = self.tests.len();
            self.tests.push(PriorTest {
                id: definition.id.clone(),
                location,
            });
            self.by_key
                .entry((path.to_string(), definition.name.clone()))
                .or_default()
                .push(slot);
        }
    }
}

/// Close a possibly open-ended location at the next distinct test
/// start in the file, else end-of-file.
fn close_location(open: OpenEndLocation, starts: &[Position], lines: &LineIndex<'_>) -> Location {
    let end = match open.end {
        Some(end) => end,
        None => starts
            .iter()
            .copied()
            .find(|&start| start > open.start)
            .unwrap_or_else(|| lines.end_position()),
    };
    Location {
        start: open.start,
        end,
    }
}

/// Match of the current test set against a prior report: which current
/// tests exist unchanged, and which current id a prior test now has.
#[derive(Debug, Default)]
pub struct TestReconciliation {
    prior_by_current: BTreeMap<String, String>,
    current_by_prior: BTreeMap<String, String>,
}

impl TestReconciliation {
    /// True when the current test exists unchanged in the prior report.
    pub fn is_unchanged(&self, current_test_id: &str) -> bool {
        self.prior_by_current.contains_key(current_test_id)
    }

    /// Prior id of an unchanged current test.
    pub fn prior_id_for_current(&self, current_test_id: &str) -> Option<&str> {
        self.prior_by_current.get(current_test_id).map(String::as_str)
    }

    /// Current id of an unchanged prior test, when it still exists.
    pub fn current_id_for_prior(&self, prior_test_id: &str) -> Option<&str> {
        self.current_by_prior.get(prior_test_id).map(String::as_str)
    }
}

/// Reconcile the dry-run tests against the prior report's definitions.
///
/// A current test is unchanged when a prior test with the same
/// `(file, name)` exists and, if both sides carry positions, their
/// closed ranges match under [`ranges_match`]. Each prior instance is
/// claimed at most once, so generated twins pair off one to one.
pub fn reconcile_tests(
    report: &IncrementalReport,
    tests: &[TestResult],
    project: &Project,
) -> TestReconciliation {
    let index = TestIndex::from_report(report);
    let prior_lines: BTreeMap<&str, LineIndex<'_>> = report
        .test_files
        .iter()
        .map(|(path, file)| (path.as_str(), LineIndex::new(&file.source)))
        .collect();

    let mut current_lines: BTreeMap<&str, LineIndex<'_>> = BTreeMap::new();
    for test in tests {
        if let Some(file) = test.file_name.as_deref() {
            if !current_lines.contains_key(file) {
                if let Some(source) = project.source_for(file) {
                    current_lines.insert(file, LineIndex::new(source));
                }
            }
        }
    }
    let current_locations = current_test_locations(tests, &current_lines);

    let mut claimed = vec![false; index.tests.len()];
    let mut reconciliation = TestReconciliation::default();

    for (position, test) in tests.iter().enumerate() {
        let Some(file) = test.file_name.as_deref() else {
            continue;
        };
        let key = (file.to_string(), test.name.clone());
        let Some(slots) = index.by_key.get(&key) else {
            continue;
        };

        let matched = slots.iter().copied().find(|&slot| {
            if claimed[slot] {
                return false;
            }
            let prior = &index.tests[slot];
            let Some(prior_location) = prior.location else {
                // The prior definition carried no location: nothing to
                // range-compare, the name decides.
                return true;
            };
            if test.start_position.is_none() {
                // No position on the current side: the name decides.
                return true;
            }
            let (Some(prior_lines), Some(current_lines), Some(current_location)) = (
                prior_lines.get(file),
                current_lines.get(file),
                current_locations[position],
            ) else {
                return false;
            };
            ranges_match(prior_lines, prior_location, current_lines, current_location)
        });

        if let Some(slot) = matched {
            claimed[slot] = true;
            let prior = &index.tests[slot];
            reconciliation
                .prior_by_current
                .insert(test.id.clone(), prior.id.clone());
            reconciliation
                .current_by_prior
                .insert(prior.id.clone(), test.id.clone());
        }
    }

    reconciliation
}

/// Closed definition span for each current test that has a file, a
/// start position, and a readable current source. Closing mirrors the
/// prior side: next distinct current test start in the file, else EOF.
fn current_test_locations(
    tests: &[TestResult],
    current_lines: &BTreeMap<&str, LineIndex<'_>>,
) -> Vec<Option<Location>> {
    let mut starts_by_file: BTreeMap<&str, Vec<Position>> = BTreeMap::new();
    for test in tests {
        if let (Some(file), Some(start)) = (test.file_name.as_deref(), test.start_position) {
            starts_by_file.entry(file).or_default().push(start);
        }
    }
    for starts in starts_by_file.values_mut() {
        starts.sort_unstable();
        starts.dedup();
    }

    tests
        .iter()
        .map(|test| -> Option<Location> {
            let file = test.file_name.as_deref()?;
            let start = test.start_position?;
            let lines = current_lines.get(file)?;
            let starts = starts_by_file.get(file)?;
            Some(close_location(
                OpenEndLocation { start, end: None },
                starts,
                lines,
            ))
        })
        .collect()
}
