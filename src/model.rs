//! Core data model shared across the planning pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A point in a source text. Lines are 1-based; columns are 0-based
/// byte offsets within the line, so column 0 is the first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 0-based column within the line.
    pub column: u32,
}

impl Position {
    /// Construct a position from line and column.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A half-open span in a source text; `end` points one past the last
/// covered character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// First covered position.
    pub start: Position,
    /// One past the last covered position.
    pub end: Position,
}

impl Location {
    /// Construct a location from `(start line, start col, end line, end col)`.
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }
}

/// Terminal verdict of a mutant. Any of these may be reused from a
/// previous run by the incremental differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutantStatus {
    /// At least one test failed while the mutant was active.
    Killed,
    /// All covering tests passed.
    Survived,
    /// Test execution exceeded its timeout.
    Timeout,
    /// No test covers the mutated code.
    NoCoverage,
    /// The mutated code did not compile.
    CompileError,
    /// The test environment broke while the mutant was active.
    RuntimeError,
    /// The mutant was excluded from execution.
    Ignored,
}

/// A candidate program modification scheduled for testing.
///
/// The incrementally-reused fields (`status` and onward) are empty on
/// freshly generated mutants; the differ fills them in when a prior
/// verdict is safe to carry over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutant {
    /// Stable identifier, also the key into the coverage matrix.
    pub id: String,
    /// Path of the mutated source file.
    pub file_name: String,
    /// Name of the mutator that produced this mutant.
    pub mutator_name: String,
    /// Replacement text injected at `location`.
    pub replacement: String,
    /// Span of the original code being replaced.
    pub location: Location,
    /// Pre-assigned or reused verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MutantStatus>,
    /// Human-readable reason accompanying `status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    /// Number of tests completed in the run that produced `status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_completed: Option<u32>,
    /// Ids of tests covering this mutant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered_by: Option<Vec<String>>,
    /// Ids of tests that killed this mutant; the first entry is the
    /// decisive one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killed_by: Option<Vec<String>>,
    /// Whether the mutant is executed outside any test (module load).
    /// `None` when no coverage matrix was available.
    #[serde(default, rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
}

impl Mutant {
    /// A bare mutant with none of the reused fields set.
    pub fn new(
        id: impl Into<String>,
        file_name: impl Into<String>,
        mutator_name: impl Into<String>,
        replacement: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            mutator_name: mutator_name.into(),
            replacement: replacement.into(),
            location,
            status: None,
            status_reason: None,
            tests_completed: None,
            covered_by: None,
            killed_by: None,
            is_static: None,
        }
    }
}

/// One test observed during the dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Stable identifier, also the key into the per-test coverage map.
    pub id: String,
    /// Full test name as reported by the test framework.
    pub name: String,
    /// Path of the file defining the test, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Wall-clock time the test took during the dry run.
    pub time_spent_ms: u64,
    /// Position where the test is defined, when known. Used to tell
    /// generated tests sharing a name apart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_position: Option<Position>,
}

/// Coverage matrix collected during the dry run.
///
/// `static_coverage` counts hits accumulated outside any test (during
/// module load); `per_test` counts hits per test per mutation point.
/// The static half may be absent when the instrumentation could not
/// distinguish load-time execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutantCoverage {
    /// Hits per mutation point outside any test.
    #[serde(default, rename = "static", skip_serializing_if = "Option::is_none")]
    pub static_coverage: Option<BTreeMap<String, u64>>,
    /// Hits per mutation point within each test, keyed by test id.
    #[serde(default)]
    pub per_test: BTreeMap<String, BTreeMap<String, u64>>,
}

/// Outcome of the dry run: ordered test results plus the optional
/// coverage matrix. A missing matrix means coverage is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResult {
    /// Tests in execution order.
    pub tests: Vec<TestResult>,
    /// Coverage matrix, when the runner could collect one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutant_coverage: Option<MutantCoverage>,
}
