//! Typed form of the incremental mutation-testing report.
//!
//! The report arrives already parsed from the canonical report schema;
//! these types are its in-memory carrier. Field naming follows the
//! schema (camelCase keys, PascalCase status strings), so a serialized
//! report deserializes directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Location, MutantStatus, Position};

/// Outcome of a previous mutation-testing run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalReport {
    /// Mutated source files keyed by path.
    #[serde(default)]
    pub files: BTreeMap<String, FileResult>,
    /// Test files keyed by path.
    #[serde(default)]
    pub test_files: BTreeMap<String, TestFileResult>,
}

/// One source file of the prior run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    /// Full source text as it was when the prior run executed.
    pub source: String,
    /// Mutants of this file with their verdicts, in report order.
    pub mutants: Vec<MutantResult>,
}

/// Verdict of one mutant from the prior run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutantResult {
    /// Prior-run identifier.
    pub id: String,
    /// Name of the mutator that produced the mutant.
    pub mutator_name: String,
    /// Replacement text; absent in reports from tools that only record
    /// a description.
    #[serde(default)]
    pub replacement: Option<String>,
    /// Span of the original code in the prior source.
    pub location: Location,
    /// Verdict reached by the prior run.
    pub status: MutantStatus,
    /// Reason accompanying the verdict.
    #[serde(default)]
    pub status_reason: Option<String>,
    /// Number of tests completed before the verdict.
    #[serde(default)]
    pub tests_completed: Option<u32>,
    /// Ids of prior tests covering the mutant.
    #[serde(default)]
    pub covered_by: Option<Vec<String>>,
    /// Ids of prior tests that killed the mutant, decisive one first.
    #[serde(default)]
    pub killed_by: Option<Vec<String>>,
}

/// One test file of the prior run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFileResult {
    /// Full test-file source text from the prior run.
    pub source: String,
    /// Test definitions found in this file.
    pub tests: Vec<TestDefinition>,
}

/// A test definition from the prior run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Prior-run test identifier.
    pub id: String,
    /// Full test name; opaque bytes, never parsed.
    pub name: String,
    /// Where the test is defined, possibly open-ended.
    #[serde(default)]
    pub location: Option<OpenEndLocation>,
}

/// A span whose end may be unknown. Open ends are closed against the
/// next test definition in the same file, or end-of-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenEndLocation {
    /// First covered position.
    pub start: Position,
    /// One past the last covered position, when known.
    #[serde(default)]
    pub end: Option<Position>,
}
