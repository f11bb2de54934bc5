//! # mutation-planner
//!
//! Planning core of a mutation-testing orchestrator. Given candidate
//! mutants, a dry run of the test suite (per-test timings plus a
//! coverage matrix), and optionally the report of a previous run, the
//! planner produces one execution plan per mutant: an early result for
//! mutants that need no test execution, or a run plan carrying the
//! test filter, activation mode, timeout, and hit limit.
//!
//! Planning is pure and synchronous: no I/O beyond the source texts
//! the caller provides, no mutation of inputs, and deterministic
//! output for identical inputs. Executing tests, mutating source, and
//! report I/O belong to the surrounding orchestrator.

#![warn(missing_docs)]

pub mod config;
pub mod coverage;
pub mod incremental;
pub mod model;
pub mod plan;
pub mod planner;
pub mod project;
pub mod report;
pub mod schema;
pub mod source_span;
pub mod test_index;

pub use config::PlannerConfig;
pub use model::{
    DryRunResult, Location, Mutant, MutantCoverage, MutantStatus, Position, TestResult,
};
pub use plan::{MutantActivation, MutantRunOptions, MutantTestPlan};
pub use planner::{
    plan_mutant_tests, MutationTestingPlanReadyEvent, PlanError, Reporter, Sandbox,
};
pub use project::Project;
pub use report::{build_overview, render_overview, OverviewFormat, PlanOverview};
pub use schema::IncrementalReport;
pub use source_span::{ranges_match, LineIndex};
