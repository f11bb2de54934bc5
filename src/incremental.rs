//! Reuse of prior verdicts for mutants the previous run already judged.
//!
//! A verdict carries over only when the mutant is textually the same
//! (same file, mutator, replacement, and covered bytes) and every test
//! it depends on is provably unchanged. Anything less falls back to
//! re-execution; the differ never guesses.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::{Mutant, MutantStatus, TestResult};
use crate::project::Project;
use crate::schema::{FileResult, IncrementalReport, MutantResult};
use crate::source_span::{ranges_match, LineIndex};
use crate::test_index::{reconcile_tests, TestReconciliation};

/// Reconciles current mutants against a prior run's report.
pub struct IncrementalDiffer<'a> {
    report: &'a IncrementalReport,
    project: &'a Project,
    reconciliation: TestReconciliation,
}

struct FileContext<'a> {
    file: &'a FileResult,
    prior_lines: LineIndex<'a>,
    current_lines: LineIndex<'a>,
}

impl<'a> IncrementalDiffer<'a> {
    /// Prepare a differ: reconciles the dry-run tests against the
    /// prior report's test definitions up front.
    pub fn new(report: &'a IncrementalReport, project: &'a Project, tests: &[TestResult]) -> Self {
        Self {
            report,
            project,
            reconciliation: reconcile_tests(report, tests, project),
        }
    }

    /// Rewrite each current mutant with its prior verdict when safe to
    /// do so; every other mutant passes through untouched. Input order
    /// is preserved and inputs are never modified in place.
    pub fn diff(
        &self,
        mutants: Vec<Mutant>,
        covering_tests: &BTreeMap<String, Vec<String>>,
    ) -> Vec<Mutant> {
        let total = mutants.len();
        let mut reused = 0usize;
        let mut contexts: BTreeMap<String, Option<FileContext<'a>>> = BTreeMap::new();
        let empty = Vec::new();

        let result: Vec<Mutant> = mutants
            .into_iter()
            .map(|mutant| {
                // Mutants arriving with a verdict (e.g. ignored by the
                // generator) keep it.
                if mutant.status.is_some() {
                    return mutant;
                }
                let context = contexts
                    .entry(mutant.file_name.clone())
                    .or_insert_with(|| self.file_context(&mutant.file_name));
                let Some(context) = context else {
                    return mutant;
                };
                let covering = covering_tests.get(&mutant.id).unwrap_or(&empty);
                match self.try_reuse(&mutant, covering, context) {
                    Some(merged) => {
                        reused += 1;
                        merged
                    }
                    None => mutant,
                }
            })
            .collect();

        debug!(reused, total, "reused prior verdicts");
        result
    }

    fn file_context(&self, path: &str) -> Option<FileContext<'a>> {
        let file = self.report.files.get(path)?;
        let current_source = self.project.source_for(path)?;
        Some(FileContext {
            file,
            prior_lines: LineIndex::new(&file.source),
            current_lines: LineIndex::new(current_source),
        })
    }

    fn try_reuse(
        &self,
        mutant: &Mutant,
        covering: &[String],
        context: &FileContext<'a>,
    ) -> Option<Mutant> {
        let prior = context.file.mutants.iter().find(|prior| {
            prior.mutator_name == mutant.mutator_name
                && prior.replacement.as_deref() == Some(mutant.replacement.as_str())
                && ranges_match(
                    &context.prior_lines,
                    prior.location,
                    &context.current_lines,
                    mutant.location,
                )
        })?;

        // Every covering test must exist unchanged in the prior run: a
        // new or edited test could flip the verdict either way.
        if covering
            .iter()
            .any(|test_id| !self.reconciliation.is_unchanged(test_id))
        {
            return None;
        }
        if prior.status == MutantStatus::Killed {
            // The decisive test must still be around, unchanged.
            let killer = prior.killed_by.as_deref()?.first()?;
            self.reconciliation.current_id_for_prior(killer)?;
        } else {
            // A non-killed verdict only stands while no test newly
            // covers the mutant: every current covering test must
            // already be in the prior covering set. Removals are fine.
            let prior_covered: BTreeSet<&str> = prior
                .covered_by
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(String::as_str)
                .collect();
            for test_id in covering {
                let prior_id = self.reconciliation.prior_id_for_current(test_id)?;
                if !prior_covered.contains(prior_id) {
                    return None;
                }
            }
        }

        Some(self.merge(mutant, prior))
    }

    /// Merge the prior verdict into a fresh record, preserving the
    /// current mutant's identity, file, replacement, and location.
    fn merge(&self, mutant: &Mutant, prior: &MutantResult) -> Mutant {
        let mut merged = mutant.clone();
        merged.status = Some(prior.status);
        merged.status_reason = prior.status_reason.clone();
        merged.tests_completed = prior.tests_completed;
        merged.covered_by = prior
            .covered_by
            .as_deref()
            .map(|ids| self.to_current_ids(ids));
        merged.killed_by = prior
            .killed_by
            .as_deref()
            .map(|ids| self.to_current_ids(ids));
        merged
    }

    /// Translate prior test ids into their current counterparts,
    /// dropping tests that no longer exist.
    fn to_current_ids(&self, prior_ids: &[String]) -> Vec<String> {
        prior_ids
            .iter()
            .filter_map(|id| self.reconciliation.current_id_for_prior(id))
            .map(str::to_owned)
            .collect()
    }
}
