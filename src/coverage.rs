//! Projection of the dry run into the coverage queries planning needs.

use std::collections::BTreeMap;

use tracing::warn;

use crate::model::DryRunResult;

/// Read-optimized view of the dry-run result: test timings plus the
/// coverage matrix, validated against the dry-run test list.
///
/// Coverage entries for tests that never ran are discarded with a
/// warning; they would otherwise leak phantom test ids into plans.
#[derive(Debug)]
pub struct TestCoverage {
    has_matrix: bool,
    static_hits: BTreeMap<String, u64>,
    hits_per_test: BTreeMap<String, BTreeMap<String, u64>>,
    test_order: Vec<String>,
    time_by_test: BTreeMap<String, u64>,
    total_time_ms: u64,
    unknown_test_ids: Vec<String>,
}

impl TestCoverage {
    /// Build the projection, logging a warning for every coverage
    /// entry that references a test absent from the dry run.
    pub fn from_dry_run(dry_run: &DryRunResult) -> Self {
        let test_order: Vec<String> = dry_run.tests.iter().map(|test| test.id.clone()).collect();
        let time_by_test: BTreeMap<String, u64> = dry_run
            .tests
            .iter()
            .map(|test| (test.id.clone(), test.time_spent_ms))
            .collect();
        let total_time_ms = dry_run.tests.iter().map(|test| test.time_spent_ms).sum();

        let mut has_matrix = false;
        let mut static_hits = BTreeMap::new();
        let mut hits_per_test = BTreeMap::new();
        let mut unknown_test_ids = Vec::new();

        if let Some(coverage) = &dry_run.mutant_coverage {
            has_matrix = true;
            static_hits = coverage.static_coverage.clone().unwrap_or_default();
            for (test_id, hits) in &coverage.per_test {
                if time_by_test.contains_key(test_id) {
                    hits_per_test.insert(test_id.clone(), hits.clone());
                } else {
                    warn!(
                        "Found test with id \"{test_id}\" in coverage data, but not in the test \
                         results of the dry run. Not taking coverage data for this test into account."
                    );
                    unknown_test_ids.push(test_id.clone());
                }
            }
        }

        Self {
            has_matrix,
            static_hits,
            hits_per_test,
            test_order,
            time_by_test,
            total_time_ms,
            unknown_test_ids,
        }
    }

    /// Whether any coverage matrix was collected.
    pub fn has_matrix(&self) -> bool {
        self.has_matrix
    }

    /// Whether the mutation point was hit outside any test.
    pub fn has_static_coverage(&self, mutant_id: &str) -> bool {
        self.static_hits.get(mutant_id).copied().unwrap_or(0) > 0
    }

    /// Ids of the tests that hit the mutation point, in dry-run order.
    pub fn covering_tests(&self, mutant_id: &str) -> Vec<String> {
        self.test_order
            .iter()
            .filter(|test_id| {
                self.hits_per_test
                    .get(*test_id)
                    .and_then(|hits| hits.get(mutant_id))
                    .copied()
                    .unwrap_or(0)
                    > 0
            })
            .cloned()
            .collect()
    }

    /// Total hits of the mutation point: static plus every test.
    pub fn total_hits(&self, mutant_id: &str) -> u64 {
        let static_hits = self.static_hits.get(mutant_id).copied().unwrap_or(0);
        let test_hits: u64 = self
            .hits_per_test
            .values()
            .filter_map(|hits| hits.get(mutant_id))
            .sum();
        static_hits + test_hits
    }

    /// Summed dry-run time of the given tests.
    pub fn time_for_tests(&self, test_ids: &[String]) -> u64 {
        test_ids
            .iter()
            .filter_map(|test_id| self.time_by_test.get(test_id))
            .sum()
    }

    /// Summed dry-run time of the whole suite.
    pub fn total_time_ms(&self) -> u64 {
        self.total_time_ms
    }

    /// Ids of all dry-run tests, in execution order.
    pub fn test_ids(&self) -> &[String] {
        &self.test_order
    }

    /// Coverage-matrix test ids that were discarded because the dry
    /// run never ran them.
    pub fn unknown_test_ids(&self) -> &[String] {
        &self.unknown_test_ids
    }
}
