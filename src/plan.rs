//! Per-mutant execution plans produced by the planner.

use serde::{Deserialize, Serialize};

use crate::model::Mutant;

/// How a mutant is activated in the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutantActivation {
    /// Injected at load time; requires a fresh test environment and
    /// cannot be narrowed to a test filter.
    Static,
    /// Gated at runtime by the active-mutant identifier.
    Runtime,
}

/// Options handed to the test runner for one mutant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutantRunOptions {
    /// Ids of the tests to execute; `None` runs the full suite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_filter: Option<Vec<String>>,
    /// Where the mutated file lives inside the sandbox.
    pub sandbox_file_name: String,
    /// Hard deadline for the whole run.
    pub timeout_ms: u64,
    /// Keep running tests after the first failure.
    pub disable_bail: bool,
    /// Maximum allowed executions of the mutation point, used to cut
    /// infinite loops short. Absent when coverage is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_limit: Option<u64>,
    /// Activation mode for this mutant.
    pub activation: MutantActivation,
    /// Tear down and reload the test environment before the run.
    pub reload_environment: bool,
}

/// Plan record for one mutant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum MutantTestPlan {
    /// No test execution; the verdict is pre-assigned (ignored on
    /// input, classified as ignorable, or reused from a prior run).
    EarlyResult {
        /// The mutant carrying its final status.
        mutant: Mutant,
    },
    /// Execute tests against the mutant.
    Run {
        /// The mutant to activate.
        mutant: Mutant,
        /// Estimated test execution cost, summed from dry-run timings.
        net_time_ms: u64,
        /// Runner instructions.
        options: MutantRunOptions,
    },
}

impl MutantTestPlan {
    /// The mutant this plan is about.
    pub fn mutant(&self) -> &Mutant {
        match self {
            Self::EarlyResult { mutant } | Self::Run { mutant, .. } => mutant,
        }
    }

    /// True for plans that execute no tests.
    pub fn is_early_result(&self) -> bool {
        matches!(self, Self::EarlyResult { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;

    #[test]
    fn plan_records_select_by_tag() {
        let mutant = Mutant::new("1", "src/a.rs", "arith", "-", Location::new(1, 0, 1, 1));
        let early = MutantTestPlan::EarlyResult { mutant: mutant.clone() };
        let run = MutantTestPlan::Run {
            mutant,
            net_time_ms: 42,
            options: MutantRunOptions {
                test_filter: Some(vec!["spec1".to_string()]),
                sandbox_file_name: ".sandbox/src/a.rs".to_string(),
                timeout_ms: 5063,
                disable_bail: false,
                hit_limit: Some(600),
                activation: MutantActivation::Runtime,
                reload_environment: false,
            },
        };

        assert!(early.is_early_result());
        assert!(!run.is_early_result());
        assert_eq!(early.mutant().id, "1");
        assert_eq!(run.mutant().id, "1");

        let json = serde_json::to_value(&run).expect("plan should serialize");
        assert_eq!(json["plan"], "run");
        assert_eq!(json["options"]["activation"], "runtime");
    }
}
