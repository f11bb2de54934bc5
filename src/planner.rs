//! Plan synthesis and the public planning facade.
//!
//! Orchestration order: incremental diff, coverage classification,
//! per-mutant synthesis, static-cost heuristic, reporter notification.
//! Planning is pure apart from log lines and the single reporter call;
//! plans come back in input-mutant order.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::coverage::TestCoverage;
use crate::incremental::IncrementalDiffer;
use crate::model::{DryRunResult, Mutant, MutantStatus};
use crate::plan::{MutantActivation, MutantRunOptions, MutantTestPlan};
use crate::project::Project;

/// Multiplier applied to a mutation point's total hit count to derive
/// its hit limit.
const HIT_LIMIT_FACTOR: u64 = 100;
/// Per-mutant cost ratio above which static mutants count as dominating.
const STATIC_COST_RATIO: f64 = 2.0;
/// Share of total estimated time above which static mutants trigger a
/// warning.
const STATIC_TIME_SHARE: f64 = 0.4;
/// Status reason attached when `ignore_static` skips a static mutant.
const IGNORE_STATIC_REASON: &str = "Static mutant (and \"ignoreStatic\" was enabled)";

/// Maps a project file onto its sandbox counterpart.
pub trait Sandbox {
    /// Sandbox path for `file_name`. Must be a pure function of its
    /// input; the planner may call it in any order.
    fn sandbox_file_for(&self, file_name: &str) -> String;
}

/// Payload of the plan-ready notification.
#[derive(Debug, Clone, Copy)]
pub struct MutationTestingPlanReadyEvent<'a> {
    /// All plans, in input-mutant order.
    pub mutant_plans: &'a [MutantTestPlan],
}

/// Receives planner lifecycle events.
pub trait Reporter {
    /// Called exactly once per successful planning run, after the full
    /// plan list is assembled and before the facade returns.
    fn on_mutation_testing_plan_ready(&self, event: MutationTestingPlanReadyEvent<'_>);
}

/// Planning failure. Normal input variability (unknown coverage test
/// ids, missing prior files, open-ended locations) is absorbed and
/// logged; only violations of the schema contract surface here.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A mutant's location violates the position contract.
    #[error("mutant {mutant_id} has an invalid location: {reason}")]
    InvalidLocation {
        /// Id of the offending mutant.
        mutant_id: String,
        /// What the location got wrong.
        reason: String,
    },
}

/// Synthesize one execution plan per mutant.
///
/// When the project carries an incremental report, prior verdicts are
/// reused where safe; classified mutants then become early results or
/// run plans per the coverage matrix and options. The reporter is
/// notified exactly once, after the full list is assembled; on error
/// it is not notified at all.
pub fn plan_mutant_tests(
    mutants: Vec<Mutant>,
    dry_run: &DryRunResult,
    project: &Project,
    sandbox: &dyn Sandbox,
    reporter: &dyn Reporter,
    config: &PlannerConfig,
) -> Result<Vec<MutantTestPlan>, PlanError> {
    for mutant in &mutants {
        validate_location(mutant)?;
    }

    let coverage = TestCoverage::from_dry_run(dry_run);
    let mutants = match project.incremental_report() {
        Some(report) => {
            let covering = covering_tests_by_mutant(&mutants, &coverage);
            IncrementalDiffer::new(report, project, &dry_run.tests).diff(mutants, &covering)
        }
        None => mutants,
    };

    let plans: Vec<MutantTestPlan> = mutants
        .into_iter()
        .map(|mutant| plan_mutant(mutant, &coverage, sandbox, config))
        .collect();

    if let Some(warning) = evaluate_static_warning(&plans, config) {
        warn!(
            "Detected {} static mutants ({}% of total) that are estimated to take {}% of the time \
             running the tests! (disable \"warnings.slow\" to ignore this warning)",
            warning.static_mutants,
            (warning.share_of_mutants * 100.0).round(),
            (warning.share_of_time * 100.0).round(),
        );
    }

    let early_results = plans.iter().filter(|plan| plan.is_early_result()).count();
    debug!(
        total = plans.len(),
        early_results,
        run_plans = plans.len() - early_results,
        "mutant test plans ready"
    );

    reporter.on_mutation_testing_plan_ready(MutationTestingPlanReadyEvent {
        mutant_plans: &plans,
    });
    Ok(plans)
}

fn validate_location(mutant: &Mutant) -> Result<(), PlanError> {
    let location = mutant.location;
    if location.start.line == 0 || location.end.line == 0 {
        return Err(PlanError::InvalidLocation {
            mutant_id: mutant.id.clone(),
            reason: "line numbers are 1-based".to_string(),
        });
    }
    if location.end < location.start {
        return Err(PlanError::InvalidLocation {
            mutant_id: mutant.id.clone(),
            reason: "end precedes start".to_string(),
        });
    }
    Ok(())
}

/// Test dependencies per mutant for the incremental differ: the
/// covering set when per-test coverage pinpoints one, otherwise every
/// dry-run test (the matrix cannot narrow it down, so any test change
/// must block reuse).
fn covering_tests_by_mutant(
    mutants: &[Mutant],
    coverage: &TestCoverage,
) -> BTreeMap<String, Vec<String>> {
    mutants
        .iter()
        .map(|mutant| {
            let covering = coverage.covering_tests(&mutant.id);
            let tests = if coverage.has_matrix() && !covering.is_empty() {
                covering
            } else {
                coverage.test_ids().to_vec()
            };
            (mutant.id.clone(), tests)
        })
        .collect()
}

fn plan_mutant(
    mutant: Mutant,
    coverage: &TestCoverage,
    sandbox: &dyn Sandbox,
    config: &PlannerConfig,
) -> MutantTestPlan {
    // A pre-assigned verdict (ignored on input, or reused by the
    // differ) needs no test execution.
    if mutant.status.is_some() {
        return early_result(mutant, coverage);
    }

    if !coverage.has_matrix() {
        // Coverage unknown: run the full suite, no hit limit.
        return run_plan(
            mutant,
            RunShape {
                test_filter: None,
                hit_limit: None,
                activation: MutantActivation::Runtime,
                net_time_ms: coverage.total_time_ms(),
            },
            sandbox,
            config,
        );
    }

    let mut mutant = mutant;
    let is_static = coverage.has_static_coverage(&mutant.id);
    let covering = coverage.covering_tests(&mutant.id);
    let hit_limit = Some(HIT_LIMIT_FACTOR * coverage.total_hits(&mutant.id));
    mutant.is_static = Some(is_static);

    if is_static && covering.is_empty() && config.ignore_static {
        mutant.status = Some(MutantStatus::Ignored);
        mutant.status_reason = Some(IGNORE_STATIC_REASON.to_string());
        mutant.covered_by = Some(Vec::new());
        return MutantTestPlan::EarlyResult { mutant };
    }

    if is_static && !config.ignore_static {
        // Static (or hybrid) activation: full suite, fresh environment.
        let net_time_ms = coverage.total_time_ms();
        mutant.covered_by = Some(covering);
        return run_plan(
            mutant,
            RunShape {
                test_filter: None,
                hit_limit,
                activation: MutantActivation::Static,
                net_time_ms,
            },
            sandbox,
            config,
        );
    }

    // Per-test activation. Hybrid mutants land here when static
    // activation is ignored; uncovered mutants get an empty filter.
    let net_time_ms = coverage.time_for_tests(&covering);
    mutant.covered_by = Some(covering.clone());
    run_plan(
        mutant,
        RunShape {
            test_filter: Some(covering),
            hit_limit,
            activation: MutantActivation::Runtime,
            net_time_ms,
        },
        sandbox,
        config,
    )
}

fn early_result(mut mutant: Mutant, coverage: &TestCoverage) -> MutantTestPlan {
    if coverage.has_matrix() {
        mutant.is_static = Some(coverage.has_static_coverage(&mutant.id));
    }
    MutantTestPlan::EarlyResult { mutant }
}

struct RunShape {
    test_filter: Option<Vec<String>>,
    hit_limit: Option<u64>,
    activation: MutantActivation,
    net_time_ms: u64,
}

fn run_plan(
    mutant: Mutant,
    shape: RunShape,
    sandbox: &dyn Sandbox,
    config: &PlannerConfig,
) -> MutantTestPlan {
    let sandbox_file_name = sandbox.sandbox_file_for(&mutant.file_name);
    let options = MutantRunOptions {
        test_filter: shape.test_filter,
        sandbox_file_name,
        timeout_ms: timeout_for(shape.net_time_ms, config),
        disable_bail: config.disable_bail,
        hit_limit: shape.hit_limit,
        activation: shape.activation,
        reload_environment: shape.activation == MutantActivation::Static,
    };
    MutantTestPlan::Run {
        mutant,
        net_time_ms: shape.net_time_ms,
        options,
    }
}

/// `base + factor × net + overhead`, rounded to the nearest millisecond.
fn timeout_for(net_time_ms: u64, config: &PlannerConfig) -> u64 {
    config.timeout_ms
        + (config.timeout_factor * net_time_ms as f64).round() as u64
        + config.time_overhead_ms
}

/// Triggered static-mutant cost warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticWarning {
    /// Number of mutants planned with static activation.
    pub static_mutants: usize,
    /// Number of mutants planned in total.
    pub total_mutants: usize,
    /// Static mutants as a fraction of all mutants.
    pub share_of_mutants: f64,
    /// Static net time as a fraction of all planned net time.
    pub share_of_time: f64,
}

/// Decide whether static mutants dominate the estimated execution
/// time: their average net time exceeds twice that of the other run
/// plans, and they account for more than 40% of the planned total.
/// Early results carry no cost and stay out of both sides.
pub fn evaluate_static_warning(
    plans: &[MutantTestPlan],
    config: &PlannerConfig,
) -> Option<StaticWarning> {
    if config.ignore_static || !config.warn_slow {
        return None;
    }

    let mut static_count = 0usize;
    let mut static_time = 0u64;
    let mut other_count = 0usize;
    let mut other_time = 0u64;
    for plan in plans {
        if let MutantTestPlan::Run {
            net_time_ms,
            options,
            ..
        } = plan
        {
            match options.activation {
                MutantActivation::Static => {
                    static_count += 1;
                    static_time += *net_time_ms;
                }
                MutantActivation::Runtime => {
                    other_count += 1;
                    other_time += *net_time_ms;
                }
            }
        }
    }
    if static_count == 0 {
        return None;
    }

    let average_static = static_time as f64 / static_count as f64;
    let average_other = other_time as f64 / other_count as f64;
    let share_of_time = static_time as f64 / (static_time + other_time) as f64;

    (STATIC_COST_RATIO * average_static > average_other && share_of_time > STATIC_TIME_SHARE)
        .then_some(StaticWarning {
            static_mutants: static_count,
            total_mutants: plans.len(),
            share_of_mutants: static_count as f64 / plans.len() as f64,
            share_of_time,
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::{Location, MutantCoverage, TestResult};

    struct DotSandbox;

    impl Sandbox for DotSandbox {
        fn sandbox_file_for(&self, file_name: &str) -> String {
            format!(".sandbox/{file_name}")
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        calls: Mutex<Vec<usize>>,
    }

    impl RecordingReporter {
        fn plan_counts(&self) -> Vec<usize> {
            self.calls.lock().expect("reporter mutex should lock").clone()
        }
    }

    impl Reporter for RecordingReporter {
        fn on_mutation_testing_plan_ready(&self, event: MutationTestingPlanReadyEvent<'_>) {
            self.calls
                .lock()
                .expect("reporter mutex should lock")
                .push(event.mutant_plans.len());
        }
    }

    fn mutant(id: &str) -> Mutant {
        Mutant::new(id, "src/app.js", "arith", "-", Location::new(1, 0, 1, 1))
    }

    fn test_result(id: &str, time_spent_ms: u64) -> TestResult {
        TestResult {
            id: id.to_string(),
            name: id.to_string(),
            file_name: None,
            time_spent_ms,
            start_position: None,
        }
    }

    fn run_options(plan: &MutantTestPlan) -> &MutantRunOptions {
        match plan {
            MutantTestPlan::Run { options, .. } => options,
            MutantTestPlan::EarlyResult { .. } => panic!("expected a run plan, got {plan:?}"),
        }
    }

    #[test]
    fn timeout_arithmetic_applies_base_factor_and_overhead() {
        let config = PlannerConfig::default()
            .with_timeout_ms(100)
            .with_timeout_factor(1.5)
            .with_time_overhead_ms(7);
        assert_eq!(timeout_for(0, &config), 107);
        assert_eq!(timeout_for(42, &config), 100 + 63 + 7);
    }

    #[test]
    fn reporter_is_notified_exactly_once_with_full_plan_list() {
        let dry_run = DryRunResult {
            tests: vec![test_result("spec1", 10)],
            mutant_coverage: None,
        };
        let reporter = RecordingReporter::default();

        let plans = plan_mutant_tests(
            vec![mutant("1"), mutant("2")],
            &dry_run,
            &Project::new(),
            &DotSandbox,
            &reporter,
            &PlannerConfig::default(),
        )
        .expect("planning should succeed");

        assert_eq!(plans.len(), 2);
        assert_eq!(reporter.plan_counts(), vec![2]);
    }

    #[test]
    fn invalid_location_fails_without_notifying_the_reporter() {
        let dry_run = DryRunResult::default();
        let reporter = RecordingReporter::default();

        let mut bad = mutant("1");
        bad.location = Location::new(0, 0, 1, 1);
        let err = plan_mutant_tests(
            vec![bad],
            &dry_run,
            &Project::new(),
            &DotSandbox,
            &reporter,
            &PlannerConfig::default(),
        )
        .expect_err("zero line should be rejected");

        assert!(matches!(err, PlanError::InvalidLocation { ref mutant_id, .. } if mutant_id == "1"));
        assert!(reporter.plan_counts().is_empty());

        let mut reversed = mutant("2");
        reversed.location = Location::new(2, 0, 1, 0);
        let err = plan_mutant_tests(
            vec![reversed],
            &dry_run,
            &Project::new(),
            &DotSandbox,
            &reporter,
            &PlannerConfig::default(),
        )
        .expect_err("reversed range should be rejected");
        assert!(matches!(err, PlanError::InvalidLocation { .. }));
    }

    #[test]
    fn missing_coverage_matrix_plans_full_suite_without_hit_limit() {
        let dry_run = DryRunResult {
            tests: vec![test_result("spec1", 10), test_result("spec2", 5)],
            mutant_coverage: None,
        };
        let reporter = RecordingReporter::default();

        let plans = plan_mutant_tests(
            vec![mutant("1")],
            &dry_run,
            &Project::new(),
            &DotSandbox,
            &reporter,
            &PlannerConfig::default(),
        )
        .expect("planning should succeed");

        let options = run_options(&plans[0]);
        assert_eq!(options.test_filter, None);
        assert_eq!(options.hit_limit, None);
        assert_eq!(options.activation, MutantActivation::Runtime);
        assert!(!options.reload_environment);
        assert_eq!(options.sandbox_file_name, ".sandbox/src/app.js");
        assert_eq!(plans[0].mutant().is_static, None);
        match &plans[0] {
            MutantTestPlan::Run { net_time_ms, .. } => assert_eq!(*net_time_ms, 15),
            other => panic!("expected a run plan, got {other:?}"),
        }
    }

    #[test]
    fn uncovered_mutant_under_per_test_matrix_gets_empty_filter() {
        let dry_run = DryRunResult {
            tests: vec![test_result("spec1", 10)],
            mutant_coverage: Some(MutantCoverage {
                static_coverage: Some(Default::default()),
                per_test: Default::default(),
            }),
        };
        let reporter = RecordingReporter::default();

        let plans = plan_mutant_tests(
            vec![mutant("1")],
            &dry_run,
            &Project::new(),
            &DotSandbox,
            &reporter,
            &PlannerConfig::default(),
        )
        .expect("planning should succeed");

        let options = run_options(&plans[0]);
        assert_eq!(options.test_filter.as_deref(), Some(&[][..]));
        assert_eq!(options.hit_limit, Some(0));
        assert_eq!(plans[0].mutant().is_static, Some(false));
        assert_eq!(plans[0].mutant().covered_by.as_deref(), Some(&[][..]));
    }

    #[test]
    fn static_warning_requires_both_thresholds() {
        let config = PlannerConfig::default();
        let static_plan = |net: u64| {
            run_plan(
                mutant("s"),
                RunShape {
                    test_filter: None,
                    hit_limit: Some(100),
                    activation: MutantActivation::Static,
                    net_time_ms: net,
                },
                &DotSandbox,
                &config,
            )
        };
        let runtime_plan = |net: u64| {
            run_plan(
                mutant("r"),
                RunShape {
                    test_filter: Some(vec!["spec1".to_string()]),
                    hit_limit: Some(100),
                    activation: MutantActivation::Runtime,
                    net_time_ms: net,
                },
                &DotSandbox,
                &config,
            )
        };

        // one static at 100ms vs two runtime at 10ms: dominates both ways
        let plans = vec![static_plan(100), runtime_plan(10), runtime_plan(10)];
        let warning = evaluate_static_warning(&plans, &config).expect("warning should trigger");
        assert_eq!(warning.static_mutants, 1);
        assert_eq!(warning.total_mutants, 3);
        assert!((warning.share_of_time - 100.0 / 120.0).abs() < 1e-9);

        // heavy runtime side keeps the share below 40%
        let plans = vec![static_plan(10), runtime_plan(20), runtime_plan(20)];
        assert_eq!(evaluate_static_warning(&plans, &config), None);

        // share above 40% but average static cost below 2x the runtime average
        let plans = vec![static_plan(20), static_plan(20), static_plan(20), runtime_plan(45)];
        assert_eq!(evaluate_static_warning(&plans, &config), None);

        // suppressed by configuration
        let plans = vec![static_plan(100), runtime_plan(10)];
        assert_eq!(
            evaluate_static_warning(&plans, &PlannerConfig::default().with_warn_slow(false)),
            None
        );
        assert_eq!(
            evaluate_static_warning(&plans, &PlannerConfig::default().with_ignore_static(true)),
            None
        );
    }

    #[test]
    fn no_static_plans_means_no_warning() {
        let config = PlannerConfig::default();
        let plans = vec![run_plan(
            mutant("r"),
            RunShape {
                test_filter: None,
                hit_limit: None,
                activation: MutantActivation::Runtime,
                net_time_ms: 10,
            },
            &DotSandbox,
            &config,
        )];
        assert_eq!(evaluate_static_warning(&plans, &config), None);
    }
}
