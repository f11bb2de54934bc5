//! Plan overview rendering.

use serde::Serialize;

use crate::model::MutantStatus;
use crate::plan::{MutantActivation, MutantTestPlan};

/// Supported output formats for plan overviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewFormat {
    /// Markdown summary.
    Markdown,
    /// JSON summary.
    Json,
}

/// Aggregate view of a plan list, for operators and CI logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanOverview {
    /// Number of mutants planned.
    pub total: usize,
    /// Plans that execute no tests.
    pub early_results: usize,
    /// Early results with an `Ignored` verdict.
    pub ignored: usize,
    /// Early results carrying a verdict reused from a prior run.
    pub reused: usize,
    /// Run plans with static activation.
    pub static_runs: usize,
    /// Run plans with runtime activation.
    pub runtime_runs: usize,
    /// Summed estimated net time across all run plans.
    pub total_net_time_ms: u64,
    /// Largest single-plan timeout.
    pub max_timeout_ms: u64,
}

/// Aggregate a plan list into an overview.
pub fn build_overview(plans: &[MutantTestPlan]) -> PlanOverview {
    let mut overview = PlanOverview {
        total: plans.len(),
        early_results: 0,
        ignored: 0,
        reused: 0,
        static_runs: 0,
        runtime_runs: 0,
        total_net_time_ms: 0,
        max_timeout_ms: 0,
    };

    for plan in plans {
        match plan {
            MutantTestPlan::EarlyResult { mutant } => {
                overview.early_results += 1;
                match mutant.status {
                    Some(MutantStatus::Ignored) => overview.ignored += 1,
                    Some(_) => overview.reused += 1,
                    None => {}
                }
            }
            MutantTestPlan::Run {
                net_time_ms,
                options,
                ..
            } => {
                match options.activation {
                    MutantActivation::Static => overview.static_runs += 1,
                    MutantActivation::Runtime => overview.runtime_runs += 1,
                }
                overview.total_net_time_ms += net_time_ms;
                overview.max_timeout_ms = overview.max_timeout_ms.max(options.timeout_ms);
            }
        }
    }
    overview
}

/// Render a plan list in the requested format.
pub fn render_overview(plans: &[MutantTestPlan], format: OverviewFormat) -> String {
    let overview = build_overview(plans);
    match format {
        OverviewFormat::Json => {
            serde_json::to_string_pretty(&overview).expect("plan overview should serialize")
        }
        OverviewFormat::Markdown => {
            let mut out = String::new();
            out.push_str("# mutant test plan\n\n");
            out.push_str("| kind | count |\n");
            out.push_str("|---|---|\n");
            out.push_str(&format!("| total | {} |\n", overview.total));
            out.push_str(&format!("| early results | {} |\n", overview.early_results));
            out.push_str(&format!("| ignored | {} |\n", overview.ignored));
            out.push_str(&format!("| reused | {} |\n", overview.reused));
            out.push_str(&format!("| static runs | {} |\n", overview.static_runs));
            out.push_str(&format!("| runtime runs | {} |\n", overview.runtime_runs));
            out.push_str(&format!(
                "\nestimated net time: {} ms, largest timeout: {} ms\n",
                overview.total_net_time_ms, overview.max_timeout_ms
            ));
            out
        }
    }
}
