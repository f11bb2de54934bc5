//! In-memory view of the project under test.

use std::collections::BTreeMap;

use crate::schema::IncrementalReport;

/// Current source texts by path, plus the optional report of a
/// previous mutation-testing run. The planner only ever reads from it.
#[derive(Debug, Clone, Default)]
pub struct Project {
    sources: BTreeMap<String, String>,
    incremental_report: Option<IncrementalReport>,
}

impl Project {
    /// An empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the current text of one file (source or test file).
    pub fn with_source(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.insert(path.into(), text.into());
        self
    }

    /// Attach the report of a previous run, enabling incremental reuse.
    pub fn with_incremental_report(mut self, report: IncrementalReport) -> Self {
        self.incremental_report = Some(report);
        self
    }

    /// Current text of `path`, when provided.
    pub fn source_for(&self, path: &str) -> Option<&str> {
        self.sources.get(path).map(String::as_str)
    }

    /// The attached prior-run report, if any.
    pub fn incremental_report(&self) -> Option<&IncrementalReport> {
        self.incremental_report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_looked_up_by_exact_path() {
        let project = Project::new().with_source("src/add.js", "a + b\n");
        assert_eq!(project.source_for("src/add.js"), Some("a + b\n"));
        assert_eq!(project.source_for("src/sub.js"), None);
        assert!(project.incremental_report().is_none());
    }
}
