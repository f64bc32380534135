//! Issue aggregation and reporting.

use std::collections::BTreeMap;

use crew_catalog::{Issue, IssueKind, IssueSeverity};

/// Aggregated view over every issue a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub has_errors: bool,
    pub error_count: usize,
    pub warning_count: usize,
    /// Human-readable report, grouped by severity and kind.
    pub report: String,
}

impl ReportSummary {
    /// The process exit code this summary maps to. This is the single place
    /// that decision is made; fatal conditions exit before a summary exists.
    pub fn exit_code(&self) -> u8 {
        if self.has_errors {
            1
        } else {
            0
        }
    }
}

/// Classifies what upstream components already raised or warned about.
/// Never raises errors of its own.
pub struct ValidationReporter;

impl ValidationReporter {
    /// Group issues by severity and kind and render the summary.
    pub fn summarize(issues: &[Issue]) -> ReportSummary {
        let error_count = issues.iter().filter(|i| i.is_error()).count();
        let warning_count = issues.len() - error_count;

        let mut report = String::new();
        if issues.is_empty() {
            report.push_str("no issues");
        } else {
            Self::render_group(&mut report, issues, IssueSeverity::Error, "errors", error_count);
            Self::render_group(
                &mut report,
                issues,
                IssueSeverity::Warning,
                "warnings",
                warning_count,
            );
        }

        ReportSummary {
            has_errors: error_count > 0,
            error_count,
            warning_count,
            report: report.trim_end().to_string(),
        }
    }

    fn render_group(
        out: &mut String,
        issues: &[Issue],
        severity: IssueSeverity,
        label: &str,
        count: usize,
    ) {
        if count == 0 {
            return;
        }

        let mut by_kind: BTreeMap<IssueKind, Vec<&Issue>> = BTreeMap::new();
        for issue in issues.iter().filter(|i| i.severity == severity) {
            by_kind.entry(issue.kind).or_default().push(issue);
        }

        out.push_str(&format!("{} ({}):\n", label, count));
        for (kind, group) in by_kind {
            for issue in group {
                if issue.context.is_empty() {
                    out.push_str(&format!("  - [{}] {}\n", kind, issue.message));
                } else {
                    out.push_str(&format!(
                        "  - [{}] {} ({})\n",
                        kind, issue.message, issue.context
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = ValidationReporter::summarize(&[]);
        assert!(!summary.has_errors);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.report, "no issues");
    }

    #[test]
    fn test_warnings_only_exit_zero() {
        let issues = vec![Issue::warning(
            IssueKind::UnresolvedCategory,
            "no agent registered for category 'security'",
            "security",
        )];
        let summary = ValidationReporter::summarize(&issues);

        assert!(!summary.has_errors);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.warning_count, 1);
        assert!(summary.report.contains("warnings (1):"));
        assert!(summary.report.contains("[unresolved_category]"));
    }

    #[test]
    fn test_errors_exit_one() {
        let issues = vec![
            Issue::warning(IssueKind::ParseError, "no front-matter block", "a.md"),
            Issue::error(IssueKind::DuplicateName, "duplicate id", "b.md"),
        ];
        let summary = ValidationReporter::summarize(&issues);

        assert!(summary.has_errors);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.warning_count, 1);
        assert!(summary.report.contains("errors (1):"));
        assert!(summary.report.contains("warnings (1):"));
    }
}
