//! Human-readable rendering of a [`ValidationResult`].

use std::fmt;

use super::{Severity, ValidationIssue, ValidationResult};

impl ValidationResult {
    /// Render the issues grouped by severity (errors first), then by metric
    /// in order of first appearance.
    pub fn format_report(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No validation issues found.");
        }

        write!(f, "Validation report: {}", self.summary())?;

        for (severity, heading) in [(Severity::Error, "Errors"), (Severity::Warning, "Warnings")] {
            let issues: Vec<&ValidationIssue> = self
                .issues()
                .iter()
                .filter(|i| i.severity == severity)
                .collect();
            if issues.is_empty() {
                continue;
            }

            write!(f, "\n\n{heading}:")?;

            let mut metrics: Vec<&str> = Vec::new();
            for issue in &issues {
                if !metrics.contains(&issue.metric_name.as_str()) {
                    metrics.push(&issue.metric_name);
                }
            }

            for metric in metrics {
                write!(f, "\n  Metric '{metric}':")?;
                for issue in issues.iter().filter(|i| i.metric_name == metric) {
                    write_issue(f, issue)?;
                }
            }
        }

        Ok(())
    }
}

fn write_issue(f: &mut fmt::Formatter<'_>, issue: &ValidationIssue) -> fmt::Result {
    write!(f, "\n    - [{}] {}", issue.kind, issue.message)?;

    if !issue.context.available_entities.is_empty() {
        write!(
            f,
            "\n      Available entities: {}",
            issue.context.available_entities.join(", ")
        )?;
    }

    if !issue.suggestions.is_empty() {
        write!(f, "\n      Suggestions:")?;
        for suggestion in &issue.suggestions {
            write!(f, "\n        * {suggestion}")?;
        }
    }

    Ok(())
}
