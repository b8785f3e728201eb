//! Validation of metric connectivity.
//!
//! Findings are collected as [`ValidationIssue`]s in a [`ValidationResult`]
//! rather than raised as errors: one metric's problems never stop the rest
//! of a batch from being checked. The caller (strict or lenient) decides what
//! accumulated errors mean for the run.

pub mod connectivity;
mod report;
mod suggest;

pub use connectivity::{ConnectivityOptions, EntityConnectivityValidator};
pub use suggest::suggest_closest;

use serde::Serialize;

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The metric is blocked.
    Error,
    /// The metric proceeds, degraded.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Machine-readable issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// No anchor entity was declared and none could be inferred.
    MissingPrimaryEntity,
    /// The declared anchor is not any model's primary entity.
    InvalidPrimaryEntity,
    /// A dependency names a measure that does not exist.
    MissingMeasure,
    /// A derived metric names a parent metric that does not exist.
    MissingMetric,
    /// A measure's model cannot be joined from the anchor within the hop budget.
    UnreachableMeasure,
    /// A measure is reachable, but further away than recommended.
    ExceedsHopLimit,
    /// A derived metric depends on itself.
    CyclicDependency,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingPrimaryEntity => "missing_primary_entity",
            IssueKind::InvalidPrimaryEntity => "invalid_primary_entity",
            IssueKind::MissingMeasure => "missing_measure",
            IssueKind::MissingMetric => "missing_metric",
            IssueKind::UnreachableMeasure => "unreachable_measure",
            IssueKind::ExceedsHopLimit => "exceeds_hop_limit",
            IssueKind::CyclicDependency => "cyclic_dependency",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional structured details attached to an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_entities: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_measures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hop_count: Option<usize>,
}

/// One finding about one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub metric_name: String,
    pub kind: IssueKind,
    pub message: String,
    pub suggestions: Vec<String>,
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// An issue under construction; severity is fixed when it is added.
#[derive(Debug, Clone)]
pub struct IssueDraft {
    metric_name: String,
    kind: IssueKind,
    message: String,
    suggestions: Vec<String>,
    context: IssueContext,
}

impl IssueDraft {
    pub fn new(kind: IssueKind, metric_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            kind,
            message: message.into(),
            suggestions: Vec::new(),
            context: IssueContext::default(),
        }
    }

    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn context(mut self, context: IssueContext) -> Self {
        self.context = context;
        self
    }

    fn finish(self, severity: Severity) -> ValidationIssue {
        ValidationIssue {
            severity,
            metric_name: self.metric_name,
            kind: self.kind,
            message: self.message,
            suggestions: self.suggestions,
            context: self.context,
        }
    }
}

/// Ordered, append-only collection of issues from one validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, draft: IssueDraft) {
        self.issues.push(draft.finish(Severity::Error));
    }

    pub fn add_warning(&mut self, draft: IssueDraft) {
        self.issues.push(draft.finish(Severity::Warning));
    }

    /// Append every issue of `other`, keeping order.
    pub fn extend(&mut self, other: ValidationResult) {
        self.issues.extend(other.issues);
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn issues_for<'s>(&'s self, metric: &'s str) -> impl Iterator<Item = &'s ValidationIssue> {
        self.issues.iter().filter(move |i| i.metric_name == metric)
    }

    /// Metrics with at least one error, in first-appearance order.
    ///
    /// In lenient mode these are the metrics emission should skip.
    pub fn failing_metrics(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for issue in self.errors() {
            if !names.contains(&issue.metric_name.as_str()) {
                names.push(&issue.metric_name);
            }
        }
        names
    }

    /// One-line count of errors and warnings.
    pub fn summary(&self) -> String {
        format!(
            "{} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}
