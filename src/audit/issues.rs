// src/audit/issues.rs
// =============================================================================
// Structured findings produced by every phase of the audit.
//
// An Issue is an immutable record: what kind of problem it is, a message a
// human can act on, and how many points it costs. The IssueCollector is the
// single place findings are stored. It only ever grows.
// =============================================================================

use serde::Serialize;
use std::fmt;

/// Every kind of finding the auditor can report.
///
/// The serialized names are the tags users see in JSON output and filter on
/// in CI scripts, so they are spelled out explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueKind {
    #[serde(rename = "Missing_Heading")]
    MissingHeading,
    #[serde(rename = "Multiple_Headings")]
    MultipleHeadings,
    #[serde(rename = "Missing_StructuredData")]
    MissingStructuredData,
    #[serde(rename = "Absolute_Internal_URL")]
    AbsoluteInternalUrl,
    #[serde(rename = "Relative_Path_Usage")]
    RelativePathUsage,
    #[serde(rename = "Dirty_URL")]
    DirtyUrl,
    #[serde(rename = "Broken_Link")]
    BrokenLink,
    #[serde(rename = "External_Dead")]
    ExternalDead,
    #[serde(rename = "Orphan_Page")]
    OrphanPage,
}

impl IssueKind {
    /// Points deducted from the score for one issue of this kind.
    pub fn weight(self) -> u32 {
        match self {
            IssueKind::MissingHeading => 5,
            IssueKind::MultipleHeadings => 2,
            IssueKind::MissingStructuredData => 2,
            IssueKind::AbsoluteInternalUrl => 1,
            IssueKind::RelativePathUsage => 2,
            IssueKind::DirtyUrl => 2,
            IssueKind::BrokenLink => 10,
            IssueKind::ExternalDead => 5,
            IssueKind::OrphanPage => 5,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            IssueKind::MissingHeading => "Missing_Heading",
            IssueKind::MultipleHeadings => "Multiple_Headings",
            IssueKind::MissingStructuredData => "Missing_StructuredData",
            IssueKind::AbsoluteInternalUrl => "Absolute_Internal_URL",
            IssueKind::RelativePathUsage => "Relative_Path_Usage",
            IssueKind::DirtyUrl => "Dirty_URL",
            IssueKind::BrokenLink => "Broken_Link",
            IssueKind::ExternalDead => "External_Dead",
            IssueKind::OrphanPage => "Orphan_Page",
        }
    }

    /// Semantic and schema findings are SEO hints, not breakage.
    fn is_semantic(self) -> bool {
        matches!(
            self,
            IssueKind::MissingHeading | IssueKind::MultipleHeadings | IssueKind::MissingStructuredData
        )
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How an issue is displayed. Has no influence on the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Seo,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
    pub weight: u32,
}

impl Issue {
    /// Builds an issue whose weight comes from its kind.
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Issue {
            kind,
            message: message.into(),
            weight: kind.weight(),
        }
    }

    pub fn severity(&self) -> Severity {
        if self.kind.is_semantic() {
            Severity::Seo
        } else if self.weight <= 2 {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

/// Append-only sink of findings.
///
/// Phases don't share one collector through global state. The scan builds
/// one and the pipeline appends the later phases' findings with `extend`.
#[derive(Debug, Default, Clone)]
pub struct IssueCollector {
    issues: Vec<Issue>,
}

impl IssueCollector {
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn report(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.push(Issue::new(kind, message));
    }

    pub fn extend<I: IntoIterator<Item = Issue>>(&mut self, issues: I) {
        self.issues.extend(issues);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Issue> {
        self.issues
    }
}
