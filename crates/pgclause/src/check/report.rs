use crate::error::ClauseError;
use crate::query::QueryResult;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Severity of a check issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckLevel {
    /// Advisory: compilation succeeded.
    Warning,
    /// Compilation failed.
    Error,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("WARNING"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}

/// One problem found for one named query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIssue {
    pub level: CheckLevel,
    pub query: String,
    pub source: Option<PathBuf>,
    pub message: String,
    /// The compile error behind an error-level issue.
    #[serde(skip)]
    pub error: Option<ClauseError>,
}

impl CheckIssue {
    /// `file name` or just `name`.
    pub fn location(&self) -> String {
        match &self.source {
            Some(path) => format!("{} {}", path.display(), self.query),
            None => self.query.clone(),
        }
    }
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.location(), self.message)
    }
}

/// A query that compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub name: String,
    pub source: Option<PathBuf>,
    #[serde(flatten)]
    pub result: QueryResult,
}

/// Outcome of a static check run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub compiled: Vec<CompiledQuery>,
    pub issues: Vec<CheckIssue>,
}

impl CheckReport {
    pub fn errors(&self) -> impl Iterator<Item = &CheckIssue> {
        self.issues.iter().filter(|i| i.level == CheckLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckIssue> {
        self.issues.iter().filter(|i| i.level == CheckLevel::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    /// No errors, and no warnings either when `deny_warnings` is set.
    pub fn passed(&self, deny_warnings: bool) -> bool {
        !self.has_errors() && !(deny_warnings && self.has_warnings())
    }

    /// Pretty JSON rendering of the whole report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
