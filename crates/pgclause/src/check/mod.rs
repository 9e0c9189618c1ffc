//! Static validation path.
//!
//! Runs the same compiler used at call time over every query in a set of
//! manifests, before anything executes. A build step (a `build.rs` through
//! [`BuildCheck`], or the `pgclause check` command) fails when any query does
//! not compile, so invalid field names, operators, or tables never ship.
//!
//! # Example
//!
//! ```ignore
//! use pgclause::check::{Manifest, StaticCheck};
//!
//! let registry = SchemaRegistry::builder().file("db/schema.sql")?.build()?;
//! let manifest = Manifest::load("queries/actions.toml".as_ref())?;
//! let report = StaticCheck::new(&registry).run(&manifest.queries);
//! for issue in &report.issues {
//!     eprintln!("{issue}");
//! }
//! assert!(report.passed(false));
//! ```

mod build;
mod manifest;
mod report;


pub use build::{BuildCheck, check_at_build};
pub use manifest::{Manifest, NamedQuery, expand_globs};
pub use report::{CheckIssue, CheckLevel, CheckReport, CompiledQuery};

use crate::error::SchemaError;
use crate::query::{CompileOptions, Compiler};
use crate::schema::SchemaRegistry;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that stop a static check before or after compiling queries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse manifest {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid query {entry} in {path}: {message}")]
    Entry {
        path: String,
        entry: String,
        message: String,
    },

    #[error("Invalid glob {pattern}: {message}")]
    Glob { pattern: String, message: String },

    #[error("Glob pattern matched no files: {pattern}")]
    NoMatch { pattern: String },

    /// The check ran and found problems.
    #[error("Static check failed: {errors} error(s), {warnings} warning(s)")]
    Failed { errors: usize, warnings: usize },
}

/// Compiles named queries against a registry and collects the outcome.
#[derive(Debug, Clone)]
pub struct StaticCheck<'r> {
    compiler: Compiler<'r>,
}

impl<'r> StaticCheck<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_options(registry, CompileOptions::default())
    }

    pub fn with_options(registry: &'r SchemaRegistry, options: CompileOptions) -> Self {
        Self {
            compiler: Compiler::with_options(registry, options),
        }
    }

    /// Compile every query. Compile errors and duplicate names are errors;
    /// advisories are warnings.
    pub fn run(&self, queries: &[NamedQuery]) -> CheckReport {
        let mut report = CheckReport::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for named in queries {
            if !seen.insert(named.name.as_str()) {
                report.issues.push(issue(
                    CheckLevel::Error,
                    named,
                    format!("duplicate query name: {}", named.name),
                ));
                continue;
            }

            match self.compiler.compile(&named.query) {
                Ok(result) => {
                    for advisory in result.advisories() {
                        report.issues.push(issue(
                            CheckLevel::Warning,
                            named,
                            advisory.to_string(),
                        ));
                    }
                    report.compiled.push(CompiledQuery {
                        name: named.name.clone(),
                        source: named.source.clone(),
                        result,
                    });
                }
                Err(err) => {
                    let mut failed = issue(CheckLevel::Error, named, err.to_string());
                    failed.error = Some(err);
                    report.issues.push(failed);
                }
            }
        }

        tracing::info!(
            target: "pgclause.check",
            compiled = report.compiled.len(),
            issues = report.issues.len(),
            "static check finished"
        );
        report
    }
}

fn issue(level: CheckLevel, named: &NamedQuery, message: String) -> CheckIssue {
    CheckIssue {
        level,
        query: named.name.clone(),
        source: named.source.clone(),
        message,
        error: None,
    }
}
