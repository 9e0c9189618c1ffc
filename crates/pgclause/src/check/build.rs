//! Build-script entry point for the static validation path.

use super::{CheckError, CheckReport, Manifest, StaticCheck, expand_globs};
use crate::query::CompileOptions;
use crate::schema::SchemaRegistry;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Settings for a build-time check.
///
/// # Example
///
/// ```ignore
/// // build.rs
/// fn main() {
///     pgclause::check::BuildCheck::new(env!("CARGO_MANIFEST_DIR"))
///         .schema("db/schema.sql")
///         .queries("queries/*.toml")
///         .constants_out(std::path::Path::new(&std::env::var("OUT_DIR").unwrap()).join("queries.rs"))
///         .run_cargo()
///         .unwrap();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BuildCheck {
    base_dir: PathBuf,
    schema: Vec<String>,
    queries: Vec<String>,
    soft_delete_column: Option<String>,
    options: CompileOptions,
    deny_warnings: bool,
    constants_out: Option<PathBuf>,
}

impl BuildCheck {
    /// Patterns are resolved relative to `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            schema: Vec::new(),
            queries: Vec::new(),
            soft_delete_column: None,
            options: CompileOptions::default(),
            deny_warnings: false,
            constants_out: None,
        }
    }

    /// Add a schema glob.
    pub fn schema(mut self, pattern: impl Into<String>) -> Self {
        self.schema.push(pattern.into());
        self
    }

    /// Add a manifest glob.
    pub fn queries(mut self, pattern: impl Into<String>) -> Self {
        self.queries.push(pattern.into());
        self
    }

    pub fn soft_delete_column(mut self, column: impl Into<String>) -> Self {
        self.soft_delete_column = Some(column.into());
        self
    }

    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Treat advisories as failures.
    pub fn deny_warnings(mut self, deny: bool) -> Self {
        self.deny_warnings = deny;
        self
    }

    /// Write validated queries as Rust constants to `path` when the check passes.
    #[cfg(feature = "codegen")]
    pub fn constants_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.constants_out = Some(path.into());
        self
    }

    /// Load the registry and manifests, check every query, and write cargo
    /// directives to `out`.
    ///
    /// Every issue becomes a `cargo:warning` line. Fails with
    /// [`CheckError::Failed`] when the report does not pass; nothing is written
    /// to the constants file in that case.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<CheckReport, CheckError> {
        let schema_files = expand_globs(&self.base_dir, &self.schema)?;
        let manifest_files = expand_globs(&self.base_dir, &self.queries)?;
        for path in schema_files.iter().chain(&manifest_files) {
            directive(out, &format!("cargo:rerun-if-changed={}", path.display()))?;
        }

        let mut builder = SchemaRegistry::builder();
        if let Some(column) = &self.soft_delete_column {
            builder = builder.soft_delete_column(column.clone());
        }
        for path in &schema_files {
            builder = builder.file(path)?;
        }
        let registry = builder.build()?;

        let mut manifest = Manifest::default();
        for path in &manifest_files {
            manifest.queries.extend(Manifest::load(path)?.queries);
        }

        let report = StaticCheck::with_options(&registry, self.options.clone()).run(&manifest.queries);
        for issue in &report.issues {
            directive(out, &format!("cargo:warning={issue}"))?;
        }

        if !report.passed(self.deny_warnings) {
            return Err(CheckError::Failed {
                errors: report.errors().count(),
                warnings: report.warnings().count(),
            });
        }

        if let Some(path) = &self.constants_out {
            write_constants(path, &report)?;
        }
        Ok(report)
    }

    /// [`run`](Self::run) against stdout, for use in `build.rs`.
    pub fn run_cargo(&self) -> Result<CheckReport, CheckError> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.run(&mut lock)
    }
}

/// Check `schema` and `queries` globs relative to `CARGO_MANIFEST_DIR`.
pub fn check_at_build(schema: &str, queries: &str) -> Result<CheckReport, CheckError> {
    let base_dir = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    BuildCheck::new(base_dir)
        .schema(schema)
        .queries(queries)
        .run_cargo()
}

fn directive<W: Write>(out: &mut W, line: &str) -> Result<(), CheckError> {
    writeln!(out, "{line}").map_err(|e| CheckError::Io {
        path: "<stdout>".to_string(),
        message: e.to_string(),
    })
}

#[cfg(feature = "codegen")]
fn write_constants(path: &Path, report: &CheckReport) -> Result<(), CheckError> {
    let content = crate::codegen::render_constants(report);
    if std::fs::read_to_string(path).ok().as_deref() == Some(content.as_str()) {
        return Ok(());
    }
    std::fs::write(path, content).map_err(|e| CheckError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(not(feature = "codegen"))]
fn write_constants(_path: &Path, _report: &CheckReport) -> Result<(), CheckError> {
    Ok(())
}
