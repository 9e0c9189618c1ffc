use crate::config::ProjectConfig;
use pgclause::SchemaRegistry;
use pgclause::check::{CheckReport, Manifest, StaticCheck, expand_globs};
use pgclause::query::CompileOptions;

/// Build the registry from the configured schema files and compile every
/// manifest query against it.
pub fn check_project(project: &ProjectConfig) -> anyhow::Result<CheckReport> {
    let file = &project.file;

    let mut builder = SchemaRegistry::builder();
    if let Some(column) = &file.soft_delete_column {
        builder = builder.soft_delete_column(column);
    }
    for path in expand_globs(&project.config_dir, &file.schema)? {
        builder = builder.file(&path)?;
    }
    let registry = builder.build()?;

    let manifest = Manifest::load_all(&project.config_dir, &file.queries)?;

    let mut options = CompileOptions::default();
    if let Some(hints) = &file.index_hints {
        options = options.index_hints(hints.iter().cloned());
    }

    Ok(StaticCheck::with_options(&registry, options).run(&manifest.queries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixtures() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../pgclause/tests/fixtures")
    }

    fn project(extra: &str) -> ProjectConfig {
        let dir = std::env::temp_dir().join(format!("pgclause-cli-workflow-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("pgclause-{}.toml", extra.len()));
        let fixtures = fixtures();
        std::fs::write(
            &path,
            format!(
                "version = \"1\"\nschema = [{:?}]\nqueries = [{:?}]\n{extra}",
                fixtures.join("schema.sql").display().to_string(),
                fixtures.join("queries.toml").display().to_string(),
            ),
        )
        .unwrap();
        ProjectConfig::load(path).unwrap()
    }

    #[test]
    fn check_fixture_project() {
        let report = check_project(&project("")).unwrap();
        assert_eq!(report.compiled.len(), 5);
        assert!(!report.has_errors());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn index_hints_come_from_config() {
        let report = check_project(&project("index_hints = []\n")).unwrap();
        assert!(!report.has_warnings());
    }
}
