//! The static path over the fixture manifest.

use pgclause::check::{BuildCheck, CheckError, CheckLevel, Manifest, StaticCheck};
use pgclause::{Compiler, SchemaRegistry};
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn registry() -> SchemaRegistry {
    SchemaRegistry::builder()
        .file(fixtures().join("schema.sql"))
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn fixture_manifest_compiles() {
    let reg = registry();
    let manifest = Manifest::load(&fixtures().join("queries.toml")).unwrap();
    assert_eq!(manifest.queries.len(), 5);

    let report = StaticCheck::new(&reg).run(&manifest.queries);
    assert!(!report.has_errors(), "{:?}", report.issues);
    assert_eq!(report.compiled.len(), 5);

    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].query, "actions_by_status");
    assert_eq!(warnings[0].level, CheckLevel::Warning);

    let listed = &report.compiled[0];
    assert_eq!(listed.name, "list_project_actions");
    assert_eq!(
        listed.result.sql(),
        "SELECT actions.id, actions.name FROM actions \
         LEFT JOIN project ON project.id = actions.project_id AND project.is_deleted IS NULL \
         WHERE actions.project_id = ? AND actions.is_deleted IS NULL \
         ORDER BY actions.id DESC LIMIT 50"
    );

    let insert = report
        .compiled
        .iter()
        .find(|q| q.name == "create_action")
        .unwrap();
    assert_eq!(
        insert.result.sql(),
        "INSERT INTO actions (project_id, name, date_end) VALUES (?, ?, NULL) RETURNING id"
    );
    assert_eq!(insert.result.params(), ["7", "test"]);
}

#[test]
fn manifest_queries_match_per_call_compilation() {
    let reg = registry();
    let manifest = Manifest::load(&fixtures().join("queries.toml")).unwrap();
    let report = StaticCheck::new(&reg).run(&manifest.queries);
    let compiler = Compiler::new(&reg);

    for (named, compiled) in manifest.queries.iter().zip(&report.compiled) {
        let dynamic = compiler.compile(&named.query).unwrap();
        assert_eq!(dynamic.sql(), compiled.result.sql());
        assert_eq!(dynamic.params(), compiled.result.params());
    }
}

#[test]
fn build_check_emits_cargo_directives() {
    let mut out: Vec<u8> = Vec::new();
    let report = BuildCheck::new(fixtures())
        .schema("schema.sql")
        .queries("*.toml")
        .run(&mut out)
        .unwrap();
    assert_eq!(report.compiled.len(), 5);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("cargo:rerun-if-changed="));
    assert!(lines[0].ends_with("schema.sql"));
    assert!(lines[1].ends_with("queries.toml"));
    assert!(lines[2].starts_with("cargo:warning=[WARNING]"));
    assert!(lines[2].contains("actions_by_status"));
}

#[test]
fn build_check_fails_on_denied_warnings() {
    let mut out: Vec<u8> = Vec::new();
    let err = BuildCheck::new(fixtures())
        .schema("schema.sql")
        .queries("queries.toml")
        .deny_warnings(true)
        .run(&mut out)
        .unwrap_err();
    assert_eq!(
        err,
        CheckError::Failed {
            errors: 0,
            warnings: 1
        }
    );
}

#[test]
fn build_check_requires_matching_files() {
    let err = BuildCheck::new(fixtures())
        .schema("missing/*.sql")
        .queries("*.toml")
        .run(&mut Vec::<u8>::new())
        .unwrap_err();
    assert!(matches!(err, CheckError::NoMatch { .. }));
}
