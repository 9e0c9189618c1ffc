use super::*;
use crate::error::{ClauseError, count_placeholders};
use crate::schema::SchemaRegistry;

const SCHEMA: &str = "
CREATE TABLE project (
    id SERIAL PRIMARY KEY,
    name TEXT,
    owner_id INT,
    is_deleted TIMESTAMP
);
CREATE TABLE actions (
    id SERIAL PRIMARY KEY,
    project_id INT REFERENCES project(id),
    name TEXT,
    status INT,
    count INT,
    is_deleted TIMESTAMP
);
CREATE TABLE t (id SERIAL, name TEXT, date_end DATE);
";

fn registry() -> SchemaRegistry {
    SchemaRegistry::from_sql(SCHEMA).unwrap()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn select_with_join() -> SelectQuery {
    SelectQuery::new("actions")
        .select(&["actions.id", "actions.name"])
        .join(Join::left("project").on("project.id", "=", "actions.project_id"))
        .filter("actions.project_id", "=", "123")
}

#[test]
fn test_select_with_join_and_filter() {
    let reg = registry();
    let result = Compiler::new(&reg).select(&select_with_join()).unwrap();
    assert_eq!(
        result.sql(),
        "SELECT actions.id, actions.name FROM actions LEFT JOIN project ON project.id = actions.project_id AND project.is_deleted IS NULL WHERE actions.project_id = ? AND actions.is_deleted IS NULL"
    );
    assert_eq!(result.params(), strings(&["123"]).as_slice());
    assert_eq!(result.select(), strings(&["actions.id", "actions.name"]).as_slice());
    assert_eq!(result.kind(), StatementKind::Select);
}

#[test]
fn test_array_membership() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .select(
            &SelectQuery::new("actions")
                .select(&["id"])
                .filter("actions.status", "= ANY(?::int[])", "1,2,3")
                .ignore_soft_delete(true),
        )
        .unwrap();
    assert_eq!(
        result.sql(),
        "SELECT id FROM actions WHERE actions.status = ANY(?::int[])"
    );
    assert_eq!(result.params(), strings(&["{1,2,3}"]).as_slice());
}

#[test]
fn test_insert_with_null() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .insert(&InsertQuery::new("t").value("name", "test").value("date_end", ""))
        .unwrap();
    assert_eq!(result.sql(), "INSERT INTO t (name, date_end) VALUES (?, NULL)");
    assert_eq!(result.params(), strings(&["test"]).as_slice());
}

#[test]
fn test_update_raw_expression() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .update(
            &UpdateQuery::new("actions")
                .set("count = count + 1", "")
                .filter("id", "=", "5"),
        )
        .unwrap();
    assert_eq!(
        result.sql(),
        "UPDATE actions SET count = count + 1 WHERE id = ? AND actions.is_deleted IS NULL"
    );
    assert_eq!(result.params(), strings(&["5"]).as_slice());
}

#[test]
fn test_update_params_follow_set_then_where() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .update(
            &UpdateQuery::new("actions")
                .set("name", "x")
                .filter("id", "=", "5")
                .custom_where(RawFragment::new("status > ?", ["2"]))
                .ignore_soft_delete(true)
                .returning(&["id"]),
        )
        .unwrap();
    assert_eq!(
        result.sql(),
        "UPDATE actions SET name = ? WHERE id = ? AND status > ? RETURNING id"
    );
    assert_eq!(result.params(), strings(&["x", "5", "2"]).as_slice());
    assert_eq!(result.select(), strings(&["id"]).as_slice());
}

#[test]
fn test_mutations_require_where() {
    let reg = registry();
    let compiler = Compiler::new(&reg);

    let err = compiler
        .update(&UpdateQuery::new("actions").set("name", "x"))
        .unwrap_err();
    assert_eq!(err, ClauseError::empty("WHERE"));

    let err = compiler.delete(&DeleteQuery::new("actions")).unwrap_err();
    assert_eq!(err, ClauseError::empty("WHERE"));

    let err = compiler
        .update(&UpdateQuery::new("actions").filter("id", "=", "1"))
        .unwrap_err();
    assert_eq!(err, ClauseError::empty("SET"));
}

#[test]
fn test_delete() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .delete(&DeleteQuery::new("actions").filter("id", "=", "9"))
        .unwrap();
    assert_eq!(
        result.sql(),
        "DELETE FROM actions WHERE id = ? AND actions.is_deleted IS NULL"
    );
    assert_eq!(result.kind(), StatementKind::Delete);
}

#[test]
fn test_select_without_conditions_still_filters_soft_delete() {
    let reg = registry();
    let compiler = Compiler::new(&reg);

    let result = compiler
        .select(&SelectQuery::new("actions").select(&["*"]))
        .unwrap();
    assert_eq!(
        result.sql(),
        "SELECT * FROM actions WHERE actions.is_deleted IS NULL"
    );

    let result = compiler
        .select(&SelectQuery::new("t").select(&["*"]))
        .unwrap();
    assert_eq!(result.sql(), "SELECT * FROM t");
}

#[test]
fn test_full_clause_order() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .select(
            &SelectQuery::new("actions")
                .select(&["actions.status", "count(*) AS total"])
                .join(Join::inner("project AS p").on("p.id", "=", "actions.project_id"))
                .filter("p.owner_id", "=", "3")
                .group_by(&["actions.status"])
                .order_by(OrderBy::desc("actions.status"))
                .limit(10)
                .offset(20),
        )
        .unwrap();
    assert_eq!(
        result.sql(),
        "SELECT actions.status, count(*) as total FROM actions INNER JOIN project AS p ON p.id = actions.project_id AND p.is_deleted IS NULL WHERE p.owner_id = ? AND actions.is_deleted IS NULL GROUP BY actions.status ORDER BY actions.status DESC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_join_params_precede_where_params() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .select(
            &SelectQuery::new("actions")
                .select(&["actions.id"])
                .join(
                    Join::inner("project")
                        .on("project.id", "=", "actions.project_id")
                        .on("project.owner_id", "=", "77"),
                )
                .filter("actions.status", "=", "1")
                .custom_where(RawFragment::new("actions.count < ?", ["10"]))
                .ignore_soft_delete(true),
        )
        .unwrap();
    assert_eq!(result.params(), strings(&["77", "1", "10"]).as_slice());
    assert_eq!(
        result.to_pg_sql(),
        "SELECT actions.id FROM actions INNER JOIN project ON project.id = actions.project_id AND project.owner_id = $1 WHERE actions.status = $2 AND actions.count < $3"
    );
}

#[test]
fn test_ignore_soft_delete_removes_every_marker() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .select(&select_with_join().ignore_soft_delete(true))
        .unwrap();
    assert!(!result.sql().contains("is_deleted"));
}

#[test]
fn test_compiling_twice_is_identical() {
    let reg = registry();
    let compiler = Compiler::new(&reg);
    let query = Query::from(select_with_join());
    let first = compiler.compile(&query).unwrap();
    let second = compiler.compile(&query).unwrap();
    assert_eq!(first.sql(), second.sql());
    assert_eq!(first.params(), second.params());
}

#[test]
fn test_placeholder_count_matches_params() {
    let reg = registry();
    let compiler = Compiler::new(&reg);
    let queries: Vec<Query> = vec![
        select_with_join().into(),
        SelectQuery::new("actions")
            .select(&["id"])
            .filter("status", "BETWEEN", "1 AND 4")
            .filter("name", "LIKE", "a%")
            .filter("sql:>actions.count > ?", "", "")
            .into(),
        InsertQuery::new("t")
            .value("name", "x")
            .value("date_end", "null")
            .into(),
        UpdateQuery::new("actions")
            .set("name", "y")
            .set("status", "")
            .filter("id", "=", "1")
            .into(),
        DeleteQuery::new("actions")
            .condition(Condition::raw_sql("id = ANY(?)").args(["{1,2}"]))
            .into(),
    ];

    for query in &queries {
        match compiler.compile(query) {
            Ok(result) => assert_eq!(
                count_placeholders(result.sql()),
                result.params().len(),
                "{}",
                result.sql()
            ),
            Err(err) => assert!(
                matches!(err, ClauseError::MismatchedPlaceholder { .. }),
                "unexpected error: {err}"
            ),
        }
    }
}

#[test]
fn test_unknown_field_returns_no_sql() {
    let reg = registry();
    let err = Compiler::new(&reg)
        .select(&SelectQuery::new("actions").select(&["id"]).filter("owner", "=", "1"))
        .unwrap_err();
    assert!(err.is_unknown_field());

    let err = Compiler::new(&reg)
        .select(&SelectQuery::new("tasks").select(&["id"]))
        .unwrap_err();
    assert!(err.is_unknown_table());
}

#[test]
fn test_escape_hatch_in_select_query() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .select(
            &SelectQuery::new("t")
                .select(&["id"])
                .condition(Condition::verbatim("sql:>x = 1")),
        )
        .unwrap();
    assert_eq!(result.sql(), "SELECT id FROM t WHERE (x = 1)");
}

#[test]
fn test_advisories_are_reported_not_fatal() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .select(
            &SelectQuery::new("actions")
                .select(&["id"])
                .filter("status", "=", "1")
                .filter("project_id", "=", "2"),
        )
        .unwrap();
    assert_eq!(result.advisories().len(), 1);
    assert_eq!(result.params(), strings(&["1", "2"]).as_slice());

    let quiet = Compiler::with_options(&reg, CompileOptions::default().index_hints(Vec::<String>::new()))
        .select(
            &SelectQuery::new("actions")
                .select(&["id"])
                .filter("status", "=", "1")
                .filter("project_id", "=", "2"),
        )
        .unwrap();
    assert!(quiet.advisories().is_empty());
}

#[test]
fn test_unbound_placeholder_tokens_are_rejected() {
    let reg = registry();
    let compiler = Compiler::new(&reg);
    let queries: Vec<Query> = vec![
        SelectQuery::new("actions")
            .select(&["coalesce(actions.name,?)"])
            .into(),
        SelectQuery::new("actions")
            .select(&["id"])
            .order_by(OrderBy::ignore("?"))
            .into(),
        SelectQuery::new("actions").select(&["id"]).group_by(&["?"]).into(),
        DeleteQuery::new("actions")
            .filter("id", "=", "1")
            .returning(&["?"])
            .into(),
    ];

    for query in &queries {
        let err = compiler.compile(query).unwrap_err();
        assert!(
            matches!(
                err,
                ClauseError::MismatchedPlaceholder {
                    placeholders,
                    params,
                    ..
                } if placeholders == params + 1
            ),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn test_placeholder_value_binds_itself() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .select(
            &SelectQuery::new("actions")
                .select(&["id"])
                .filter("actions.name", "=", "?")
                .ignore_soft_delete(true),
        )
        .unwrap();
    assert_eq!(result.sql(), "SELECT id FROM actions WHERE actions.name = ?");
    assert_eq!(result.params(), strings(&["?"]).as_slice());
}

#[test]
fn test_order_by_expression() {
    let reg = registry();
    let result = Compiler::new(&reg)
        .select(
            &SelectQuery::new("actions")
                .select(&["id"])
                .order_by(OrderBy::ignore("actions.count + 1"))
                .order_by(OrderBy::ignore("actions.name DESC NULLS LAST"))
                .order_by(OrderBy::desc("actions.status = 1"))
                .ignore_soft_delete(true),
        )
        .unwrap();
    assert_eq!(
        result.sql(),
        "SELECT id FROM actions ORDER BY actions.count + 1, actions.name DESC NULLS LAST, actions.status = 1 DESC"
    );

    let err = Compiler::new(&reg)
        .select(
            &SelectQuery::new("actions")
                .select(&["id"])
                .order_by(OrderBy::ignore("actions.missing + 1")),
        )
        .unwrap_err();
    assert!(err.is_unknown_field());
}

#[test]
fn test_query_deserializes_from_toml_shape() {
    let json = r#"{
        "kind": "select",
        "table": "actions",
        "select": ["actions.id"],
        "join": [{"table": "project", "type": "LEFT", "on": [{"left": "project.id", "right": "actions.project_id"}]}],
        "where": [{"field": "actions.project_id", "op": "=", "value": "123"}],
        "order": [{"field": "actions.id"}]
    }"#;
    let query: Query = serde_json::from_str(json).unwrap();
    assert_eq!(query.table(), "actions");
    let Query::Select(select) = &query else {
        panic!("expected select");
    };
    assert_eq!(select.joins[0].on[0].op, "=");
    assert_eq!(select.order[0].direction, "ASC");

    let reg = registry();
    let result = Compiler::new(&reg).compile(&query).unwrap();
    assert!(result.sql().ends_with("ORDER BY actions.id ASC"));
}

#[test]
fn test_renumber_skips_quoted() {
    assert_eq!(
        renumber_placeholders("a = ? AND b = '?' AND c = ANY(?::int[])"),
        "a = $1 AND b = '?' AND c = ANY($2::int[])"
    );
}
