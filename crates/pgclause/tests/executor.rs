//! The execution collaborator receives compiled SQL and parameters untouched.

use pgclause::{ClauseError, ClauseResult, Compiler, Executor, SchemaRegistry, SelectQuery};
use std::sync::Mutex;

#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    rows: Vec<Vec<String>>,
}

impl Executor for RecordingExecutor {
    async fn execute(&self, sql: &str, params: &[String]) -> ClauseResult<Vec<Vec<String>>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(self.rows.clone())
    }
}

struct FailingExecutor;

impl Executor for FailingExecutor {
    async fn execute(&self, _sql: &str, _params: &[String]) -> ClauseResult<Vec<Vec<String>>> {
        Err(ClauseError::execution("connection refused"))
    }
}

fn registry() -> SchemaRegistry {
    SchemaRegistry::from_sql(
        "CREATE TABLE project (id INT, name TEXT);
         CREATE TABLE actions (id INT, project_id INT, name TEXT);",
    )
    .unwrap()
}

#[tokio::test]
async fn fetch_wraps_rows_in_projection() {
    let reg = registry();
    let query = Compiler::new(&reg)
        .select(
            &SelectQuery::new("actions")
                .select(&["actions.id", "actions.name AS title"])
                .filter("project_id", "=", "3"),
        )
        .unwrap();

    let executor = RecordingExecutor {
        rows: vec![
            vec!["1".to_string(), "first".to_string()],
            vec!["2".to_string(), "second".to_string()],
        ],
        ..Default::default()
    };

    let rows = query.fetch(&executor).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.column("title").unwrap(), vec!["first", "second"]);
    assert_eq!(rows.first().and_then(|r| r.get("actions.id")), Some("1"));
    assert_eq!(rows.first().and_then(|r| r.get("actions.name")), Some("first"));

    let calls = executor.calls.lock().unwrap();
    assert_eq!(
        calls.as_slice(),
        [(
            "SELECT actions.id, actions.name as title FROM actions WHERE project_id = ?".to_string(),
            vec!["3".to_string()]
        )]
    );
}

#[tokio::test]
async fn executor_errors_propagate() {
    let reg = registry();
    let query = Compiler::new(&reg)
        .select(&SelectQuery::new("actions").select(&["id"]))
        .unwrap();

    let err = query.fetch(&FailingExecutor).await.unwrap_err();
    assert_eq!(err, ClauseError::Execution("connection refused".into()));
}

#[tokio::test]
async fn executor_by_reference() {
    let reg = registry();
    let query = Compiler::new(&reg)
        .select(&SelectQuery::new("project").select(&["name"]))
        .unwrap();
    let executor = RecordingExecutor::default();
    let by_ref = &executor;

    let rows = query.fetch(&by_ref).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(executor.calls.lock().unwrap().len(), 1);
}
