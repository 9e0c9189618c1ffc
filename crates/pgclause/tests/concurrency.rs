//! A registry is shared read-only by concurrent compilations.

use pgclause::{Compiler, Join, SchemaRegistry, SelectQuery};
use std::sync::Arc;

fn query(i: usize) -> SelectQuery {
    SelectQuery::new("actions")
        .select(&["actions.id", "project.name"])
        .join(Join::left("project").on("project.id", "=", "actions.project_id"))
        .filter("actions.status", "=", &i.to_string())
}

#[test]
fn concurrent_compilations_are_independent() {
    let reg = Arc::new(
        SchemaRegistry::from_sql(
            "CREATE TABLE project (id INT, name TEXT, is_deleted TIMESTAMP);
             CREATE TABLE actions (id INT, project_id INT, status INT, is_deleted TIMESTAMP);",
        )
        .unwrap(),
    );
    let expected = Compiler::new(&reg).select(&query(0)).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let reg = Arc::clone(&reg);
                let expected = expected.sql().to_string();
                s.spawn(move || {
                    let compiler = Compiler::new(&reg);
                    for i in 0..200 {
                        let result = compiler.select(&query(i)).unwrap();
                        assert_eq!(result.sql(), expected);
                        assert_eq!(result.params(), [i.to_string()]);

                        // Failures stay local to the failing call.
                        if (i + t) % 7 == 0 {
                            let err = compiler
                                .select(&SelectQuery::new("actions").select(&["missing"]))
                                .unwrap_err();
                            assert!(err.is_unknown_field());
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });

    assert_eq!(reg.len(), 2);
    assert!(reg.has_soft_delete_marker("actions"));
}
