use crate::clause::Advisory;
use crate::error::ClauseResult;
use crate::exec::Executor;
use crate::row::{Projection, RowSet};
use serde::Serialize;
use std::fmt;

/// Statement kind of a compiled query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled statement.
///
/// `params[i]` binds the i-th `?` in `sql`, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    kind: StatementKind,
    sql: String,
    params: Vec<String>,
    /// Resolved select (or RETURNING) list.
    select: Vec<String>,
    #[serde(skip)]
    projection: Projection,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    advisories: Vec<Advisory>,
}

impl QueryResult {
    pub(crate) fn new(
        kind: StatementKind,
        sql: String,
        params: Vec<String>,
        projection: Projection,
        advisories: Vec<Advisory>,
    ) -> Self {
        let select = projection
            .fields()
            .iter()
            .map(|f| f.expr.clone())
            .collect();
        Self {
            kind,
            sql,
            params,
            select,
            projection,
            advisories,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// SQL text with `?` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn select(&self) -> &[String] {
        &self.select
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Non-fatal hints raised while compiling.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// SQL text with PostgreSQL `$1..$n` placeholders.
    pub fn to_pg_sql(&self) -> String {
        renumber_placeholders(&self.sql)
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.sql, self.params)
    }

    /// Run the statement through `executor` and wrap the rows in a [`RowSet`].
    pub async fn fetch<E: Executor>(&self, executor: &E) -> ClauseResult<RowSet> {
        let rows = executor.execute(&self.sql, &self.params).await?;
        Ok(RowSet::new(self.projection.clone(), rows))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Replace each `?` outside single-quoted literals with `$1`, `$2`, ...
///
/// # Example
/// ```
/// assert_eq!(
///     pgclause::renumber_placeholders("a = ? AND b = '?' AND c = ?"),
///     "a = $1 AND b = '?' AND c = $2"
/// );
/// ```
pub fn renumber_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut in_quote = false;
    let mut n = 0;
    for c in sql.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                out.push(c);
            }
            '?' if !in_quote => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(c),
        }
    }
    out
}
