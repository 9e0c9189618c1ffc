//! # pgclause
//!
//! Schema-validated, parameterized PostgreSQL statements built from structured
//! clause descriptions.
//!
//! ## Features
//!
//! - **Schema registry**: table and column names read from `CREATE TABLE` text
//! - **Field validation**: every column reference is checked, including inside
//!   function calls, `AS` aliases, casts, and joined tables
//! - **Safe parameters**: values become positional `?` parameters; `IN` lists are
//!   rejected in favour of `= ANY(?::type[])`
//! - **Soft delete**: tables with the marker column (default `is_deleted`) are
//!   filtered to `marker IS NULL` on the statement table and every join
//! - **Two validation paths**: the same compiler runs per call and in a build
//!   step over query manifests ([`check`])
//!
//! ## Example
//!
//! ```
//! use pgclause::{Compiler, Join, SchemaRegistry, SelectQuery};
//!
//! let registry = SchemaRegistry::from_sql(
//!     "CREATE TABLE project (id INT, name TEXT, is_deleted TIMESTAMP);
//!      CREATE TABLE actions (id INT, project_id INT, name TEXT, is_deleted TIMESTAMP);",
//! )?;
//!
//! let query = Compiler::new(&registry).select(
//!     &SelectQuery::new("actions")
//!         .select(&["actions.id", "actions.name"])
//!         .join(Join::left("project").on("project.id", "=", "actions.project_id"))
//!         .filter("actions.project_id", "=", "123"),
//! )?;
//!
//! assert_eq!(
//!     query.sql(),
//!     "SELECT actions.id, actions.name FROM actions \
//!      LEFT JOIN project ON project.id = actions.project_id AND project.is_deleted IS NULL \
//!      WHERE actions.project_id = ? AND actions.is_deleted IS NULL"
//! );
//! assert_eq!(query.params(), ["123"]);
//! # Ok::<(), pgclause::ClauseError>(())
//! ```
//!
//! ## Raw SQL
//!
//! A WHERE field starting with [`RAW_SQL_PREFIX`] (`sql:>`) skips validation and
//! is wrapped in parentheses. Only use it with trusted SQL.

pub mod clause;
pub mod error;
pub mod exec;
pub mod field;
pub mod query;
pub mod raw;
pub mod row;
pub mod schema;

#[cfg(feature = "manifest")]
pub mod check;

#[cfg(feature = "codegen")]
pub mod codegen;

pub use clause::{Advisory, Direction, Fragment, JoinType, Operator};
pub use error::{ClauseError, ClauseResult, SchemaError, SchemaResult};
pub use exec::Executor;
pub use field::{FieldToken, ResolvedField, Scope};
pub use query::{
    Assignment, CompileOptions, Compiler, Condition, DeleteQuery, InsertQuery, Join, OnCondition,
    OrderBy, Query, QueryResult, RawFragment, SelectQuery, StatementKind, UpdateQuery,
    renumber_placeholders,
};
pub use raw::{RAW_SQL_PREFIX, parse_escape, raw};
pub use row::{Projection, RowSet, RowView};
pub use schema::{DEFAULT_SOFT_DELETE_COLUMN, FieldLookup, SchemaRegistry, TableSchema};
