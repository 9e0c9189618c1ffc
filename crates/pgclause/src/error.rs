//! Error types for pgclause

use thiserror::Error;

/// Result type alias for clause compilation.
pub type ClauseResult<T> = Result<T, ClauseError>;

/// Result type alias for schema loading.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building a [`SchemaRegistry`](crate::SchemaRegistry).
///
/// These are startup failures: a registry is either built completely or not at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// No schema text was supplied, or it contained no `CREATE TABLE` statement.
    #[error("No schema source found: {0}")]
    NoSource(String),

    /// A `CREATE TABLE` statement without a usable table name.
    #[error("Cannot parse table name from: {statement}")]
    MissingTableName { statement: String },

    /// The column list of a table never closes.
    #[error("Unbalanced parentheses in CREATE TABLE {table}")]
    Unbalanced { table: String },

    /// Reading a schema file failed.
    #[error("Failed to read schema file {path}: {message}")]
    Io { path: String, message: String },
}

/// Errors raised while compiling a clause description.
///
/// Every variant is deterministic for a given input and registry; both the
/// static check path and per-call compilation surface the same variants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClauseError {
    /// Schema loading error.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Referenced table is not in the registry.
    #[error("Unknown table: {table}")]
    UnknownTable { table: String },

    /// Referenced column could not be resolved against any table in scope.
    #[error("Unknown field '{field}' (tried {table}.{column}{})", format_candidates(.candidates))]
    UnknownField {
        field: String,
        table: String,
        column: String,
        candidates: Vec<String>,
    },

    /// Operator outside the allowed set.
    #[error("Invalid operator '{op}'{}", in_field(.field))]
    InvalidOperator { op: String, field: String },

    /// ORDER BY direction outside ASC/DESC/IGNORE.
    #[error("Invalid order direction '{direction}' for field '{field}'")]
    InvalidDirection { direction: String, field: String },

    /// JOIN type outside INNER/LEFT/RIGHT/FULL.
    #[error("Invalid join type '{join_type}' for table '{table}'")]
    InvalidJoinType { join_type: String, table: String },

    /// A clause that must not be empty was empty.
    #[error("{clause} must not be empty")]
    EmptyClause { clause: &'static str },

    /// A raw fragment whose `?` count differs from the number of values supplied.
    #[error(
        "Placeholder mismatch: '{fragment}' has {placeholders} '?', but {params} values provided"
    )]
    MismatchedPlaceholder {
        fragment: String,
        placeholders: usize,
        params: usize,
    },

    /// Row lookup for a name that is not part of the projection.
    #[error("Field not selected: {0}")]
    FieldNotSelected(String),

    /// Row lookup by bare column name matched more than one selected field.
    #[error("Ambiguous field '{name}' matches: {}", .matches.join(", "))]
    AmbiguousField { name: String, matches: Vec<String> },

    /// Error reported by the execution collaborator.
    #[error("Execution error: {0}")]
    Execution(String),
}

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        format!("; aliases in scope: {}", candidates.join(", "))
    }
}

fn in_field(field: &str) -> String {
    if field.is_empty() {
        String::new()
    } else {
        format!(" on field '{field}'")
    }
}

impl ClauseError {
    /// Create an unknown table error.
    pub fn unknown_table(table: impl Into<String>) -> Self {
        Self::UnknownTable {
            table: table.into(),
        }
    }

    /// Create an empty clause error.
    pub fn empty(clause: &'static str) -> Self {
        Self::EmptyClause { clause }
    }

    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this is an unknown field error
    pub fn is_unknown_field(&self) -> bool {
        matches!(self, Self::UnknownField { .. })
    }

    /// Check if this is an unknown table error
    pub fn is_unknown_table(&self) -> bool {
        matches!(self, Self::UnknownTable { .. })
    }

    /// Check if this error was caused by an enum-like parameter outside its allowed set.
    pub fn is_invalid_keyword(&self) -> bool {
        matches!(
            self,
            Self::InvalidOperator { .. } | Self::InvalidDirection { .. } | Self::InvalidJoinType { .. }
        )
    }
}

/// Count `?` placeholders outside single-quoted literals.
pub(crate) fn count_placeholders(sql: &str) -> usize {
    let mut in_quote = false;
    let mut count = 0;
    for c in sql.chars() {
        match c {
            '\'' => in_quote = !in_quote,
            '?' if !in_quote => count += 1,
            _ => {}
        }
    }
    count
}

/// Fail with [`ClauseError::MismatchedPlaceholder`] unless `sql` binds exactly `params` values.
pub(crate) fn ensure_placeholders(sql: &str, params: usize) -> ClauseResult<()> {
    let placeholders = count_placeholders(sql);
    if placeholders != params {
        return Err(ClauseError::MismatchedPlaceholder {
            fragment: sql.to_string(),
            placeholders,
            params,
        });
    }
    Ok(())
}
