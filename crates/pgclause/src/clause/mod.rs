//! Clause compilers.
//!
//! Each compiler consumes one part of a clause description, checks every field
//! through a [`Scope`](crate::field::Scope), and produces SQL text plus the
//! positional parameters it introduced. Compilers never touch the registry
//! mutably, so any number of compilations can share one registry.

mod data;
mod group;
mod join;
mod order;
mod select;
mod where_clause;


pub use data::{InsertParts, compile_insert, compile_set};
pub use group::compile_group_by;
pub use join::{compile_joins, split_table_alias};
pub use order::compile_order;
pub use select::{SelectItem, compile_select_list, lowercase_outside_quotes};
pub use where_clause::{WhereBuilder, compile_filter, compile_where};

use crate::error::{ClauseError, ClauseResult};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// A compiled SQL fragment with the values bound to its `?` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<String>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Non-fatal hint produced during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    /// Stable identifier, e.g. `index-order`.
    pub code: &'static str,
    pub field: String,
    pub message: String,
}

impl Advisory {
    pub(crate) fn index_order(field: &str, position: usize) -> Self {
        Self {
            code: "index-order",
            field: field.to_string(),
            message: format!(
                "'{field}' is condition #{} of the WHERE clause; place it first to match the index column order",
                position + 1
            ),
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

static ARRAY_OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(=\s*any|<>\s*all)\s*\(\s*\?\s*::\s*([a-z_][a-z0-9_ ]*?)\s*\[\s*\]\s*\)$")
        .expect("valid array operator regex")
});

/// WHERE / ON comparison operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    LtGt,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    ILike,
    NotLike,
    NotILike,
    Is,
    IsNot,
    Between,
    NotBetween,
    /// `= ANY(?::type[])`. The value `1,2,3` binds `{1,2,3}`; a value already
    /// written as `{1,2,3}` binds as-is.
    AnyArray(String),
    /// `<> ALL(?::type[])`
    AllArray(String),
}

impl Operator {
    /// Parse an operator string.
    ///
    /// Matching ignores case and repeated whitespace. `IN` and `NOT IN` are
    /// rejected: membership tests go through the array forms.
    pub fn parse(op: &str, field: &str) -> ClauseResult<Self> {
        let normalized = op.split_whitespace().collect::<Vec<_>>().join(" ");
        let parsed = match normalized.to_ascii_uppercase().as_str() {
            "=" => Self::Eq,
            "!=" => Self::NotEq,
            "<>" => Self::LtGt,
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::Gte,
            "<=" => Self::Lte,
            "LIKE" => Self::Like,
            "ILIKE" => Self::ILike,
            "NOT LIKE" => Self::NotLike,
            "NOT ILIKE" => Self::NotILike,
            "IS" => Self::Is,
            "IS NOT" => Self::IsNot,
            "BETWEEN" => Self::Between,
            "NOT BETWEEN" => Self::NotBetween,
            _ => {
                let caps = ARRAY_OPERATOR
                    .captures(&normalized)
                    .ok_or_else(|| ClauseError::InvalidOperator {
                        op: op.trim().to_string(),
                        field: field.trim().to_string(),
                    })?;
                let ty = caps[2].to_ascii_lowercase();
                if caps[1].starts_with('=') {
                    Self::AnyArray(ty)
                } else {
                    Self::AllArray(ty)
                }
            }
        };
        Ok(parsed)
    }

    /// Canonical SQL spelling.
    pub fn as_sql(&self) -> String {
        match self {
            Self::Eq => "=".into(),
            Self::NotEq => "!=".into(),
            Self::LtGt => "<>".into(),
            Self::Gt => ">".into(),
            Self::Lt => "<".into(),
            Self::Gte => ">=".into(),
            Self::Lte => "<=".into(),
            Self::Like => "LIKE".into(),
            Self::ILike => "ILIKE".into(),
            Self::NotLike => "NOT LIKE".into(),
            Self::NotILike => "NOT ILIKE".into(),
            Self::Is => "IS".into(),
            Self::IsNot => "IS NOT".into(),
            Self::Between => "BETWEEN".into(),
            Self::NotBetween => "NOT BETWEEN".into(),
            Self::AnyArray(ty) => format!("= ANY(?::{ty}[])"),
            Self::AllArray(ty) => format!("<> ALL(?::{ty}[])"),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::AnyArray(_) | Self::AllArray(_))
    }

    pub fn is_between(&self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }

    pub fn is_is(&self) -> bool {
        matches!(self, Self::Is | Self::IsNot)
    }
}

/// JOIN kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn parse(join_type: &str, table: &str) -> ClauseResult<Self> {
        match join_type.trim().to_ascii_uppercase().as_str() {
            "INNER" => Ok(Self::Inner),
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            "FULL" => Ok(Self::Full),
            _ => Err(ClauseError::InvalidJoinType {
                join_type: join_type.trim().to_string(),
                table: table.trim().to_string(),
            }),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// ORDER BY direction. `Ignore` renders no keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
    Ignore,
}

impl Direction {
    pub fn parse(direction: &str, field: &str) -> ClauseResult<Self> {
        match direction.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            "IGNORE" => Ok(Self::Ignore),
            _ => Err(ClauseError::InvalidDirection {
                direction: direction.trim().to_string(),
                field: field.trim().to_string(),
            }),
        }
    }

    pub fn as_sql(self) -> Option<&'static str> {
        match self {
            Self::Asc => Some("ASC"),
            Self::Desc => Some("DESC"),
            Self::Ignore => None,
        }
    }
}

/// `NULL`, `null`, or empty: rendered as the SQL keyword instead of a parameter.
pub(crate) fn is_null_value(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("null")
}
