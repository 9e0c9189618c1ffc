//! SET and INSERT payload compilers.

use super::{Fragment, is_null_value};
use crate::error::{ClauseError, ClauseResult, count_placeholders};
use crate::field::{FieldToken, Scope};
use crate::query::Assignment;
use crate::raw::strip_raw_prefix;

/// Column list, VALUES list, and bound parameters of an INSERT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertParts {
    pub columns: Vec<String>,
    pub values: Vec<String>,
    pub params: Vec<String>,
}

/// Compile UPDATE assignments (without the `SET` keyword).
///
/// - `sql:>` fields are emitted verbatim, unvalidated
/// - a field containing `=` is a raw assignment checked on its left-hand column;
///   if it carries a `?`, the value is bound to it
/// - a NULL value renders `column = NULL`
/// - anything else renders `column = ?`
pub fn compile_set(scope: &Scope<'_>, data: &[Assignment]) -> ClauseResult<Fragment> {
    if data.is_empty() {
        return Err(ClauseError::empty("SET"));
    }

    let mut parts = Vec::with_capacity(data.len());
    let mut params = Vec::new();
    for assignment in data {
        if let Some(raw) = strip_raw_prefix(&assignment.field) {
            bind_raw(raw, &assignment.value, &mut params)?;
            parts.push(raw.to_string());
            continue;
        }

        let field = assignment.field.trim();
        if let Some((lhs, _)) = field.split_once('=') {
            column_name(scope, lhs.trim())?;
            bind_raw(field, &assignment.value, &mut params)?;
            parts.push(field.to_string());
            continue;
        }

        let column = column_name(scope, field)?;
        if is_null_value(&assignment.value) {
            parts.push(format!("{column} = NULL"));
        } else {
            parts.push(format!("{column} = ?"));
            params.push(assignment.value.clone());
        }
    }

    Ok(Fragment::new(parts.join(", "), params))
}

/// Compile INSERT column/value pairs. Table qualifiers are stripped from the
/// column names.
pub fn compile_insert(scope: &Scope<'_>, data: &[Assignment]) -> ClauseResult<InsertParts> {
    if data.is_empty() {
        return Err(ClauseError::empty("INSERT data"));
    }

    let mut parts = InsertParts::default();
    for assignment in data {
        let column = column_name(scope, assignment.field.trim())?;
        parts.columns.push(column);
        if is_null_value(&assignment.value) {
            parts.values.push("NULL".to_string());
        } else {
            parts.values.push("?".to_string());
            parts.params.push(assignment.value.clone());
        }
    }
    Ok(parts)
}

/// Resolve a column-shaped token on the statement table and return its bare name.
fn column_name(scope: &Scope<'_>, field: &str) -> ClauseResult<String> {
    match FieldToken::classify(field) {
        FieldToken::Column { qualifier, column } => {
            let resolved = scope.resolve_column(qualifier, column, field)?;
            if resolved.table != scope.table() {
                return Err(ClauseError::UnknownField {
                    field: field.to_string(),
                    table: scope.table().to_string(),
                    column: resolved.column,
                    candidates: Vec::new(),
                });
            }
            Ok(resolved.column)
        }
        _ => Err(ClauseError::UnknownField {
            field: field.to_string(),
            table: scope.table().to_string(),
            column: field.to_string(),
            candidates: Vec::new(),
        }),
    }
}

/// A raw assignment binds its value only when it carries a placeholder.
fn bind_raw(fragment: &str, value: &str, params: &mut Vec<String>) -> ClauseResult<()> {
    match count_placeholders(fragment) {
        0 => Ok(()),
        1 => {
            params.push(value.to_string());
            Ok(())
        }
        placeholders => Err(ClauseError::MismatchedPlaceholder {
            fragment: fragment.to_string(),
            placeholders,
            params: 1,
        }),
    }
}
