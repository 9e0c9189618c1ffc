use crate::error::{ClauseError, ClauseResult};
use crate::field::{FieldToken, ResolvedField, Scope};

/// A compiled select-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    /// Token as emitted in SQL (lowercased).
    pub expr: String,
    /// `AS` alias, if any.
    pub alias: Option<String>,
    /// Column the token resolved to, for column-shaped tokens.
    pub resolved: Option<ResolvedField>,
}

/// Compile a SELECT (or RETURNING) list.
///
/// Each token is lowercased outside quoted literals, then checked by shape:
/// wildcards pass through, functions and aliases are checked on their inner
/// reference, bare names are qualified against the statement table and then
/// each join.
pub fn compile_select_list(
    scope: &Scope<'_>,
    fields: &[String],
    clause: &'static str,
) -> ClauseResult<Vec<SelectItem>> {
    if fields.is_empty() {
        return Err(ClauseError::empty(clause));
    }
    fields
        .iter()
        .map(|field| {
            let expr = lowercase_outside_quotes(field.trim());
            let resolved = scope.resolve(&expr)?;
            let alias = FieldToken::classify(&expr).alias().map(str::to_string);
            Ok(SelectItem {
                expr,
                alias,
                resolved,
            })
        })
        .collect()
}

/// Lowercase everything except single-quoted literals.
pub fn lowercase_outside_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_quote = false;
    for c in s.chars() {
        if c == '\'' {
            in_quote = !in_quote;
        }
        if in_quote {
            out.push(c);
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}
