//! Minimal `CREATE TABLE` extraction.
//!
//! Only table names and column names are recovered. Column types, defaults and
//! constraints are skipped; nothing else in the source text is interpreted.

use super::registry::TableSchema;
use crate::error::{SchemaError, SchemaResult};
use regex::Regex;
use std::sync::LazyLock;

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[^\n]*").expect("valid regex"));

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bcreate\s+(?:(?:global\s+|local\s+)?(?:temporary|temp|unlogged)\s+)?table\s+(?:if\s+not\s+exists\s+)?",
    )
    .expect("valid regex")
});

/// Leading keywords of table-level constraint lines inside the column list.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "FOREIGN",
    "PRIMARY",
    "REFERENCES",
    "CONSTRAINT",
    "UNIQUE",
    "CHECK",
    "EXCLUDE",
    "LIKE",
];

/// Parse every `CREATE TABLE` statement in `source`.
pub(crate) fn parse_tables(source: &str) -> SchemaResult<Vec<TableSchema>> {
    let without_blocks = BLOCK_COMMENT.replace_all(source, " ");
    let text = LINE_COMMENT.replace_all(&without_blocks, "");

    let mut tables = Vec::new();
    for m in CREATE_TABLE.find_iter(&text) {
        let rest = &text[m.end()..];
        let Some(open) = rest.find('(') else {
            return Err(SchemaError::MissingTableName {
                statement: snippet(&text[m.start()..]),
            });
        };

        let raw_name = rest[..open].trim();
        let name = normalize_table_name(raw_name).ok_or_else(|| SchemaError::MissingTableName {
            statement: snippet(&text[m.start()..]),
        })?;

        let body = column_list(&rest[open + 1..]).ok_or_else(|| SchemaError::Unbalanced {
            table: name.clone(),
        })?;

        let mut table = TableSchema::new(&name);
        for item in split_top_level(body) {
            if let Some(column) = column_name(item) {
                table.add_column(column);
            }
        }
        tables.push(table);
    }

    Ok(tables)
}

/// `public."Users"` -> `users`. Returns `None` when no identifier is present.
fn normalize_table_name(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.contains(';') || raw.split_whitespace().count() != 1 {
        return None;
    }
    let last = raw.rsplit('.').next()?.trim_matches('"');
    let valid = !last.is_empty()
        && last
            .chars()
            .all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric());
    valid.then(|| last.to_ascii_lowercase())
}

/// Slice up to (not including) the parenthesis closing the column list.
fn column_list(after_open: &str) -> Option<&str> {
    let mut depth = 1usize;
    let mut in_quote = false;
    for (idx, c) in after_open.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    return Some(&after_open[..idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside parentheses or quotes.
///
/// Handles both one-definition-per-line layouts and `numeric(10, 2)` style types.
pub(crate) fn split_top_level(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0;
    for (idx, c) in body.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            ',' if !in_quote && depth == 0 => {
                items.push(body[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    items.push(body[start..].trim());
    items.retain(|s| !s.is_empty());
    items
}

fn column_name(definition: &str) -> Option<String> {
    let first = definition.split_whitespace().next()?;
    let upper = first.to_ascii_uppercase();
    if STRUCTURAL_KEYWORDS.contains(&upper.as_str()) {
        return None;
    }
    let name = first.trim_matches('"');
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

fn snippet(s: &str) -> String {
    let line = s.lines().next().unwrap_or_default().trim();
    match line.char_indices().nth(80) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}
