//! Rust constants for statically checked queries.

use crate::check::CheckReport;
use heck::ToShoutySnakeCase;
use std::collections::HashSet;

/// Render every compiled query in `report` as a pair of constants:
///
/// ```ignore
/// /// `list_actions` (select on actions)
/// pub const LIST_ACTIONS: &str = "SELECT ...";
/// pub const LIST_ACTIONS_PARAMS: &[&str] = &["123"];
/// ```
///
/// Queries are emitted in name order. Names that collide after case conversion
/// get a numeric suffix.
pub fn render_constants(report: &CheckReport) -> String {
    let mut out = String::new();
    out.push_str("// @generated by pgclause\n");

    let mut compiled: Vec<_> = report.compiled.iter().collect();
    compiled.sort_by(|a, b| a.name.cmp(&b.name));

    let mut seen: HashSet<String> = HashSet::new();
    for query in compiled {
        let ident = unique_ident(&const_ident(&query.name), &mut seen);
        let result = &query.result;
        let params = result
            .params()
            .iter()
            .map(|p| format!("{p:?}"))
            .collect::<Vec<_>>()
            .join(", ");

        out.push('\n');
        out.push_str(&format!(
            "/// `{}` ({} on {})\n",
            query.name,
            result.kind(),
            table_of(result.sql())
        ));
        out.push_str(&format!("pub const {ident}: &str = {:?};\n", result.sql()));
        out.push_str(&format!("pub const {ident}_PARAMS: &[&str] = &[{params}];\n"));
    }
    out
}

fn const_ident(name: &str) -> String {
    let ident: String = name
        .to_shouty_snake_case()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    match ident.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("Q_{ident}"),
        None => "QUERY".to_string(),
        _ => ident,
    }
}

fn unique_ident(base: &str, seen: &mut HashSet<String>) -> String {
    let mut ident = base.to_string();
    let mut n = 2;
    while !seen.insert(ident.clone()) {
        ident = format!("{base}_{n}");
        n += 1;
    }
    ident
}

/// Table named after the first `FROM`, `INTO`, or `UPDATE` keyword.
fn table_of(sql: &str) -> &str {
    let mut words = sql.split_whitespace();
    while let Some(word) = words.next() {
        if matches!(word, "FROM" | "INTO" | "UPDATE") {
            return words.next().unwrap_or("");
        }
    }
    ""
}
