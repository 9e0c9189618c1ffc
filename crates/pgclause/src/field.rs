//! Field reference classification and resolution.
//!
//! Every free-form field token is first classified into a [`FieldToken`] by its
//! shape, then checked against the tables in a [`Scope`]. Each variant carries its
//! own validation rule:
//!
//! | Token                       | Variant      | Rule                                   |
//! |-----------------------------|--------------|----------------------------------------|
//! | `*`, `actions.*`            | `Wildcard`   | always valid                           |
//! | `count(actions.id)`         | `Function`   | arguments checked unless they contain whitespace |
//! | `actions.name AS n`         | `Aliased`    | left-hand side checked                 |
//! | `created_at::date`          | `Cast`       | left-hand side checked                 |
//! | `42`, `'x'`, `?`, `null`    | `Literal`    | always valid                           |
//! | `name`, `p.name`            | `Column`     | must resolve to a registered column    |
//! | anything else               | `Expression` | rejected (ORDER BY checks its `t.col` references) |

use crate::error::{ClauseError, ClauseResult};
use crate::schema::{SchemaRegistry, split_top_level};

/// Shape of a field token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldToken<'a> {
    /// `*` or `qualifier.*`.
    Wildcard { qualifier: Option<&'a str> },
    /// `name(args)`; `args` is the raw text between the outer parentheses.
    Function { name: &'a str, args: &'a str },
    /// `expr AS alias`.
    Aliased {
        expr: Box<FieldToken<'a>>,
        alias: &'a str,
    },
    /// `expr::type`.
    Cast {
        expr: Box<FieldToken<'a>>,
        ty: &'a str,
    },
    /// Number, quoted string, placeholder, or boolean/NULL keyword.
    Literal(&'a str),
    /// `column` or `qualifier.column`.
    Column {
        qualifier: Option<&'a str>,
        column: &'a str,
    },
    /// Anything that does not fit the shapes above.
    Expression(&'a str),
}

impl<'a> FieldToken<'a> {
    /// Classify a raw token by shape.
    pub fn classify(token: &'a str) -> Self {
        let t = token.trim();

        if t == "*" {
            return Self::Wildcard { qualifier: None };
        }
        if let Some(q) = t.strip_suffix(".*") {
            if is_identifier(q) {
                return Self::Wildcard { qualifier: Some(q) };
            }
        }
        if let Some((name, args)) = split_function(t) {
            return Self::Function { name, args };
        }
        if let Some((expr, alias)) = split_alias(t) {
            return Self::Aliased {
                expr: Box::new(Self::classify(expr)),
                alias,
            };
        }
        if let Some((expr, ty)) = split_cast(t) {
            return Self::Cast {
                expr: Box::new(Self::classify(expr)),
                ty,
            };
        }
        if is_literal(t) {
            return Self::Literal(t);
        }
        match t.split_once('.') {
            Some((q, c)) if is_identifier(q) && is_identifier(c) => Self::Column {
                qualifier: Some(q),
                column: c,
            },
            None if is_identifier(t) => Self::Column {
                qualifier: None,
                column: t,
            },
            _ => Self::Expression(t),
        }
    }

    /// Alias introduced by an `AS` clause, if any.
    pub fn alias(&self) -> Option<&'a str> {
        match self {
            Self::Aliased { alias, .. } => Some(*alias),
            _ => None,
        }
    }

    /// Innermost column reference (through aliases and casts).
    pub fn column_ref(&self) -> Option<(Option<&'a str>, &'a str)> {
        match self {
            Self::Column { qualifier, column } => Some((*qualifier, *column)),
            Self::Aliased { expr, .. } | Self::Cast { expr, .. } => expr.column_ref(),
            _ => None,
        }
    }
}

/// A table joined into the current statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedTable {
    /// Real table name.
    pub table: String,
    /// Alias from `table AS alias`.
    pub alias: Option<String>,
}

impl JoinedTable {
    /// Name used to qualify this table's columns in SQL.
    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// A column reference resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Real table name.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Qualifier valid in SQL (alias when the table is aliased).
    pub reference: String,
}

impl ResolvedField {
    /// Canonical `table.column`.
    pub fn canonical(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

/// Tables visible to a field reference: the statement's table plus the joins
/// compiled so far. A join only sees itself and the joins declared before it.
#[derive(Debug, Clone)]
pub struct Scope<'r> {
    registry: &'r SchemaRegistry,
    table: String,
    joined: Vec<JoinedTable>,
}

impl<'r> Scope<'r> {
    /// Create a scope rooted at `table`.
    pub fn new(registry: &'r SchemaRegistry, table: &str) -> ClauseResult<Self> {
        let table = table.trim().to_ascii_lowercase();
        if !registry.table_exists(&table) {
            return Err(ClauseError::unknown_table(table));
        }
        Ok(Self {
            registry,
            table,
            joined: Vec::new(),
        })
    }

    /// The registry this scope validates against.
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// The statement's own table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Joins visible so far, in declaration order.
    pub fn joined(&self) -> &[JoinedTable] {
        &self.joined
    }

    pub(crate) fn push_join(&mut self, joined: JoinedTable) {
        self.joined.push(joined);
    }

    /// Classify and check a field token.
    ///
    /// Returns the resolved column for column-shaped tokens (including aliased and
    /// cast columns) and `None` for wildcards, literals, and functions.
    pub fn resolve(&self, field: &str) -> ClauseResult<Option<ResolvedField>> {
        let token = FieldToken::classify(field);
        self.check_token(&token, field)
    }

    /// Resolve a column reference, qualifying bare names against the statement
    /// table first and then each join in order.
    pub fn resolve_column(
        &self,
        qualifier: Option<&str>,
        column: &str,
        field: &str,
    ) -> ClauseResult<ResolvedField> {
        let column = unquote(column).to_ascii_lowercase();

        match qualifier {
            Some(q) => {
                let q = unquote(q).to_ascii_lowercase();
                match self.table_for_qualifier(&q) {
                    Some(table) if self.registry.has_column(table, &column) => Ok(ResolvedField {
                        table: table.to_string(),
                        column,
                        reference: q,
                    }),
                    Some(table) => Err(self.unknown(field, table, &column)),
                    None => Err(self.unknown(field, &q, &column)),
                }
            }
            None => {
                if self.registry.has_column(&self.table, &column) {
                    return Ok(ResolvedField {
                        table: self.table.clone(),
                        column,
                        reference: self.table.clone(),
                    });
                }
                self.joined
                    .iter()
                    .find(|j| self.registry.has_column(&j.table, &column))
                    .map(|j| ResolvedField {
                        table: j.table.clone(),
                        column: column.clone(),
                        reference: j.reference().to_string(),
                    })
                    .ok_or_else(|| self.unknown(field, &self.table, &column))
            }
        }
    }

    /// Check the qualified `table.column` references inside a free-form
    /// expression. Bare words are left alone since they may be keywords
    /// (`NULLS LAST`, `CASE WHEN`).
    pub fn check_references(&self, expr: &str) -> ClauseResult<()> {
        for word in expression_words(expr) {
            if let FieldToken::Column {
                qualifier: Some(qualifier),
                column,
            } = FieldToken::classify(word)
            {
                self.resolve_column(Some(qualifier), column, expr)?;
            }
        }
        Ok(())
    }

    fn check_token(
        &self,
        token: &FieldToken<'_>,
        raw: &str,
    ) -> ClauseResult<Option<ResolvedField>> {
        match token {
            FieldToken::Wildcard { .. } | FieldToken::Literal(_) => Ok(None),
            FieldToken::Function { args, .. } => {
                self.check_args(args)?;
                Ok(None)
            }
            FieldToken::Aliased { expr, .. } | FieldToken::Cast { expr, .. } => {
                self.check_token(expr, raw)
            }
            FieldToken::Column { qualifier, column } => {
                self.resolve_column(*qualifier, column, raw).map(Some)
            }
            FieldToken::Expression(expr) => Err(self.unknown(raw, &self.table, expr)),
        }
    }

    fn check_args(&self, args: &str) -> ClauseResult<()> {
        // Arguments with whitespace are accepted unchecked rather than parsed.
        if args.chars().any(char::is_whitespace) {
            return Ok(());
        }
        for arg in split_top_level(args) {
            let token = FieldToken::classify(arg);
            self.check_token(&token, arg)?;
        }
        Ok(())
    }

    fn table_for_qualifier(&self, qualifier: &str) -> Option<&str> {
        if qualifier == self.table {
            return Some(&self.table);
        }
        self.joined
            .iter()
            .find(|j| j.reference() == qualifier)
            .map(|j| j.table.as_str())
    }

    fn unknown(&self, field: &str, table: &str, column: &str) -> ClauseError {
        ClauseError::UnknownField {
            field: field.trim().to_string(),
            table: table.to_string(),
            column: column.to_string(),
            candidates: self
                .joined
                .iter()
                .map(|j| match &j.alias {
                    Some(alias) => format!("{alias} -> {}", j.table),
                    None => j.table.clone(),
                })
                .collect(),
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_$]*`, optionally wrapped in double quotes.
pub(crate) fn is_identifier(s: &str) -> bool {
    let s = unquote(s);
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

fn is_literal(t: &str) -> bool {
    if t == "?" || (t.len() >= 2 && t.starts_with('\'') && t.ends_with('\'')) {
        return true;
    }
    if ["true", "false", "null"]
        .iter()
        .any(|k| t.eq_ignore_ascii_case(k))
    {
        return true;
    }
    let digits = t.strip_prefix('-').unwrap_or(t);
    !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1
}

/// Identifier-like words of `expr` outside single-quoted literals.
fn expression_words(expr: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = None;
    let mut in_quote = false;
    for (idx, c) in expr.char_indices() {
        let word_char = !in_quote
            && (c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '"'));
        match (word_char, start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                words.push(&expr[s..idx]);
                start = None;
            }
            _ => {}
        }
        if c == '\'' {
            in_quote = !in_quote;
        }
    }
    if let Some(s) = start {
        words.push(&expr[s..]);
    }
    words
}

/// `name(args)` where the first `(` closes at the last character.
fn split_function(t: &str) -> Option<(&str, &str)> {
    let open = t.find('(')?;
    let name = t[..open].trim_end();
    if !t.ends_with(')') || !is_identifier(name) || name.starts_with('"') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_quote = false;
    for (offset, c) in t[open..].char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    let close = open + offset;
                    return (close == t.len() - 1).then(|| (name, &t[open + 1..close]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offsets of `needle` outside parentheses and quotes.
fn top_level_matches(haystack: &str, needle: &str) -> Vec<usize> {
    let lower = haystack.to_ascii_lowercase();
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    for (idx, c) in haystack.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            _ if !in_quote && depth == 0 && lower[idx..].starts_with(needle) => found.push(idx),
            _ => {}
        }
    }
    found
}

fn split_alias(t: &str) -> Option<(&str, &str)> {
    let idx = *top_level_matches(t, " as ").last()?;
    let expr = t[..idx].trim();
    let alias = t[idx + 4..].trim();
    (!expr.is_empty() && is_identifier(alias)).then_some((expr, alias))
}

fn split_cast(t: &str) -> Option<(&str, &str)> {
    let idx = *top_level_matches(t, "::").first()?;
    let expr = t[..idx].trim();
    let ty = t[idx + 2..].trim();
    (!expr.is_empty() && !ty.is_empty()).then_some((expr, ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_sql(
            "CREATE TABLE actions (id INT, project_id INT, name TEXT, created_at TIMESTAMP);
             CREATE TABLE project (id INT, title TEXT, owner_id INT);
             CREATE TABLE person (id INT, email TEXT);",
        )
        .unwrap()
    }

    #[test]
    fn test_classify_shapes() {
        assert_eq!(
            FieldToken::classify("*"),
            FieldToken::Wildcard { qualifier: None }
        );
        assert_eq!(
            FieldToken::classify("actions.*"),
            FieldToken::Wildcard {
                qualifier: Some("actions")
            }
        );
        assert_eq!(
            FieldToken::classify("COUNT(actions.id)"),
            FieldToken::Function {
                name: "COUNT",
                args: "actions.id"
            }
        );
        assert_eq!(
            FieldToken::classify("p.title AS project_title").alias(),
            Some("project_title")
        );
        assert_eq!(
            FieldToken::classify("created_at::date").column_ref(),
            Some((None, "created_at"))
        );
        assert_eq!(FieldToken::classify("42"), FieldToken::Literal("42"));
        assert_eq!(FieldToken::classify("'x y'"), FieldToken::Literal("'x y'"));
        assert_eq!(
            FieldToken::classify("name"),
            FieldToken::Column {
                qualifier: None,
                column: "name"
            }
        );
        assert_eq!(
            FieldToken::classify("a + b"),
            FieldToken::Expression("a + b")
        );
    }

    #[test]
    fn test_function_must_wrap_whole_token() {
        assert!(matches!(
            FieldToken::classify("lower(a) || upper(b)"),
            FieldToken::Expression(_)
        ));
        assert!(matches!(
            FieldToken::classify("count(x) as total"),
            FieldToken::Aliased { .. }
        ));
    }

    #[test]
    fn test_alias_inside_function_is_not_split() {
        assert_eq!(
            FieldToken::classify("cast(x as int)"),
            FieldToken::Function {
                name: "cast",
                args: "x as int"
            }
        );
    }

    #[test]
    fn test_bare_column_resolves_to_statement_table() {
        let reg = registry();
        let scope = Scope::new(&reg, "actions").unwrap();
        let resolved = scope.resolve("name").unwrap().unwrap();
        assert_eq!(resolved.canonical(), "actions.name");
        assert_eq!(resolved.reference, "actions");
    }

    #[test]
    fn test_bare_column_falls_back_to_join_alias() {
        let reg = registry();
        let mut scope = Scope::new(&reg, "actions").unwrap();
        scope.push_join(JoinedTable {
            table: "project".into(),
            alias: Some("p".into()),
        });
        let resolved = scope.resolve("title").unwrap().unwrap();
        assert_eq!(resolved.canonical(), "project.title");
        assert_eq!(resolved.reference, "p");

        let aliased = scope.resolve("p.owner_id").unwrap().unwrap();
        assert_eq!(aliased.canonical(), "project.owner_id");
    }

    #[test]
    fn test_qualifier_must_be_in_scope() {
        let reg = registry();
        let scope = Scope::new(&reg, "actions").unwrap();
        let err = scope.resolve("person.email").unwrap_err();
        assert!(err.is_unknown_field());
    }

    #[test]
    fn test_unknown_column_carries_alias_context() {
        let reg = registry();
        let mut scope = Scope::new(&reg, "actions").unwrap();
        scope.push_join(JoinedTable {
            table: "project".into(),
            alias: Some("p".into()),
        });
        let err = scope.resolve("nope").unwrap_err();
        assert_eq!(
            err,
            ClauseError::UnknownField {
                field: "nope".into(),
                table: "actions".into(),
                column: "nope".into(),
                candidates: vec!["p -> project".into()],
            }
        );
    }

    #[test]
    fn test_function_arguments() {
        let reg = registry();
        let scope = Scope::new(&reg, "actions").unwrap();
        assert!(scope.resolve("count(*)").unwrap().is_none());
        assert!(scope.resolve("now()").is_ok());
        assert!(scope.resolve("coalesce(name,'none')").is_ok());
        assert!(scope.resolve("lower(trim(name))").is_ok());
        assert!(scope.resolve("max(missing)").unwrap_err().is_unknown_field());
        // Whitespace inside the arguments skips validation.
        assert!(scope.resolve("count(DISTINCT missing)").is_ok());
    }

    #[test]
    fn test_unknown_table_scope() {
        let reg = registry();
        let err = Scope::new(&reg, "tasks").unwrap_err();
        assert!(err.is_unknown_table());
    }

    #[test]
    fn test_expression_is_rejected() {
        let reg = registry();
        let scope = Scope::new(&reg, "actions").unwrap();
        assert!(scope.resolve("id + 1").unwrap_err().is_unknown_field());
    }
}
