//! WHERE clause compiler shared by SELECT, UPDATE and DELETE.

use super::{Advisory, Fragment, Operator};
use crate::error::{ClauseError, ClauseResult, count_placeholders, ensure_placeholders};
use crate::field::Scope;
use crate::query::{Condition, RawFragment};
use crate::raw::parse_escape;

/// Accumulates WHERE conditions and their parameters.
///
/// Conditions are kept in caller order and joined with `AND`.
pub struct WhereBuilder<'s, 'r> {
    scope: &'s Scope<'r>,
    index_hints: &'s [String],
    /// WHERE conditions (without leading AND)
    conditions: Vec<String>,
    params: Vec<String>,
    advisories: Vec<Advisory>,
    /// Caller conditions pushed so far (soft-delete filters excluded).
    position: usize,
}

impl<'s, 'r> WhereBuilder<'s, 'r> {
    pub fn new(scope: &'s Scope<'r>, index_hints: &'s [String]) -> Self {
        Self {
            scope,
            index_hints,
            conditions: Vec::new(),
            params: Vec::new(),
            advisories: Vec::new(),
            position: 0,
        }
    }

    /// Check if any conditions have been added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Advisories raised so far.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Compile and append one caller condition.
    pub fn push(&mut self, condition: &Condition) -> ClauseResult<()> {
        let position = self.position;
        self.position += 1;

        if let Some(fragment) = parse_escape(&condition.field) {
            ensure_placeholders(&fragment, condition.args.len())?;
            self.conditions.push(fragment);
            self.params.extend(condition.args.iter().cloned());
            return Ok(());
        }

        if condition.is_verbatim() {
            let fragment = condition.field.trim();
            if fragment.is_empty() {
                return Err(ClauseError::empty("WHERE condition"));
            }
            ensure_placeholders(fragment, condition.args.len())?;
            self.conditions.push(fragment.to_string());
            self.params.extend(condition.args.iter().cloned());
            return Ok(());
        }

        let field = condition.field.trim();
        self.scope.resolve(field)?;
        let op = Operator::parse(&condition.op, field)?;

        if position > 0 && self.is_index_hint(field) {
            let advisory = Advisory::index_order(field, position);
            tracing::warn!(target: "pgclause.advice", field, position, "{}", advisory.message);
            self.advisories.push(advisory);
        }

        self.push_predicate(field, &op, condition)
    }

    /// Render one predicate. Value rules apply in order: NULL keyword, boolean
    /// literal under IS / IS NOT, array constructor, placeholder-carrying value,
    /// then a single bound parameter.
    fn push_predicate(&mut self, field: &str, op: &Operator, condition: &Condition) -> ClauseResult<()> {
        let value = condition.value.trim();
        let op_sql = op.as_sql();

        if value.eq_ignore_ascii_case("null") {
            self.conditions.push(format!("{field} {op_sql} NULL"));
            return Ok(());
        }

        if op.is_is() && (value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")) {
            self.conditions
                .push(format!("{field} {op_sql} {}", value.to_ascii_uppercase()));
            return Ok(());
        }

        if op.is_array() {
            self.conditions.push(format!("{field} {op_sql}"));
            self.params.push(array_literal(value));
            return Ok(());
        }

        let placeholders = count_placeholders(value);
        if placeholders > 0 {
            if condition.args.is_empty() {
                // Without args the value itself is the one bound parameter.
                ensure_placeholders(value, 1)?;
                self.conditions.push(format!("{field} {op_sql} {value}"));
                self.params.push(value.to_string());
                return Ok(());
            }
            ensure_placeholders(value, condition.args.len())?;
            self.conditions.push(format!("{field} {op_sql} {value}"));
            self.params.extend(condition.args.iter().cloned());
            return Ok(());
        }

        if op.is_between() {
            let bounds = split_between(value);
            if bounds.len() != 2 {
                return Err(ClauseError::MismatchedPlaceholder {
                    fragment: format!("{field} {op_sql} ? AND ?"),
                    placeholders: 2,
                    params: bounds.len(),
                });
            }
            self.conditions.push(format!("{field} {op_sql} ? AND ?"));
            self.params.extend(bounds);
            return Ok(());
        }

        self.conditions.push(format!("{field} {op_sql} ?"));
        self.params.push(condition.value.clone());
        Ok(())
    }

    /// Append `<reference>.<marker> IS NULL` for the statement table when it
    /// carries the soft-delete marker.
    pub fn soft_delete(&mut self) {
        let registry = self.scope.registry();
        let table = self.scope.table();
        if registry.has_soft_delete_marker(table) {
            self.conditions
                .push(format!("{table}.{} IS NULL", registry.soft_delete_column()));
        }
    }

    /// Append a free-form trailing fragment.
    pub fn push_raw(&mut self, fragment: &RawFragment) -> ClauseResult<()> {
        let sql = fragment.sql.trim();
        if sql.is_empty() {
            return Ok(());
        }
        ensure_placeholders(sql, fragment.params.len())?;
        self.conditions.push(sql.to_string());
        self.params.extend(fragment.params.iter().cloned());
        Ok(())
    }

    /// Build the WHERE clause (without the `WHERE` keyword) and its parameters.
    pub fn build(self) -> (Fragment, Vec<Advisory>) {
        (
            Fragment::new(self.conditions.join(" AND "), self.params),
            self.advisories,
        )
    }

    fn is_index_hint(&self, field: &str) -> bool {
        self.index_hints
            .iter()
            .any(|hint| hint.eq_ignore_ascii_case(field))
    }
}

/// Compile a non-empty condition list, appending the soft-delete filter unless
/// `ignore_soft_delete` is set.
pub fn compile_where(
    scope: &Scope<'_>,
    conditions: &[Condition],
    index_hints: &[String],
    ignore_soft_delete: bool,
) -> ClauseResult<(Fragment, Vec<Advisory>)> {
    if conditions.is_empty() {
        return Err(ClauseError::empty("WHERE"));
    }
    compile_filter(scope, conditions, None, index_hints, ignore_soft_delete)
}

/// Compile a statement's whole filter: caller conditions, then the soft-delete
/// filter, then the trailing fragment. An empty result means no WHERE clause.
pub fn compile_filter(
    scope: &Scope<'_>,
    conditions: &[Condition],
    custom_where: Option<&RawFragment>,
    index_hints: &[String],
    ignore_soft_delete: bool,
) -> ClauseResult<(Fragment, Vec<Advisory>)> {
    let mut builder = WhereBuilder::new(scope, index_hints);
    for condition in conditions {
        builder.push(condition)?;
    }
    if !ignore_soft_delete {
        builder.soft_delete();
    }
    if let Some(fragment) = custom_where {
        builder.push_raw(fragment)?;
    }
    Ok(builder.build())
}

/// `1,2,3` -> `{1,2,3}`. A value already in braces is an array literal and is
/// bound unchanged, so `{1,2}` never becomes `{{1,2}}`.
fn array_literal(value: &str) -> String {
    if value.starts_with('{') && value.ends_with('}') {
        value.to_string()
    } else {
        format!("{{{value}}}")
    }
}

/// `1 AND 5` -> `["1", "5"]`.
fn split_between(value: &str) -> Vec<String> {
    let lower = value.to_ascii_lowercase();
    match lower.find(" and ") {
        Some(idx) => vec![
            value[..idx].trim().to_string(),
            value[idx + 5..].trim().to_string(),
        ],
        None => vec![value.to_string()],
    }
}
