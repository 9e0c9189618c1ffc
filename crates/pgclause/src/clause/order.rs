use super::Direction;
use crate::error::ClauseResult;
use crate::field::{FieldToken, Scope};
use crate::query::OrderBy;

/// Compile ORDER BY items (without the `ORDER BY` keyword).
///
/// Field tokens are resolved like SELECT tokens. Free-form expressions such as
/// `actions.count + 1` or `name NULLS LAST` only have their qualified column
/// references checked.
///
/// Returns an empty string for an empty list.
pub fn compile_order(scope: &Scope<'_>, items: &[OrderBy]) -> ClauseResult<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let field = item.field.trim();
        let direction = Direction::parse(&item.direction, field)?;
        match FieldToken::classify(field) {
            FieldToken::Expression(expr) => scope.check_references(expr)?,
            _ => {
                scope.resolve(field)?;
            }
        }
        parts.push(match direction.as_sql() {
            Some(keyword) => format!("{field} {keyword}"),
            None => field.to_string(),
        });
    }
    Ok(parts.join(", "))
}
