use crate::error::ClauseResult;
use crate::field::Scope;

/// Compile GROUP BY tokens (without the `GROUP BY` keyword).
///
/// Each token resolves against the statement table first, then each join in
/// declaration order; the first match wins.
pub fn compile_group_by(scope: &Scope<'_>, fields: &[String]) -> ClauseResult<String> {
    let mut parts = Vec::with_capacity(fields.len());
    for field in fields {
        let field = field.trim();
        scope.resolve(field)?;
        parts.push(field.to_string());
    }
    Ok(parts.join(", "))
}
