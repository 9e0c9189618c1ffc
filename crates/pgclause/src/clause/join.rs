use super::{Fragment, JoinType, Operator, is_null_value};
use crate::error::{ClauseError, ClauseResult};
use crate::field::{FieldToken, JoinedTable, Scope};
use crate::query::{Join, OnCondition};

/// Split `name AS alias` into its parts. The `AS` keyword is case-insensitive.
pub fn split_table_alias(table: &str) -> (String, Option<String>) {
    let t = table.trim();
    let lower = t.to_ascii_lowercase();
    match lower.find(" as ") {
        Some(idx) => {
            let name = t[..idx].trim().to_ascii_lowercase();
            let alias = t[idx + 4..].trim().to_ascii_lowercase();
            (name, (!alias.is_empty()).then_some(alias))
        }
        None => (lower, None),
    }
}

/// Compile JOINs in declaration order.
///
/// Each join is added to `scope` once compiled, so an ON condition may refer to
/// the statement table, its own table, or any earlier join. Literal right-hand
/// operands are bound as parameters.
pub fn compile_joins(
    scope: &mut Scope<'_>,
    joins: &[Join],
    ignore_soft_delete: bool,
) -> ClauseResult<Fragment> {
    let mut fragments = Vec::with_capacity(joins.len());
    let mut params = Vec::new();

    for join in joins {
        let (table, alias) = split_table_alias(&join.table);
        let registry = scope.registry();
        if !registry.table_exists(&table) {
            return Err(ClauseError::unknown_table(table));
        }
        let join_type = JoinType::parse(&join.join_type, &table)?;
        if join.on.is_empty() {
            return Err(ClauseError::empty("JOIN ON"));
        }

        let joined = JoinedTable {
            table: table.clone(),
            alias: alias.clone(),
        };
        let reference = joined.reference().to_string();
        scope.push_join(joined);

        let mut on = Vec::with_capacity(join.on.len() + 1);
        for condition in &join.on {
            on.push(compile_on(scope, &table, &reference, condition, &mut params)?);
        }
        if !ignore_soft_delete && registry.has_soft_delete_marker(&table) {
            on.push(format!(
                "{reference}.{} IS NULL",
                registry.soft_delete_column()
            ));
        }

        let target = match &alias {
            Some(alias) => format!("{table} AS {alias}"),
            None => table.clone(),
        };
        fragments.push(format!(
            "{} {target} ON {}",
            join_type.as_sql(),
            on.join(" AND ")
        ));
    }

    Ok(Fragment::new(fragments.join(" "), params))
}

fn compile_on(
    scope: &Scope<'_>,
    table: &str,
    reference: &str,
    condition: &OnCondition,
    params: &mut Vec<String>,
) -> ClauseResult<String> {
    let left = condition.left.trim();
    let left_sql = match FieldToken::classify(left) {
        // A bare primary field belongs to the joined table.
        FieldToken::Column {
            qualifier: None,
            column,
        } if scope.registry().has_column(table, column) => {
            format!("{reference}.{}", column.to_ascii_lowercase())
        }
        _ => {
            scope.resolve(left)?;
            left.to_string()
        }
    };

    let op = Operator::parse(&condition.op, left)?;
    if op.is_array() {
        return Err(ClauseError::InvalidOperator {
            op: condition.op.trim().to_string(),
            field: left.to_string(),
        });
    }

    let right = condition.right.trim();
    let right_sql = if is_reference(right) {
        scope.resolve(right)?;
        right.to_string()
    } else if is_null_value(right) {
        "NULL".to_string()
    } else {
        params.push(right.to_string());
        "?".to_string()
    };

    Ok(format!("{left_sql} {} {right_sql}", op.as_sql()))
}

/// A `qualifier.column` operand, as opposed to a literal such as `1.5` or `'a.b'`.
fn is_reference(operand: &str) -> bool {
    operand.contains('.')
        && matches!(
            FieldToken::classify(operand),
            FieldToken::Column {
                qualifier: Some(_),
                ..
            }
        )
}
