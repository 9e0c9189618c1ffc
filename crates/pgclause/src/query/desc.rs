//! Clause descriptions: the structured request for one statement.
//!
//! All enum-like inputs (operators, join types, directions) are plain strings here
//! and are parsed by the compilers, so a description loaded from a manifest and one
//! built in code are rejected for exactly the same reasons.

use crate::raw::raw;
use serde::{Deserialize, Serialize};

/// One WHERE condition.
///
/// The sub-kind is decided by shape:
/// - `field`, `op`, `value` set: a normal predicate
/// - `op` and `value` empty: `field` is printed verbatim
/// - `field` starts with [`RAW_SQL_PREFIX`](crate::RAW_SQL_PREFIX): unvalidated and parenthesized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub op: String,
    #[serde(default)]
    pub value: String,
    /// Values bound to `?` placeholders inside `value` or a raw `field`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Condition {
    /// `field op value`.
    pub fn new(field: impl Into<String>, op: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            value: value.into(),
            args: Vec::new(),
        }
    }

    /// A pre-formed fragment printed verbatim.
    pub fn verbatim(fragment: impl Into<String>) -> Self {
        Self {
            field: fragment.into(),
            ..Self::default()
        }
    }

    /// An unvalidated, parenthesized raw SQL fragment.
    pub fn raw_sql(sql: &str) -> Self {
        Self::verbatim(raw(sql))
    }

    /// Attach values for `?` placeholders.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn is_verbatim(&self) -> bool {
        self.op.trim().is_empty() && self.value.is_empty()
    }
}

/// One `ON` condition of a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCondition {
    pub left: String,
    #[serde(default = "default_eq")]
    pub op: String,
    /// A `table.column` reference, or a literal bound as a parameter.
    pub right: String,
}

impl OnCondition {
    pub fn new(left: impl Into<String>, op: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            op: op.into(),
            right: right.into(),
        }
    }
}

fn default_eq() -> String {
    "=".to_string()
}

/// One JOIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    /// `name` or `name AS alias`.
    pub table: String,
    /// `INNER`, `LEFT`, `RIGHT`, or `FULL`.
    #[serde(rename = "type", default = "default_join_type")]
    pub join_type: String,
    #[serde(default)]
    pub on: Vec<OnCondition>,
}

fn default_join_type() -> String {
    "INNER".to_string()
}

impl Join {
    pub fn new(join_type: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            join_type: join_type.into(),
            on: Vec::new(),
        }
    }

    pub fn inner(table: impl Into<String>) -> Self {
        Self::new("INNER", table)
    }

    pub fn left(table: impl Into<String>) -> Self {
        Self::new("LEFT", table)
    }

    pub fn right(table: impl Into<String>) -> Self {
        Self::new("RIGHT", table)
    }

    pub fn full(table: impl Into<String>) -> Self {
        Self::new("FULL", table)
    }

    /// Append an ON condition.
    pub fn on(
        mut self,
        left: impl Into<String>,
        op: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.on.push(OnCondition::new(left, op, right));
        self
    }
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    /// `ASC`, `DESC`, or `IGNORE` (no direction keyword).
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    "ASC".to_string()
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: direction.into(),
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, "ASC")
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, "DESC")
    }

    /// Order by an expression without a direction keyword.
    pub fn ignore(field: impl Into<String>) -> Self {
        Self::new(field, "IGNORE")
    }
}

/// One INSERT column/value pair or UPDATE assignment.
///
/// A `value` of `NULL`/`null`/empty renders the SQL keyword `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

impl Assignment {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A free-form WHERE fragment appended after the compiled conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFragment {
    pub sql: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl RawFragment {
    pub fn new<I, S>(sql: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sql: sql.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

/// SELECT description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectQuery {
    pub table: String,
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default, rename = "join")]
    pub joins: Vec<Join>,
    #[serde(default, rename = "where")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub order: Vec<OrderBy>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub ignore_soft_delete: bool,
    #[serde(default)]
    pub custom_where: Option<RawFragment>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Append a WHERE condition (`field op value`).
    pub fn filter(mut self, field: &str, op: &str, value: &str) -> Self {
        self.conditions.push(Condition::new(field, op, value));
        self
    }

    /// Append a prepared [`Condition`].
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    pub fn group_by(mut self, fields: &[&str]) -> Self {
        self.group_by = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Skip the automatic `<marker> IS NULL` filters.
    pub fn ignore_soft_delete(mut self, ignore: bool) -> Self {
        self.ignore_soft_delete = ignore;
        self
    }

    pub fn custom_where(mut self, fragment: RawFragment) -> Self {
        self.custom_where = Some(fragment);
        self
    }
}

/// INSERT description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertQuery {
    pub table: String,
    #[serde(default)]
    pub data: Vec<Assignment>,
    #[serde(default)]
    pub returning: Vec<String>,
}

impl InsertQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn value(mut self, field: &str, value: &str) -> Self {
        self.data.push(Assignment::new(field, value));
        self
    }

    pub fn returning(mut self, fields: &[&str]) -> Self {
        self.returning = fields.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// UPDATE description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuery {
    pub table: String,
    #[serde(default)]
    pub data: Vec<Assignment>,
    #[serde(default, rename = "where")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub ignore_soft_delete: bool,
    #[serde(default)]
    pub custom_where: Option<RawFragment>,
    #[serde(default)]
    pub returning: Vec<String>,
}

impl UpdateQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn set(mut self, field: &str, value: &str) -> Self {
        self.data.push(Assignment::new(field, value));
        self
    }

    pub fn filter(mut self, field: &str, op: &str, value: &str) -> Self {
        self.conditions.push(Condition::new(field, op, value));
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn ignore_soft_delete(mut self, ignore: bool) -> Self {
        self.ignore_soft_delete = ignore;
        self
    }

    pub fn custom_where(mut self, fragment: RawFragment) -> Self {
        self.custom_where = Some(fragment);
        self
    }

    pub fn returning(mut self, fields: &[&str]) -> Self {
        self.returning = fields.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// DELETE description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteQuery {
    pub table: String,
    #[serde(default, rename = "where")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub ignore_soft_delete: bool,
    #[serde(default)]
    pub custom_where: Option<RawFragment>,
    #[serde(default)]
    pub returning: Vec<String>,
}

impl DeleteQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, field: &str, op: &str, value: &str) -> Self {
        self.conditions.push(Condition::new(field, op, value));
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn ignore_soft_delete(mut self, ignore: bool) -> Self {
        self.ignore_soft_delete = ignore;
        self
    }

    pub fn custom_where(mut self, fragment: RawFragment) -> Self {
        self.custom_where = Some(fragment);
        self
    }

    pub fn returning(mut self, fields: &[&str]) -> Self {
        self.returning = fields.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Any statement description, tagged by `kind` when (de)serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Query {
    Select(SelectQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}

impl Query {
    /// Table the statement targets.
    pub fn table(&self) -> &str {
        match self {
            Self::Select(q) => &q.table,
            Self::Insert(q) => &q.table,
            Self::Update(q) => &q.table,
            Self::Delete(q) => &q.table,
        }
    }
}

impl From<SelectQuery> for Query {
    fn from(q: SelectQuery) -> Self {
        Self::Select(q)
    }
}

impl From<InsertQuery> for Query {
    fn from(q: InsertQuery) -> Self {
        Self::Insert(q)
    }
}

impl From<UpdateQuery> for Query {
    fn from(q: UpdateQuery) -> Self {
        Self::Update(q)
    }
}

impl From<DeleteQuery> for Query {
    fn from(q: DeleteQuery) -> Self {
        Self::Delete(q)
    }
}
