use super::desc::{DeleteQuery, InsertQuery, Query, SelectQuery, UpdateQuery};
use super::result::{QueryResult, StatementKind};
use crate::clause::{
    Advisory, Fragment, SelectItem, compile_filter, compile_group_by, compile_insert,
    compile_joins, compile_order, compile_select_list, compile_set,
};
use crate::error::{ClauseError, ClauseResult, ensure_placeholders};
use crate::field::Scope;
use crate::query::{Condition, RawFragment};
use crate::row::Projection;
use crate::schema::SchemaRegistry;

/// Compilation settings shared by every statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Columns that should lead a WHERE clause to match index order. A later
    /// condition on one of them raises an advisory.
    pub index_hints: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            index_hints: vec!["project_id".to_string()],
        }
    }
}

impl CompileOptions {
    pub fn index_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_hints = hints.into_iter().map(Into::into).collect();
        self
    }
}

/// Assembles compiled clauses into complete statements.
///
/// Clause order is fixed per statement kind, and parameters are concatenated in
/// the order their placeholders appear: SET, JOIN, WHERE, then the trailing
/// free-form fragment.
///
/// # Example
///
/// ```ignore
/// use pgclause::{Compiler, Join, SchemaRegistry, SelectQuery};
///
/// let registry = SchemaRegistry::from_sql(SCHEMA)?;
/// let compiler = Compiler::new(&registry);
/// let query = compiler.select(
///     &SelectQuery::new("actions")
///         .select(&["actions.id", "actions.name"])
///         .join(Join::left("project").on("project.id", "=", "actions.project_id"))
///         .filter("actions.project_id", "=", "123"),
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct Compiler<'r> {
    registry: &'r SchemaRegistry,
    options: CompileOptions,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_options(registry, CompileOptions::default())
    }

    pub fn with_options(registry: &'r SchemaRegistry, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile any statement description.
    pub fn compile(&self, query: &Query) -> ClauseResult<QueryResult> {
        match query {
            Query::Select(q) => self.select(q),
            Query::Insert(q) => self.insert(q),
            Query::Update(q) => self.update(q),
            Query::Delete(q) => self.delete(q),
        }
    }

    /// `SELECT ... FROM ... [JOIN ...] [WHERE ...] [GROUP BY ...] [ORDER BY ...] [LIMIT n] [OFFSET n]`
    pub fn select(&self, q: &SelectQuery) -> ClauseResult<QueryResult> {
        let mut scope = Scope::new(self.registry, &q.table)?;
        let joins = compile_joins(&mut scope, &q.joins, q.ignore_soft_delete)?;
        let items = compile_select_list(&scope, &q.select, "SELECT")?;

        let (filter, advisories) = compile_filter(
            &scope,
            &q.conditions,
            q.custom_where.as_ref(),
            &self.options.index_hints,
            q.ignore_soft_delete,
        )?;

        let group_by = compile_group_by(&scope, &q.group_by)?;
        let order = compile_order(&scope, &q.order)?;

        let mut sql = format!("SELECT {} FROM {}", select_sql(&items), scope.table());
        if !joins.is_empty() {
            sql.push(' ');
            sql.push_str(&joins.sql);
        }
        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.sql);
        }
        if !group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&group_by);
        }
        if !order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }
        if let Some(limit) = q.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = q.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let mut params = joins.params;
        params.extend(filter.params);

        self.finish(
            StatementKind::Select,
            scope.table(),
            sql,
            params,
            &items,
            advisories,
        )
    }

    /// `INSERT INTO table (cols) VALUES (...) [RETURNING ...]`
    pub fn insert(&self, q: &InsertQuery) -> ClauseResult<QueryResult> {
        let scope = Scope::new(self.registry, &q.table)?;
        let parts = compile_insert(&scope, &q.data)?;
        let returning = self.returning(&scope, &q.returning)?;

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            scope.table(),
            parts.columns.join(", "),
            parts.values.join(", ")
        );
        push_returning(&mut sql, &returning);

        self.finish(
            StatementKind::Insert,
            scope.table(),
            sql,
            parts.params,
            &returning,
            Vec::new(),
        )
    }

    /// `UPDATE table SET ... WHERE ... [RETURNING ...]`
    pub fn update(&self, q: &UpdateQuery) -> ClauseResult<QueryResult> {
        let scope = Scope::new(self.registry, &q.table)?;
        let set = compile_set(&scope, &q.data)?;
        let (filter, advisories) = self.mutation_where(
            &scope,
            &q.conditions,
            q.custom_where.as_ref(),
            q.ignore_soft_delete,
        )?;
        let returning = self.returning(&scope, &q.returning)?;

        let mut sql = format!(
            "UPDATE {} SET {} WHERE {}",
            scope.table(),
            set.sql,
            filter.sql
        );
        push_returning(&mut sql, &returning);

        let mut params = set.params;
        params.extend(filter.params);

        self.finish(
            StatementKind::Update,
            scope.table(),
            sql,
            params,
            &returning,
            advisories,
        )
    }

    /// `DELETE FROM table WHERE ... [RETURNING ...]`
    pub fn delete(&self, q: &DeleteQuery) -> ClauseResult<QueryResult> {
        let scope = Scope::new(self.registry, &q.table)?;
        let (filter, advisories) = self.mutation_where(
            &scope,
            &q.conditions,
            q.custom_where.as_ref(),
            q.ignore_soft_delete,
        )?;
        let returning = self.returning(&scope, &q.returning)?;

        let mut sql = format!("DELETE FROM {} WHERE {}", scope.table(), filter.sql);
        push_returning(&mut sql, &returning);

        self.finish(
            StatementKind::Delete,
            scope.table(),
            sql,
            filter.params,
            &returning,
            advisories,
        )
    }

    /// UPDATE and DELETE refuse to run without a caller-supplied filter.
    fn mutation_where(
        &self,
        scope: &Scope<'_>,
        conditions: &[Condition],
        custom_where: Option<&RawFragment>,
        ignore_soft_delete: bool,
    ) -> ClauseResult<(Fragment, Vec<Advisory>)> {
        let has_custom = custom_where.is_some_and(|f| !f.sql.trim().is_empty());
        if conditions.is_empty() && !has_custom {
            return Err(ClauseError::empty("WHERE"));
        }

        compile_filter(
            scope,
            conditions,
            custom_where,
            &self.options.index_hints,
            ignore_soft_delete,
        )
    }

    fn returning(&self, scope: &Scope<'_>, fields: &[String]) -> ClauseResult<Vec<SelectItem>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        compile_select_list(scope, fields, "RETURNING")
    }

    fn finish(
        &self,
        kind: StatementKind,
        table: &str,
        sql: String,
        params: Vec<String>,
        items: &[SelectItem],
        advisories: Vec<Advisory>,
    ) -> ClauseResult<QueryResult> {
        // Tokens such as a bare `?` in a select list bind nothing.
        ensure_placeholders(&sql, params.len())?;
        tracing::debug!(
            target: "pgclause.sql",
            kind = kind.as_str(),
            table,
            params = params.len(),
            sql = %sql,
            "compiled"
        );
        Ok(QueryResult::new(
            kind,
            sql,
            params,
            Projection::from_items(items),
            advisories,
        ))
    }
}

fn select_sql(items: &[SelectItem]) -> String {
    items
        .iter()
        .map(|item| item.expr.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_returning(sql: &mut String, items: &[SelectItem]) {
    if !items.is_empty() {
        sql.push_str(" RETURNING ");
        sql.push_str(&select_sql(items));
    }
}
