//! Read-only lookup of result cells by selected field name.

use crate::clause::SelectItem;
use crate::error::{ClauseError, ClauseResult};
use serde::Serialize;

/// One selected field and the names it can be looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedField {
    /// Token as it appears in the select list.
    pub expr: String,
    pub alias: Option<String>,
    /// `reference.column` as written in SQL (alias-qualified when joined by alias).
    pub qualified: Option<String>,
    /// Real `table.column`.
    pub canonical: Option<String>,
    pub column: Option<String>,
}

/// The selected-field list of a compiled SELECT.
///
/// A name is matched against, in order: the select token itself, an `AS` alias,
/// a qualified `table.column` (real or alias-qualified), then a bare column name
/// if exactly one selected field has it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Projection {
    fields: Vec<ProjectedField>,
}

impl Projection {
    pub(crate) fn from_items(items: &[SelectItem]) -> Self {
        let fields = items
            .iter()
            .map(|item| ProjectedField {
                expr: item.expr.clone(),
                alias: item.alias.clone(),
                qualified: item
                    .resolved
                    .as_ref()
                    .map(|r| format!("{}.{}", r.reference, r.column)),
                canonical: item.resolved.as_ref().map(|r| r.canonical()),
                column: item.resolved.as_ref().map(|r| r.column.clone()),
            })
            .collect();
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[ProjectedField] {
        &self.fields
    }

    /// Position of `name` in the row.
    pub fn index_of(&self, name: &str) -> ClauseResult<usize> {
        let name = name.trim().to_ascii_lowercase();

        if let Some(idx) = self.position(|f| f.expr == name) {
            return Ok(idx);
        }
        if let Some(idx) = self.position(|f| f.alias.as_deref() == Some(name.as_str())) {
            return Ok(idx);
        }
        if let Some(idx) = self.position(|f| {
            f.qualified.as_deref() == Some(name.as_str())
                || f.canonical.as_deref() == Some(name.as_str())
        }) {
            return Ok(idx);
        }

        let matches: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.column.as_deref() == Some(name.as_str()))
            .map(|(idx, _)| idx)
            .collect();
        match matches.as_slice() {
            [idx] => Ok(*idx),
            [] => Err(ClauseError::FieldNotSelected(name)),
            _ => Err(ClauseError::AmbiguousField {
                matches: matches
                    .iter()
                    .map(|&idx| self.fields[idx].expr.clone())
                    .collect(),
                name,
            }),
        }
    }

    fn position(&self, pred: impl Fn(&ProjectedField) -> bool) -> Option<usize> {
        self.fields.iter().position(pred)
    }
}

/// One row viewed through a [`Projection`].
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    projection: &'a Projection,
    values: &'a [String],
}

impl<'a> RowView<'a> {
    pub fn new(projection: &'a Projection, values: &'a [String]) -> Self {
        Self { projection, values }
    }

    /// Cell for `name`, or `None` if it cannot be found.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.try_get(name).ok()
    }

    /// Cell for `name`.
    pub fn try_get(&self, name: &str) -> ClauseResult<&'a str> {
        let idx = self.projection.index_of(name)?;
        self.values
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| ClauseError::FieldNotSelected(name.trim().to_string()))
    }

    /// Cell by position.
    pub fn get_index(&self, idx: usize) -> Option<&'a str> {
        self.values.get(idx).map(String::as_str)
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

/// Rows returned by the executor, paired with the projection that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    projection: Projection,
    rows: Vec<Vec<String>>,
}

impl RowSet {
    pub fn new(projection: Projection, rows: Vec<Vec<String>>) -> Self {
        Self { projection, rows }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<RowView<'_>> {
        self.rows
            .get(idx)
            .map(|values| RowView::new(&self.projection, values))
    }

    pub fn first(&self) -> Option<RowView<'_>> {
        self.get(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows
            .iter()
            .map(|values| RowView::new(&self.projection, values))
    }

    /// Every cell of one column.
    pub fn column(&self, name: &str) -> ClauseResult<Vec<&str>> {
        let idx = self.projection.index_of(name)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.get(idx).map(String::as_str))
            .collect())
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}
