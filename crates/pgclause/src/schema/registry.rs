use super::parse::parse_tables;
use crate::error::{SchemaError, SchemaResult};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// Default name of the soft-delete marker column.
pub const DEFAULT_SOFT_DELETE_COLUMN: &str = "is_deleted";

/// Table information for schema validation.
///
/// Table and column names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Column names in declaration order.
    pub columns: Vec<String>,
}

impl TableSchema {
    /// Create a new table schema.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_ascii_lowercase(),
            columns: Vec::new(),
        }
    }

    /// Add a column to this table schema. Duplicates are ignored.
    pub fn add_column(&mut self, name: impl AsRef<str>) {
        let name = name.as_ref().to_ascii_lowercase();
        if !self.columns.contains(&name) {
            self.columns.push(name);
        }
    }

    /// Add multiple columns to this table schema.
    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        for col in columns {
            self.add_column(col);
        }
        self
    }

    /// Check if this table has a column with the given name (case-insensitive).
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Outcome of [`SchemaRegistry::field_exists`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLookup {
    /// Whether `table.column` exists.
    pub valid: bool,
    /// Normalized table part (empty when the input had no qualifier).
    pub table: String,
    /// Normalized column part.
    pub column: String,
}

/// Registry of table -> column names, built once from schema source text.
///
/// The registry has no mutating methods; build it with [`SchemaRegistry::builder`]
/// and share it by reference (or `Arc`) across any number of compilations.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    tables: HashMap<String, TableSchema>,
    soft_delete_column: String,
    soft_delete_tables: HashSet<String>,
}

impl SchemaRegistry {
    /// Start building a registry.
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Build a registry from schema text using the default soft-delete column.
    pub fn from_sql(source: &str) -> SchemaResult<Self> {
        Self::builder().sql(source)?.build()
    }

    /// Check if a table exists.
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_ascii_lowercase())
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    /// Check if `table` has `column`. Unknown tables have no columns.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.get_table(table).is_some_and(|t| t.has_column(column))
    }

    /// Check a `table.column` reference.
    pub fn field_exists(&self, field: &str) -> FieldLookup {
        let field = field.trim().to_ascii_lowercase();
        let (table, column) = match field.split_once('.') {
            Some((t, c)) => (t.to_string(), c.to_string()),
            None => (String::new(), field),
        };
        FieldLookup {
            valid: !table.is_empty() && self.has_column(&table, &column),
            table,
            column,
        }
    }

    /// Whether the table carries the soft-delete marker column.
    pub fn has_soft_delete_marker(&self, table: &str) -> bool {
        self.soft_delete_tables
            .contains(&table.to_ascii_lowercase())
    }

    /// Name of the soft-delete marker column.
    pub fn soft_delete_column(&self) -> &str {
        &self.soft_delete_column
    }

    /// All table names, sorted.
    pub fn table_names(&self) -> BTreeSet<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Get all registered tables.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// Get the number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Builder for [`SchemaRegistry`].
///
/// Repeated definitions of the same table are merged (union of columns).
#[derive(Debug, Clone)]
pub struct SchemaRegistryBuilder {
    tables: HashMap<String, TableSchema>,
    soft_delete_column: String,
}

impl Default for SchemaRegistryBuilder {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
            soft_delete_column: DEFAULT_SOFT_DELETE_COLUMN.to_string(),
        }
    }
}

impl SchemaRegistryBuilder {
    /// Override the soft-delete marker column name.
    pub fn soft_delete_column(mut self, column: impl AsRef<str>) -> Self {
        self.soft_delete_column = column.as_ref().to_ascii_lowercase();
        self
    }

    /// Parse schema text and add every table it defines.
    pub fn sql(mut self, source: &str) -> SchemaResult<Self> {
        for table in parse_tables(source)? {
            self.merge(table);
        }
        Ok(self)
    }

    /// Read and parse a schema file.
    pub fn file(self, path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.sql(&source)
    }

    /// Register a table schema directly.
    pub fn table(mut self, table: TableSchema) -> Self {
        self.merge(table);
        self
    }

    /// Finish the registry. Fails if no table was registered.
    pub fn build(self) -> SchemaResult<SchemaRegistry> {
        if self.tables.is_empty() {
            return Err(SchemaError::NoSource(
                "no CREATE TABLE statements were loaded".to_string(),
            ));
        }

        let soft_delete_tables: HashSet<String> = self
            .tables
            .values()
            .filter(|t| t.has_column(&self.soft_delete_column))
            .map(|t| t.name.clone())
            .collect();

        tracing::info!(
            target: "pgclause.schema",
            tables = self.tables.len(),
            soft_delete_tables = soft_delete_tables.len(),
            soft_delete_column = %self.soft_delete_column,
            "schema registry built"
        );

        Ok(SchemaRegistry {
            tables: self.tables,
            soft_delete_column: self.soft_delete_column,
            soft_delete_tables,
        })
    }

    fn merge(&mut self, table: TableSchema) {
        match self.tables.get_mut(&table.name) {
            Some(existing) => {
                for col in table.columns {
                    existing.add_column(col);
                }
            }
            None => {
                self.tables.insert(table.name.clone(), table);
            }
        }
    }
}
