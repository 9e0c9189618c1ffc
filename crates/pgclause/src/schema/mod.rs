//! Schema registry built from `CREATE TABLE` source text.
//!
//! The registry answers three questions for the compilers: does a table exist,
//! does a column exist on a table, and does a table carry the soft-delete marker.
//!
//! # Example
//!
//! ```ignore
//! use pgclause::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builder()
//!     .soft_delete_column("is_deleted")
//!     .file("db/schema.sql")?
//!     .build()?;
//!
//! assert!(registry.table_exists("actions"));
//! assert!(registry.field_exists("actions.project_id").valid);
//! ```

mod parse;
mod registry;


pub(crate) use parse::split_top_level;
pub use registry::{
    DEFAULT_SOFT_DELETE_COLUMN, FieldLookup, SchemaRegistry, SchemaRegistryBuilder, TableSchema,
};
