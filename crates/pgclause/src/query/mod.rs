//! Clause descriptions and the query assembler.
//!
//! A description ([`SelectQuery`], [`InsertQuery`], [`UpdateQuery`],
//! [`DeleteQuery`], or the tagged [`Query`]) is compiled by a [`Compiler`]
//! into a [`QueryResult`]: SQL text with `?` placeholders and the ordered
//! parameter list.
//!
//! Descriptions can be built in code or deserialized from a manifest; both go
//! through the same compiler, so both are rejected for the same inputs.

mod compiler;
mod desc;
mod result;

#[cfg(test)]
mod tests;

pub use compiler::{CompileOptions, Compiler};
pub use desc::{
    Assignment, Condition, DeleteQuery, InsertQuery, Join, OnCondition, OrderBy, Query,
    RawFragment, SelectQuery, UpdateQuery,
};
pub use result::{QueryResult, StatementKind, renumber_placeholders};
