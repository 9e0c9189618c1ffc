//! Execution collaborator.

use crate::error::ClauseResult;
use std::future::Future;

/// Runs compiled SQL: `(sql, ordered params) -> rows of string cells`.
///
/// The library never connects to a database itself; callers adapt their
/// driver of choice to this trait. `sql` uses `?` placeholders; drivers that
/// expect `$n` can use [`renumber_placeholders`](crate::renumber_placeholders).
pub trait Executor: Send + Sync {
    /// Execute a statement and return all rows.
    fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> impl Future<Output = ClauseResult<Vec<Vec<String>>>> + Send;
}

impl<T: Executor> Executor for &T {
    fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> impl Future<Output = ClauseResult<Vec<Vec<String>>>> + Send {
        (**self).execute(sql, params)
    }
}
