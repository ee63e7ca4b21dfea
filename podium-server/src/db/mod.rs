//! Repositories over the shared SQLite pool
//!
//! Plain `sqlx::query` / `query_as` with bound parameters. Schema creation
//! lives in `podium_common::db`; this module only reads and writes rows.

pub mod answers;
pub mod avatars;
pub mod feedback;
pub mod learnings;
pub mod presentations;
pub mod questions;
pub mod users;

/// True when `err` is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
