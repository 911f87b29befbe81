//! PostgreSQL repository implementations.
//!
//! Multi-row writes run inside one transaction. Grant snapshots run in a
//! `REPEATABLE READ` read-only transaction so every query sees the same
//! committed state.

mod assignment;
mod menu;
mod role;
mod session;
mod user;

pub use assignment::PgAssignmentRepository;
pub use menu::PgMenuRepository;
pub use role::PgRoleRepository;
pub use session::PgSessionRepository;
pub use user::PgUserRepository;

use gatehouse_core::error::{AppError, ErrorKind};

/// Map a sqlx error, turning unique violations into `Conflict`.
fn map_db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let unique = e
            .as_database_error()
            .is_some_and(|d| d.is_unique_violation());
        if unique {
            AppError::with_source(ErrorKind::Conflict, context, e)
        } else {
            AppError::with_source(ErrorKind::Database, context, e)
        }
    }
}

/// Plain database error mapping.
fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}
