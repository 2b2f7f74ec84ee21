pub mod favorite;
pub mod history;
pub mod user;

/// SQLite reports duplicate rows through the driver error text; sea-orm
/// does not expose a typed unique-violation variant for it.
pub(crate) fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    err.to_string().contains("UNIQUE constraint")
}
