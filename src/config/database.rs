//! Database configuration module for the ledger engine.
//!
//! This module handles `SQLite` connection setup and table creation using `SeaORM`. Tables
//! are generated from the entity definitions with `Schema::create_table_from_entity`, so the
//! schema always matches the Rust structs. Creation uses `IF NOT EXISTS`, which makes it
//! safe to run on every start against an existing database file.

use crate::entities::{
    Account, AccountSnapshot, AppSetting, CatalogItem, ExpenseEntry, IncomeEntry,
    IncomeEntryLine, SnapshotBalance,
};
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::debug;

/// Database used when `DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/ledger_desk.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory that must exist before `SQLite` can create the database file, if any.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Establishes a connection to the database named by [`get_database_url`], creating the
/// `SQLite` file's directory when needed.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir).map_err(|e| Error::Config {
            message: format!("Failed to create database directory {}: {e}", dir.display()),
        })?;
    }
    debug!("Connecting to {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all ledger tables that do not exist yet.
///
/// Parents are created before the tables whose foreign keys point at them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, CatalogItem).await?;
    create_table(db, &schema, Account).await?;
    create_table(db, &schema, IncomeEntry).await?;
    create_table(db, &schema, IncomeEntryLine).await?;
    create_table(db, &schema, ExpenseEntry).await?;
    create_table(db, &schema, AccountSnapshot).await?;
    create_table(db, &schema, SnapshotBalance).await?;
    create_table(db, &schema, AppSetting).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        CatalogItem::find().limit(1).all(&db).await?;
        Account::find().limit(1).all(&db).await?;
        IncomeEntry::find().limit(1).all(&db).await?;
        IncomeEntryLine::find().limit(1).all(&db).await?;
        ExpenseEntry::find().limit(1).all(&db).await?;
        AccountSnapshot::find().limit(1).all(&db).await?;
        SnapshotBalance::find().limit(1).all(&db).await?;
        AppSetting::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir(DEFAULT_DATABASE_URL),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://ledger.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("postgres://localhost/ledger"), None);
    }

    #[tokio::test]
    async fn test_create_tables_twice_is_harmless() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
