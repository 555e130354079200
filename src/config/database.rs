//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! models without hand-written SQL. Creation uses `IF NOT EXISTS` so the server
//! can restart against an existing database file.

use crate::entities::{
    BudgetLine, Item, ItemMaterial, Listing, Material, Offer, Payment, Project, Stage,
    SystemState, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/obra.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory that must exist before `SQLite` can create the database file.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")?
        .split('?')
        .next()
        .filter(|p| !p.is_empty() && !p.starts_with(':'))?;
    Path::new(path).parent().filter(|dir| !dir.as_os_str().is_empty())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }
    tracing::debug!("Connecting to database at {database_url}");
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

/// Creates all tables from the entity definitions.
///
/// Parents are created before children so foreign keys resolve on backends
/// that check them eagerly.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Project).await?;
    create_table(db, &schema, Material).await?;
    create_table(db, &schema, Offer).await?;
    create_table(db, &schema, Item).await?;
    create_table(db, &schema, ItemMaterial).await?;
    create_table(db, &schema, BudgetLine).await?;
    create_table(db, &schema, Stage).await?;
    create_table(db, &schema, Payment).await?;
    create_table(db, &schema, Listing).await?;
    create_table(db, &schema, SystemState).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        budget_line::Model as BudgetLineModel, listing::Model as ListingModel,
        payment::Model as PaymentModel, project::Model as ProjectModel,
        user::Model as UserModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<ProjectModel> = Project::find().limit(1).all(&db).await?;
        let _: Vec<BudgetLineModel> = BudgetLine::find().limit(1).all(&db).await?;
        let _: Vec<PaymentModel> = Payment::find().limit(1).all(&db).await?;
        let _: Vec<ListingModel> = Listing::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite://data/obra.sqlite?mode=rwc"),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://obra.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("postgres://localhost/obra"), None);
    }
}
