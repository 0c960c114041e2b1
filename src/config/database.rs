//! Database configuration module.
//!
//! Handles the SeaORM connection and table creation. Tables are generated from
//! the entity definitions with `Schema::create_table_from_entity`, so the
//! schema always matches the Rust structs. Composite uniqueness rules that an
//! entity cannot express on a single column are added as explicit indexes.

use crate::entities::{
    BudgetTemplate, Category, ContractTemplate, Document, Event, EventMenu, EventStaff,
    FilledBudget, FilledContract, Menu, MenuCategory, MenuItem, MenuSelection, Payment, Person,
    SystemState, event_staff, menu_selection, payment,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Default `SQLite` location used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/events.sqlite?mode=rwc";

/// Directory an on-disk `SQLite` URL points into, if any.
fn sqlite_parent_dir(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Establishes a connection to the database at `database_url`.
///
/// For on-disk `SQLite` the containing directory is created first.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        tokio::fs::create_dir_all(&dir).await?;
    }
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables (if missing) and the composite unique indexes.
///
/// Parents are created before children so foreign keys always resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, SystemState).await?;
    create_table(db, &schema, Category).await?;
    create_table(db, &schema, Person).await?;
    create_table(db, &schema, Event).await?;
    create_table(db, &schema, EventStaff).await?;
    create_table(db, &schema, Payment).await?;
    create_table(db, &schema, Menu).await?;
    create_table(db, &schema, MenuCategory).await?;
    create_table(db, &schema, MenuItem).await?;
    create_table(db, &schema, EventMenu).await?;
    create_table(db, &schema, MenuSelection).await?;
    create_table(db, &schema, ContractTemplate).await?;
    create_table(db, &schema, FilledContract).await?;
    create_table(db, &schema, BudgetTemplate).await?;
    create_table(db, &schema, FilledBudget).await?;
    create_table(db, &schema, Document).await?;

    for index in unique_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    Ok(())
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("uq_payments_event_person")
            .table(Payment)
            .col(payment::Column::EventId)
            .col(payment::Column::PersonId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("uq_event_staff_event_category")
            .table(EventStaff)
            .col(event_staff::Column::EventId)
            .col(event_staff::Column::CategoryId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("uq_menu_selections_pair")
            .table(MenuSelection)
            .col(menu_selection::Column::EventMenuId)
            .col(menu_selection::Column::MenuItemId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}
