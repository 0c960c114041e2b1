//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and creating entities with
//! sensible defaults.

use crate::{
    api::{build_router, state::AppState},
    config::{
        AppConfig,
        app::{SessionConfig, StorageConfig},
    },
    core::{
        category::{self, NewCategory},
        event::{self, NewEvent},
        menu::{self, MenuTree},
        menu_parser::parse_menu,
        payment::{self, NewPayment},
        person::{self, NewPerson},
    },
    entities::{self, EventStatus},
    errors::Result,
    storage::LocalStorage,
};
use axum::Router;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness; safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The fixed "today" used across tests.
#[must_use]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap_or_default()
}

/// Event input with only a title and a day.
#[must_use]
pub fn new_event(title: &str, date: NaiveDate) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        date,
        start_time: None,
        end_time: None,
        location: None,
        notes: None,
        status: None,
    }
}

/// Creates a planned event on [`test_date`].
pub async fn create_test_event(
    db: &DatabaseConnection,
    title: &str,
) -> Result<entities::event::Model> {
    event::create_event(db, new_event(title, test_date())).await
}

/// Creates an event with a specific day and stored status.
pub async fn create_custom_event(
    db: &DatabaseConnection,
    title: &str,
    date: NaiveDate,
    status: EventStatus,
) -> Result<entities::event::Model> {
    let mut input = new_event(title, date);
    input.status = Some(status);
    event::create_event(db, input).await
}

/// Creates a staff category with default color.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        NewCategory {
            name: name.to_string(),
            description: None,
            color: None,
        },
    )
    .await
}

/// Creates a person without a default pay value.
pub async fn create_test_person(
    db: &DatabaseConnection,
    name: &str,
    category_id: i64,
) -> Result<entities::person::Model> {
    person::create_person(
        db,
        NewPerson {
            name: name.to_string(),
            value: None,
            category_id,
        },
    )
    .await
}

/// Creates an unpaid payment.
pub async fn create_test_payment(
    db: &DatabaseConnection,
    event_id: i64,
    person_id: i64,
    amount: f64,
) -> Result<entities::payment::Model> {
    payment::create_payment(
        db,
        NewPayment {
            event_id,
            person_id,
            amount,
        },
    )
    .await
}

/// A database with one "Test Event" and one person in a "Waiter" category.
pub async fn setup_with_person() -> Result<(
    DatabaseConnection,
    entities::event::Model,
    entities::person::Model,
)> {
    let db = setup_test_db().await?;
    let event = create_test_event(&db, "Test Event").await?;
    let waiters = create_test_category(&db, "Waiter").await?;
    let person = create_test_person(&db, "Ana", waiters.id).await?;
    Ok((db, event, person))
}

/// Imports a two-category menu; the first category has two items.
pub async fn create_test_menu(db: &DatabaseConnection) -> Result<MenuTree> {
    let parsed = parse_menu(
        "MENU: Test Menu\n\
         CATEGORY: Starters\n\
         - Bruschetta :: Tomato and basil\n\
         - Soup\n\
         CATEGORY: Mains\n\
         - Risotto",
    )?;
    menu::import_parsed_menu(db, &parsed).await
}

/// A database with an event linked to a freshly imported menu.
pub async fn setup_with_event_menu() -> Result<(
    DatabaseConnection,
    entities::event_menu::Model,
    MenuTree,
)> {
    let db = setup_test_db().await?;
    let event = create_test_event(&db, "Test Event").await?;
    let tree = create_test_menu(&db).await?;
    let link = menu::link_event_menu(&db, event.id, tree.menu.id).await?;
    Ok((db, link, tree))
}

/// Storage rooted in a fresh temporary directory, served under `/files`.
#[must_use]
pub fn test_storage() -> LocalStorage {
    let root = std::env::temp_dir().join(format!("em-test-{}", uuid::Uuid::new_v4().simple()));
    LocalStorage::new(&StorageConfig {
        root_dir: root,
        public_base_url: "/files".to_string(),
    })
}

/// Configuration with fixed session credentials and a temporary storage root.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        session: SessionConfig {
            access_password: "test-password".to_string(),
            cookie_name: "em_session".to_string(),
            token: "test-session-token".to_string(),
            max_age_secs: 3600,
        },
        storage: StorageConfig {
            root_dir: std::env::temp_dir()
                .join(format!("em-app-{}", uuid::Uuid::new_v4().simple())),
            public_base_url: "/files".to_string(),
        },
        seed_config_path: PathBuf::from("config.toml"),
    }
}

/// Application state around an existing database.
#[must_use]
pub fn test_app_state(db: DatabaseConnection) -> AppState {
    AppState::new(db, test_config())
}

/// The full router over a fresh in-memory database.
pub async fn build_test_app() -> Result<Router> {
    Ok(build_router(test_app_state(setup_test_db().await?)))
}
