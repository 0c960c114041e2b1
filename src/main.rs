use dotenvy::dotenv;
use event_manager::api::{build_router, state::AppState};
use event_manager::config::{AppConfig, categories::load_seed_config, database};
use event_manager::core::{category::seed_categories, status};
use event_manager::errors::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();

    // 3. Load the application configuration
    let config = AppConfig::from_env()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection(&config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed staff categories when a seed file is present
    if config.seed_config_path.exists() {
        let seed = load_seed_config(&config.seed_config_path)?;
        let created = seed_categories(&db, &seed).await?;
        info!(created, "Seeded staff categories");
    } else {
        warn!(path = %config.seed_config_path.display(), "No seed file; skipping category seeding");
    }

    // 6. Finalize events whose day has passed
    let finalized = status::finalize_if_needed(&db, status::today()).await?;
    if !finalized.is_empty() {
        info!(count = finalized.len(), "Finalized past events");
    }

    // 7. Serve
    let addr = format!("{}:{}", config.host, config.port);
    let app = build_router(AppState::new(db, config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
