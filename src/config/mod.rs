/// Environment-driven application settings
pub mod app;

/// Staff category seeds loaded from config.toml
pub mod categories;

/// Database connection and table creation
pub mod database;

pub use app::AppConfig;
