/// Database connection and table creation
pub mod database;

/// Settings loading from config.toml and the environment
pub mod settings;

pub use settings::{AppConfig, DatabaseConfig, PaginationConfig, ServerConfig, load_app_config};
