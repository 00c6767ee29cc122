//! Shared database configuration, setup, and migration infrastructure.
//! Used by the migration CLI and the integration tests.

pub mod config;
pub mod error;
pub mod infra;

pub use config::db::{DbConfig, RuntimeEnv};
pub use error::DbInfraError;
pub use infra::db::core::{build_admin_pool, orchestrate_migration, sanitize_db_url};
pub use infra::db::health::run_health_check;
pub use infra::db::setup::run_setup;
