pub mod core;
pub mod health;
pub mod setup;

pub use self::core::{build_admin_pool, orchestrate_migration, orchestrate_migration_internal};
pub use health::run_health_check;
pub use setup::{create_database_if_missing, run_setup, seed_admin};
