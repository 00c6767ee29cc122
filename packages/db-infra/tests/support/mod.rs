//! Shared helpers for the db-infra integration tests.

use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Idempotent, race-safe logging init. Level comes from TEST_LOG, then
/// RUST_LOG, then "warn".
pub fn init_logging() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

/// In-memory SQLite pool pinned to a single connection. Every connection to
/// `sqlite::memory:` is its own database, so the pool must never grow.
#[allow(dead_code)] // not every test binary uses the SQLite backend
pub async fn sqlite_pool() -> DatabaseConnection {
    init_logging();

    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.min_connections(1).max_connections(1);

    Database::connect(opt)
        .await
        .expect("sqlite::memory: connect")
}
