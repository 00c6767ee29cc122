use migration::MigrationCommand;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::info;

use crate::config::db::DbConfig;
use crate::error::{classify_db_err, DbInfraError};
use crate::infra::db::core::{connect, orchestrate_migration_internal};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@velocitythreads.com";

/// Full setup: create the database if missing, connect, apply migrations,
/// seed the admin account.
pub async fn run_setup(config: &DbConfig) -> Result<(), DbInfraError> {
    create_database_if_missing(config).await?;

    let pool = connect(&config.url()).await?;
    let version = server_version(&pool).await?;
    info!("setup=connected server={version}");

    orchestrate_migration_internal(&pool, MigrationCommand::Up).await?;
    seed_admin(&pool).await?;

    info!("setup=done");
    Ok(())
}

/// Create the target database via the maintenance database. Returns true if
/// it was created, false if it already existed.
pub async fn create_database_if_missing(config: &DbConfig) -> Result<bool, DbInfraError> {
    let conn = connect(&config.maintenance_url()).await?;

    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT 1 FROM pg_catalog.pg_database WHERE datname = $1",
        [config.name.clone().into()],
    );
    let exists = conn
        .query_one(stmt)
        .await
        .map_err(|e| classify_db_err("database existence check failed", e))?
        .is_some();

    if exists {
        info!("setup=database_exists name={}", config.name);
        return Ok(false);
    }

    // CREATE DATABASE cannot take bind parameters; the name comes from
    // DB_NAME only, quoted as an identifier.
    let quoted = config.name.replace('"', "\"\"");
    conn.execute(Statement::from_string(
        DatabaseBackend::Postgres,
        format!(r#"CREATE DATABASE "{quoted}""#),
    ))
    .await
    .map_err(|e| classify_db_err("create database failed", e))?;

    info!("setup=database_created name={}", config.name);
    Ok(true)
}

/// Report the server version, as a connection probe.
pub async fn server_version(conn: &DatabaseConnection) -> Result<String, DbInfraError> {
    let backend = conn.get_database_backend();
    let sql = match backend {
        DatabaseBackend::Postgres => "SELECT version() AS version",
        _ => "SELECT sqlite_version() AS version",
    };

    let row = conn
        .query_one(Statement::from_string(backend, sql))
        .await
        .map_err(|e| classify_db_err("version query failed", e))?
        .ok_or_else(|| DbInfraError::connectivity("version query returned no row"))?;

    row.try_get("", "version")
        .map_err(|e| classify_db_err("version query failed", e))
}

/// Seed the administrator account if none exists. The password hash is left
/// NULL; credentials are set through the application, which owns hashing.
/// Returns true if a row was inserted.
pub async fn seed_admin(conn: &DatabaseConnection) -> Result<bool, DbInfraError> {
    let backend = conn.get_database_backend();

    let count_stmt = Statement::from_string(
        backend,
        r#"SELECT COUNT(*) AS n FROM "user" WHERE is_admin = TRUE"#,
    );
    let row = conn
        .query_one(count_stmt)
        .await
        .map_err(|e| classify_db_err("admin lookup failed", e))?
        .ok_or_else(|| DbInfraError::schema("admin lookup returned no row"))?;
    let admins: i64 = row
        .try_get("", "n")
        .map_err(|e| classify_db_err("admin lookup failed", e))?;

    if admins > 0 {
        info!("setup=admin_exists");
        return Ok(false);
    }

    let sql = match backend {
        DatabaseBackend::Postgres => {
            r#"INSERT INTO "user" (username, email, password_hash, is_admin, created_at)
               VALUES ($1, $2, NULL, TRUE, CURRENT_TIMESTAMP)"#
        }
        _ => {
            r#"INSERT INTO "user" (username, email, password_hash, is_admin, created_at)
               VALUES (?, ?, NULL, TRUE, CURRENT_TIMESTAMP)"#
        }
    };
    let insert = Statement::from_sql_and_values(
        backend,
        sql,
        [DEFAULT_ADMIN_USERNAME.into(), DEFAULT_ADMIN_EMAIL.into()],
    );
    conn.execute(insert)
        .await
        .map_err(|e| classify_db_err("admin seed failed", e))?;

    info!("setup=admin_seeded username={DEFAULT_ADMIN_USERNAME}");
    Ok(true)
}
