pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;
pub use sea_orm::{ConnectionTrait, DatabaseConnection};

mod m20260601_000001_init; // keep filename + module name in sync
mod m20260815_000002_resize_order_columns;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_init::Migration),
            Box::new(m20260815_000002_resize_order_columns::Migration),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

/// Migration entry point that takes an already-built connection.
/// Used by both the CLI and tests.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let before = describe_db(db).await?;

    tracing::info!(
        "cmd={command:?} backend={} db={}",
        before.backend,
        before.name
    );
    tracing::info!(
        "before: {} migration(s) defined, {} applied",
        before.defined_count,
        before.applied_count
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        // Down steps back one migration; Reset is the roll-back-everything command
        MigrationCommand::Down => Migrator::down(db, Some(1)).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Refresh => Migrator::refresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    match result {
        Ok(()) => {
            // Status does not change state, so skip the second snapshot
            if !matches!(command, MigrationCommand::Status) {
                let after = describe_db(db).await?;
                tracing::info!(
                    "after: {} migration(s) defined, {} applied",
                    after.defined_count,
                    after.applied_count
                );
            }
            tracing::info!("{command:?} ok for {}", before.backend);
            Ok(())
        }
        Err(e) => {
            tracing::error!("{command:?} failed for {}: {e}", before.backend);
            Err(e)
        }
    }
}

#[derive(Debug)]
struct DbSnapshot {
    backend: String,
    name: String,
    applied_count: usize,
    defined_count: usize,
}

async fn describe_db(db: &DatabaseConnection) -> Result<DbSnapshot, DbErr> {
    let backend = format!("{:?}", db.get_database_backend());

    let name = match db.get_database_backend() {
        sea_orm::DatabaseBackend::Postgres => {
            let stmt = Statement::from_string(
                db.get_database_backend(),
                String::from("select current_database() as name"),
            );
            match db.query_one(stmt).await? {
                Some(row) => row.try_get("", "name")?,
                None => "<unknown>".to_string(),
            }
        }
        sea_orm::DatabaseBackend::Sqlite => {
            let stmt = Statement::from_string(
                db.get_database_backend(),
                String::from("SELECT file FROM pragma_database_list WHERE name = 'main'"),
            );
            match db.query_one(stmt).await? {
                Some(row) => match row.try_get::<String>("", "file") {
                    Ok(file) if file.is_empty() => ":memory:".to_string(),
                    Ok(file) => file,
                    Err(_) => "<unknown>".to_string(),
                },
                None => "<unknown>".to_string(),
            }
        }
        _ => "<unsupported>".to_string(),
    };

    let applied_count = count_applied_migrations(db).await.unwrap_or(0);
    let defined_count = Migrator::migrations().len();

    Ok(DbSnapshot {
        backend,
        name,
        applied_count,
        defined_count,
    })
}

/// Count the migrations recorded as applied.
/// Returns 0 if the migration table does not exist yet.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) => Ok(0), // Migration table doesn't exist yet
        Err(e) => Err(e),
    }
}

/// Version string of the latest applied migration, if any.
pub async fn latest_applied_migration(db: &DatabaseConnection) -> Result<Option<String>, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.last().map(|m| m.name().to_string())),
        Err(DbErr::Exec(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
