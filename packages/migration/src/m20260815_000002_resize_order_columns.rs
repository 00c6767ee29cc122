use sea_orm::Statement;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// order_number: orders outgrew VARCHAR(20) once the yearly prefix landed.
// phone: stored numbers are at most 15 characters (E.164), so the column
// narrows from the original 20.
const ORDER_NUMBER_LEN: i32 = 30;
const PHONE_LEN: i32 = 15;
const ORIGINAL_LEN: i32 = 20;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => {
                resize_varchar(manager, "order_number", ORDER_NUMBER_LEN).await?;
                resize_varchar(manager, "phone", PHONE_LEN).await?;
                Ok(())
            }
            sea_orm::DatabaseBackend::Sqlite => {
                // SQLite stores these as TEXT; declared lengths are not enforced
                Ok(())
            }
            _ => Err(DbErr::Custom("Unsupported database backend".into())),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => {
                resize_varchar(manager, "order_number", ORIGINAL_LEN).await?;
                resize_varchar(manager, "phone", ORIGINAL_LEN).await?;
                Ok(())
            }
            sea_orm::DatabaseBackend::Sqlite => Ok(()),
            _ => Err(DbErr::Custom("Unsupported database backend".into())),
        }
    }
}

/// Alter one varchar column on "order" to the target length, skipping the
/// ALTER when the column is already there. Postgres rejects the statement if
/// existing data exceeds the target, so a bad narrow fails instead of
/// truncating.
async fn resize_varchar(
    manager: &SchemaManager<'_>,
    column: &str,
    target: i32,
) -> Result<(), DbErr> {
    if varchar_len(manager, column).await? == Some(target) {
        return Ok(());
    }

    manager
        .get_connection()
        .execute(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            format!(r#"ALTER TABLE "order" ALTER COLUMN {column} TYPE VARCHAR({target})"#),
        ))
        .await?;

    Ok(())
}

/// Current declared length of a varchar column on "order", or None if the
/// column is missing or not length-bounded.
async fn varchar_len(manager: &SchemaManager<'_>, column: &str) -> Result<Option<i32>, DbErr> {
    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "SELECT character_maximum_length::integer AS max_len \
         FROM information_schema.columns \
         WHERE table_schema = 'public' AND table_name = 'order' AND column_name = $1",
        [column.into()],
    );

    match manager.get_connection().query_one(stmt).await? {
        Some(row) => row.try_get("", "max_len"),
        None => Ok(None),
    }
}
