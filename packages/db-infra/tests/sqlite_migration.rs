mod support;

use db_infra::infra::db::core::orchestrate_migration_internal;
use db_infra::infra::db::setup::{seed_admin, DEFAULT_ADMIN_USERNAME};
use migration::{
    count_applied_migrations, latest_applied_migration, migrate, MigrationCommand, Migrator,
    MigratorTrait,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use support::sqlite_pool;

async fn scalar_i64(db: &DatabaseConnection, sql: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(db.get_database_backend(), sql))
        .await
        .expect("query")
        .expect("row");
    row.try_get("", "n").expect("i64 column n")
}

async fn exec(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(db.get_database_backend(), sql))
        .await
        .expect("exec");
}

#[tokio::test]
async fn up_applies_every_defined_migration() {
    let db = sqlite_pool().await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up");

    let applied = count_applied_migrations(&db).await.expect("count");
    assert_eq!(applied, Migrator::migrations().len());

    let latest = latest_applied_migration(&db).await.expect("latest");
    assert_eq!(
        latest.as_deref(),
        Some("m20260815_000002_resize_order_columns")
    );
}

#[tokio::test]
async fn second_up_is_a_noop() {
    let db = sqlite_pool().await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up-1");
    let before = count_applied_migrations(&db).await.expect("count-1");

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up-2");
    let after = count_applied_migrations(&db).await.expect("count-2");

    assert_eq!(before, after, "applied count changed on second up");
}

#[tokio::test]
async fn rows_survive_rerunning_up() {
    let db = sqlite_pool().await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up-1");

    exec(
        &db,
        r#"INSERT INTO "user" (username, email, password_hash, is_admin, created_at)
           VALUES ('casey', 'casey@example.com', NULL, FALSE, CURRENT_TIMESTAMP)"#,
    )
    .await;
    exec(
        &db,
        r#"INSERT INTO "order" (user_id, order_number, status, phone, total, created_at)
           VALUES (1, 'VT-2026-000123', 'pending', '555-0100', 49.99, CURRENT_TIMESTAMP)"#,
    )
    .await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up-2");

    assert_eq!(scalar_i64(&db, r#"SELECT COUNT(*) AS n FROM "order""#).await, 1);

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            r#"SELECT order_number FROM "order" WHERE user_id = 1"#,
        ))
        .await
        .expect("query")
        .expect("row");
    let order_number: String = row.try_get("", "order_number").expect("order_number");
    assert_eq!(order_number, "VT-2026-000123");
}

#[tokio::test]
async fn down_reverts_only_the_latest_migration() {
    let db = sqlite_pool().await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up");
    migrate(&db, MigrationCommand::Down).await.expect("down");

    let applied = count_applied_migrations(&db).await.expect("count");
    assert_eq!(applied, Migrator::migrations().len() - 1);

    let latest = latest_applied_migration(&db).await.expect("latest");
    assert_eq!(latest.as_deref(), Some("m20260601_000001_init"));

    // A second down steps back one more; down is stepwise, reset is the
    // roll-back-everything command
    migrate(&db, MigrationCommand::Down).await.expect("down-2");
    assert_eq!(count_applied_migrations(&db).await.expect("count-2"), 0);
}

#[tokio::test]
async fn refresh_rebuilds_the_full_schema() {
    let db = sqlite_pool().await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up");
    orchestrate_migration_internal(&db, MigrationCommand::Refresh)
        .await
        .expect("refresh");

    let applied = count_applied_migrations(&db).await.expect("count");
    assert_eq!(applied, Migrator::migrations().len());
}

#[tokio::test]
async fn seed_admin_inserts_exactly_once() {
    let db = sqlite_pool().await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up");

    assert!(seed_admin(&db).await.expect("seed-1"), "first seed inserts");
    assert!(
        !seed_admin(&db).await.expect("seed-2"),
        "second seed is a no-op"
    );

    assert_eq!(
        scalar_i64(
            &db,
            r#"SELECT COUNT(*) AS n FROM "user" WHERE is_admin = TRUE"#
        )
        .await,
        1
    );

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            r#"SELECT username FROM "user" WHERE is_admin = TRUE"#,
        ))
        .await
        .expect("query")
        .expect("row");
    let username: String = row.try_get("", "username").expect("username");
    assert_eq!(username, DEFAULT_ADMIN_USERNAME);
}
