mod support;

use db_infra::infra::db::core::orchestrate_migration_internal;
use db_infra::infra::db::health::run_health_check;
use db_infra::infra::db::setup::seed_admin;
use migration::MigrationCommand;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use support::sqlite_pool;

async fn exec(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(db.get_database_backend(), sql))
        .await
        .expect("exec");
}

#[tokio::test]
async fn health_passes_on_a_migrated_consistent_schema() {
    let db = sqlite_pool().await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up");
    seed_admin(&db).await.expect("seed");

    exec(
        &db,
        r#"INSERT INTO product (name, description, price, stock, created_at)
           VALUES ('Velocity Tee', 'Cotton tee', 19.99, 100, CURRENT_TIMESTAMP)"#,
    )
    .await;
    exec(
        &db,
        r#"INSERT INTO "order" (user_id, order_number, status, phone, total, created_at)
           VALUES (1, 'VT-2026-000001', 'pending', '555-0101', 19.99, CURRENT_TIMESTAMP)"#,
    )
    .await;
    exec(
        &db,
        r#"INSERT INTO order_item (order_id, product_id, quantity, unit_price)
           VALUES (1, 1, 1, 19.99)"#,
    )
    .await;

    let report = run_health_check(&db).await.expect("health");
    assert_eq!(report.checks.len(), 4);

    let names: Vec<&str> = report.checks.iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        vec!["connection", "table_structure", "field_sizes", "data_integrity"]
    );

    for check in &report.checks {
        assert!(check.passed, "check '{}' failed: {:?}", check.name, check.details);
    }
    assert!(report.all_passed());
}

#[tokio::test]
async fn health_flags_orphaned_order_items() {
    let db = sqlite_pool().await;

    orchestrate_migration_internal(&db, MigrationCommand::Up)
        .await
        .expect("up");

    // Disable FK enforcement on this connection so the orphan can exist
    exec(&db, "PRAGMA foreign_keys = OFF").await;
    exec(
        &db,
        r#"INSERT INTO order_item (order_id, product_id, quantity, unit_price)
           VALUES (999, 999, 1, 9.99)"#,
    )
    .await;

    let report = run_health_check(&db).await.expect("health");
    assert!(!report.all_passed());

    let integrity = report
        .checks
        .iter()
        .find(|c| c.name == "data_integrity")
        .expect("integrity check present");
    assert!(!integrity.passed);
    assert!(
        integrity
            .details
            .iter()
            .any(|d| d.contains("orphaned order_item")),
        "details should name the orphaned table: {:?}",
        integrity.details
    );
}

#[tokio::test]
async fn health_fails_before_migration() {
    let db = sqlite_pool().await;

    let report = run_health_check(&db).await.expect("health");
    assert!(!report.all_passed(), "missing tables must fail integrity");

    let connection = report
        .checks
        .iter()
        .find(|c| c.name == "connection")
        .expect("connection check present");
    assert!(connection.passed, "connectivity itself is fine");

    let integrity = report
        .checks
        .iter()
        .find(|c| c.name == "data_integrity")
        .expect("integrity check present");
    assert!(!integrity.passed);
}
