use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::{info, warn};

use crate::error::DbInfraError;
use crate::infra::db::setup::server_version;

/// Tables created by the initial migration, in FK-safe listing order.
const EXPECTED_TABLES: &[&str] = &["user", "product", "order", "order_item", "product_image"];

/// Required minimum declared lengths after the resize migration.
const REQUIRED_LENGTHS: &[(&str, i32)] = &[("order_number", 30), ("phone", 15)];

#[derive(Debug)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub details: Vec<String>,
}

#[derive(Debug)]
pub struct HealthReport {
    pub checks: Vec<CheckOutcome>,
}

impl HealthReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

/// Run the four health checks in order. A failing query fails its check but
/// never aborts the run; the report carries every outcome.
pub async fn run_health_check(conn: &DatabaseConnection) -> Result<HealthReport, DbInfraError> {
    let checks = vec![
        check_connection(conn).await,
        check_table_structure(conn).await,
        check_field_sizes(conn).await,
        check_data_integrity(conn).await,
    ];

    for check in &checks {
        if check.passed {
            info!("health={} passed=true", check.name);
        } else {
            warn!("health={} passed=false", check.name);
        }
        for line in &check.details {
            info!("health={} {}", check.name, line);
        }
    }

    Ok(HealthReport { checks })
}

async fn check_connection(conn: &DatabaseConnection) -> CheckOutcome {
    match server_version(conn).await {
        Ok(version) => CheckOutcome {
            name: "connection",
            passed: true,
            details: vec![format!("server version: {version}")],
        },
        Err(e) => CheckOutcome {
            name: "connection",
            passed: false,
            details: vec![format!("connection failed: {e}")],
        },
    }
}

async fn check_table_structure(conn: &DatabaseConnection) -> CheckOutcome {
    let name = "table_structure";
    let mut details = Vec::new();

    let result = match conn.get_database_backend() {
        DatabaseBackend::Postgres => postgres_table_structure(conn, &mut details).await,
        _ => sqlite_table_structure(conn, &mut details).await,
    };

    match result {
        Ok(()) => CheckOutcome {
            name,
            passed: true,
            details,
        },
        Err(e) => {
            details.push(format!("structure query failed: {e}"));
            CheckOutcome {
                name,
                passed: false,
                details,
            }
        }
    }
}

async fn postgres_table_structure(
    conn: &DatabaseConnection,
    details: &mut Vec<String>,
) -> Result<(), sea_orm::DbErr> {
    let tables = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT table_name::text AS table_name \
             FROM information_schema.tables \
             WHERE table_schema = 'public' \
             ORDER BY table_name",
        ))
        .await?;

    details.push(format!("{} table(s) in schema 'public'", tables.len()));

    for table_row in tables {
        let table: String = table_row.try_get("", "table_name")?;
        let columns = conn
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT column_name::text AS column_name, \
                        data_type::text AS data_type, \
                        character_maximum_length::integer AS max_len, \
                        is_nullable::text AS is_nullable, \
                        column_default::text AS column_default \
                 FROM information_schema.columns \
                 WHERE table_name = $1 AND table_schema = 'public' \
                 ORDER BY ordinal_position",
                [table.clone().into()],
            ))
            .await?;

        for col in columns {
            let column: String = col.try_get("", "column_name")?;
            let data_type: String = col.try_get("", "data_type")?;
            let max_len: Option<i32> = col.try_get("", "max_len")?;
            let is_nullable: String = col.try_get("", "is_nullable")?;
            let default: Option<String> = col.try_get("", "column_default")?;

            let length = max_len.map(|n| format!("({n})")).unwrap_or_default();
            let nullable = if is_nullable == "YES" {
                "NULL"
            } else {
                "NOT NULL"
            };
            let default = default
                .map(|d| format!(" DEFAULT {d}"))
                .unwrap_or_default();

            details.push(format!("{table}.{column}: {data_type}{length} {nullable}{default}"));
        }
    }

    Ok(())
}

async fn sqlite_table_structure(
    conn: &DatabaseConnection,
    details: &mut Vec<String>,
) -> Result<(), sea_orm::DbErr> {
    let tables = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        ))
        .await?;

    details.push(format!("{} table(s)", tables.len()));
    for row in tables {
        let table: String = row.try_get("", "name")?;
        details.push(format!("table: {table}"));
    }

    Ok(())
}

async fn check_field_sizes(conn: &DatabaseConnection) -> CheckOutcome {
    let name = "field_sizes";

    if conn.get_database_backend() != DatabaseBackend::Postgres {
        return CheckOutcome {
            name,
            passed: true,
            details: vec!["declared lengths are not enforced on this backend; skipped".to_string()],
        };
    }

    let mut details = Vec::new();
    let mut passed = true;

    for (column, required) in REQUIRED_LENGTHS {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT character_maximum_length::integer AS max_len \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = 'order' AND column_name = $1",
            [(*column).into()],
        );

        match conn.query_one(stmt).await {
            Ok(Some(row)) => match row.try_get::<Option<i32>>("", "max_len") {
                Ok(Some(len)) if len >= *required => {
                    details.push(format!("order.{column}: length {len} is adequate"));
                }
                Ok(Some(len)) => {
                    passed = false;
                    details.push(format!(
                        "order.{column}: length {len} is below the required {required}"
                    ));
                }
                Ok(None) => {
                    passed = false;
                    details.push(format!("order.{column}: not a length-bounded column"));
                }
                Err(e) => {
                    passed = false;
                    details.push(format!("order.{column}: length query failed: {e}"));
                }
            },
            Ok(None) => {
                passed = false;
                details.push(format!("order.{column}: column not found"));
            }
            Err(e) => {
                passed = false;
                details.push(format!("order.{column}: length query failed: {e}"));
            }
        }
    }

    // Distribution of stored order_number lengths, for operator eyes
    let lengths = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            r#"SELECT CAST(LENGTH(order_number) AS INTEGER) AS len, COUNT(*) AS n
               FROM "order" GROUP BY LENGTH(order_number) ORDER BY len"#,
        ))
        .await;
    match lengths {
        Ok(rows) => {
            for row in rows {
                if let (Ok(len), Ok(n)) = (
                    row.try_get::<i32>("", "len"),
                    row.try_get::<i64>("", "n"),
                ) {
                    details.push(format!("order_number length {len}: {n} order(s)"));
                }
            }
        }
        Err(e) => {
            passed = false;
            details.push(format!("order_number length scan failed: {e}"));
        }
    }

    CheckOutcome {
        name,
        passed,
        details,
    }
}

async fn check_data_integrity(conn: &DatabaseConnection) -> CheckOutcome {
    let name = "data_integrity";
    let backend = conn.get_database_backend();
    let mut details = Vec::new();
    let mut passed = true;

    for table in EXPECTED_TABLES {
        let stmt = Statement::from_string(
            backend,
            format!(r#"SELECT COUNT(*) AS n FROM "{table}""#),
        );
        match conn.query_one(stmt).await {
            Ok(Some(row)) => match row.try_get::<i64>("", "n") {
                Ok(count) => details.push(format!("{table}: {count} row(s)")),
                Err(e) => {
                    passed = false;
                    details.push(format!("{table}: count failed: {e}"));
                }
            },
            Ok(None) => {
                passed = false;
                details.push(format!("{table}: count returned no row"));
            }
            Err(e) => {
                passed = false;
                details.push(format!("{table}: count failed: {e}"));
            }
        }
    }

    let orphan_queries = [
        (
            "order_item",
            r#"SELECT COUNT(*) AS n FROM order_item oi
               LEFT JOIN "order" o ON oi.order_id = o.id
               WHERE o.id IS NULL"#,
        ),
        (
            "product_image",
            r#"SELECT COUNT(*) AS n FROM product_image pi
               LEFT JOIN product p ON pi.product_id = p.id
               WHERE p.id IS NULL"#,
        ),
    ];

    for (table, sql) in orphan_queries {
        match conn.query_one(Statement::from_string(backend, sql)).await {
            Ok(Some(row)) => match row.try_get::<i64>("", "n") {
                Ok(0) => details.push(format!("no orphaned {table} rows")),
                Ok(orphans) => {
                    passed = false;
                    details.push(format!("{orphans} orphaned {table} row(s)"));
                }
                Err(e) => {
                    passed = false;
                    details.push(format!("orphan scan for {table} failed: {e}"));
                }
            },
            Ok(None) => {
                passed = false;
                details.push(format!("orphan scan for {table} returned no row"));
            }
            Err(e) => {
                passed = false;
                details.push(format!("orphan scan for {table} failed: {e}"));
            }
        }
    }

    CheckOutcome {
        name,
        passed,
        details,
    }
}
