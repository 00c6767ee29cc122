use sea_orm::DbErr;
use thiserror::Error;

/// Manual fallback, printed when the resize migration fails so an operator
/// can apply it by hand after fixing the offending rows.
pub const MANUAL_MIGRATION_SQL: &[&str] = &[
    r#"ALTER TABLE "order" ALTER COLUMN order_number TYPE VARCHAR(30);"#,
    r#"ALTER TABLE "order" ALTER COLUMN phone TYPE VARCHAR(15);"#,
];

/// Error taxonomy for the database tooling. Every variant is fatal to the
/// run; nothing is retried.
#[derive(Debug, Error)]
pub enum DbInfraError {
    #[error("Configuration error: {message}")]
    Config { message: String },
    #[error("Connectivity error: {message}")]
    Connectivity { message: String },
    #[error("Schema error: {message}")]
    Schema { message: String },
}

impl DbInfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Actionable remediation text for the operator.
    pub fn remediation(&self) -> String {
        match self {
            Self::Config { .. } => {
                "Check the DB_* variables in your environment (or .env file) and re-run."
                    .to_string()
            }
            Self::Connectivity { .. } => {
                "Verify that PostgreSQL is running and reachable, and that DB_HOST, DB_PORT, \
                 DB_NAME, DB_USER and DB_PASSWORD are correct. No schema change was made."
                    .to_string()
            }
            Self::Schema { .. } => format!(
                "The schema change was rejected and rolled back; nothing was altered. If \
                 existing rows exceed the new column bounds, fix or remove them first, then \
                 re-run the migration or apply it manually:\n{}",
                MANUAL_MIGRATION_SQL.join("\n")
            ),
        }
    }
}

/// Map a SeaORM error into the tooling's taxonomy. Connection-level failures
/// are connectivity errors; rejected statements (notably SQLSTATE 22001,
/// value too long) are schema errors.
pub fn classify_db_err(context: &str, e: DbErr) -> DbInfraError {
    match &e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
            DbInfraError::connectivity(format!("{context}: {e}"))
        }
        DbErr::Exec(_) | DbErr::Query(_) | DbErr::Custom(_) => {
            DbInfraError::schema(format!("{context}: {e}"))
        }
        _ => DbInfraError::config(format!("{context}: {e}")),
    }
}
