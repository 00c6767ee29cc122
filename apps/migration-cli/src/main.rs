use clap::{Parser, Subcommand};
use db_infra::config::db::DbConfig;
use db_infra::error::DbInfraError;
use db_infra::infra::db::core::{build_admin_pool, orchestrate_migration};
use db_infra::infra::db::health::run_health_check;
use db_infra::infra::db::setup::run_setup;
use migration::MigrationCommand;

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "VelocityThreads database migration tool")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database if missing, apply migrations, seed the admin user
    Setup,
    /// Apply pending migrations
    Up,
    /// Roll back the most recent migration
    Down,
    /// Drop everything, then reapply all migrations
    Fresh,
    /// Roll back every applied migration
    Reset,
    /// Roll back everything, then reapply
    Refresh,
    /// Show which migrations are applied
    Status,
    /// Run connectivity, schema, and data integrity checks
    Health,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,db_infra=info,sqlx=warn")
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let config = match DbConfig::from_env() {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    if let Command::Health = args.command {
        match run_health(&config).await {
            Ok(true) => return,
            Ok(false) => std::process::exit(1),
            Err(e) => fail(e),
        }
    }

    let result = match args.command {
        Command::Setup => run_setup(&config).await,
        Command::Health => unreachable!("handled above"),
        Command::Up => orchestrate_migration(&config, MigrationCommand::Up).await,
        Command::Down => orchestrate_migration(&config, MigrationCommand::Down).await,
        Command::Fresh => orchestrate_migration(&config, MigrationCommand::Fresh).await,
        Command::Reset => orchestrate_migration(&config, MigrationCommand::Reset).await,
        Command::Refresh => orchestrate_migration(&config, MigrationCommand::Refresh).await,
        Command::Status => orchestrate_migration(&config, MigrationCommand::Status).await,
    };

    if let Err(e) = result {
        fail(e);
    }
}

async fn run_health(config: &DbConfig) -> Result<bool, DbInfraError> {
    let pool = build_admin_pool(config).await?;
    let report = run_health_check(&pool).await?;

    println!();
    println!("HEALTH CHECK SUMMARY");
    for check in &report.checks {
        let status = if check.passed { "PASSED" } else { "FAILED" };
        println!("{}: {}", check.name, status);
    }

    Ok(report.all_passed())
}

fn fail(e: DbInfraError) -> ! {
    eprintln!("{e}");
    eprintln!("{}", e.remediation());
    std::process::exit(1);
}
