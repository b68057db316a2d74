//! Embedded schema migrations.

use std::collections::HashSet;

use sqlx::PgPool;
use sqlx::migrate::{Migration, Migrator};
use tracing::info;

use authapi_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Run all pending migrations from the workspace `migrations/` directory,
/// logging each one that this run applied.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(known = MIGRATOR.iter().count(), "Running database migrations");

    let before = applied_versions(pool)
        .await
        .map_err(|e| db_error("Failed to read applied migrations", e))?;

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    let applied = pending(&MIGRATOR, &before);
    for migration in &applied {
        info!(
            version = migration.version,
            description = %migration.description,
            "Applied migration"
        );
    }
    info!(applied = applied.len(), "Database migrations completed");
    Ok(())
}

/// Versions already recorded by sqlx. Empty before the first run.
async fn applied_versions(pool: &PgPool) -> Result<HashSet<i64>, sqlx::Error> {
    let tracked: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    if !tracked {
        return Ok(HashSet::new());
    }

    let versions: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await?;
    Ok(versions.into_iter().collect())
}

fn pending<'a>(migrator: &'a Migrator, applied: &HashSet<i64>) -> Vec<&'a Migration> {
    migrator
        .iter()
        .filter(|m| !m.migration_type.is_down_migration() && !applied.contains(&m.version))
        .collect()
}

fn db_error(message: &str, source: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("{message}: {source}"), source)
}
