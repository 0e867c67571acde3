/// Database migration runner
///
/// Thin wrapper over sqlx's embedded migration system. Migration files live
/// in `shopstack-shared/migrations/` and are compiled into the binary via
/// `sqlx::migrate!`, so deployments never depend on the source tree being
/// present.
///
/// # Example
///
/// ```no_run
/// use shopstack_shared::db::migrations::run_migrations;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Applies every migration that has not yet been recorded in the
/// `_sqlx_migrations` table. Safe to call on every startup.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or a previously applied
/// migration has been modified (checksum mismatch).
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
