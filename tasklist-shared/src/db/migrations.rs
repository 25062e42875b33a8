/// Embedded schema migrations
///
/// Migration files live in `migrations/` at the workspace root and are
/// compiled into the binary, so a deployed server never needs the source
/// tree to bring its schema up to date.

use sqlx::{migrate::Migrator, postgres::PgPool};
use tracing::{info, warn};

/// All migrations known to this build
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Applies every pending migration
///
/// # Errors
///
/// Returns an error if a migration fails; the failing migration is rolled
/// back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!(known = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        warn!("Migration failed: {}", e);
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}
