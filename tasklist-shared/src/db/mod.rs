/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: Embedded schema migrations (`migrations/` at the workspace root)
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
