use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use diesel::Connection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::deadpool::{Object, Pool, PoolError};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection = Object<AsyncPgConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database manager for the PostgreSQL document store
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database manager with connection pool
    pub async fn new() -> Result<Self> {
        let config = Config::get();
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database.url);

        let pool = DbPool::builder(manager)
            .max_size(config.database.max_connections)
            .build()
            .context("failed to build connection pool")?;

        let db = Self { pool };

        // Test connection and run migrations
        db.initialize().await?;

        Ok(db)
    }

    /// Initialize the database by testing connection and running migrations
    async fn initialize(&self) -> Result<()> {
        let _conn = self
            .get_connection()
            .await
            .map_err(|e| anyhow!("failed to connect to the database: {}", e))?;
        info!("Successfully connected to the database");

        self.run_migrations().await
    }

    /// Run database migrations on a blocking thread
    async fn run_migrations(&self) -> Result<()> {
        let url = Config::get().database.url.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)
                .context("failed to open migration connection")?;
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| anyhow!("failed to run migrations: {}", e))?;
            Ok(())
        })
        .await
        .context("migration task panicked")??;

        info!("Database migrations applied successfully");
        Ok(())
    }

    /// Get a database connection from the pool
    pub async fn get_connection(&self) -> Result<DbConnection, PoolError> {
        self.pool.get().await
    }
}

/// Initialize database connection pool and run migrations
pub async fn init_database() -> Result<Database> {
    Database::new().await
}
