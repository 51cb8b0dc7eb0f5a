// src/config/db.rs
// DOCUMENTATION: Document store connection pool initialization
// PURPOSE: Setup the PostgreSQL pool backing the restaurant collection

use crate::config::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize PostgreSQL connection pool
/// DOCUMENTATION: Creates a lazy pool; no connection is attempted here.
/// The first store operation pings and fails after the configured
/// server-selection timeout if the store is unreachable.
/// Only a malformed DATABASE_URL fails at this point.
pub fn init_db_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    log::info!("Initializing document store pool");

    PgPoolOptions::new()
        // Runs are sequential; a single connection is enough
        .max_connections(2)
        // Server selection timeout (default 5 seconds)
        .acquire_timeout(config.db_timeout())
        // Connection idle timeout (5 minutes)
        .idle_timeout(std::time::Duration::from_secs(300))
        .connect_lazy(&config.database_url)
}
