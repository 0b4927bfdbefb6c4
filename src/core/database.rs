use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Pools for the separately hosted datastores.
///
/// Report rows reference sites and catalog entries by id only; nothing
/// enforces those references across stores.
#[derive(Clone)]
pub struct Datastores {
    pub sites: PgPool,
    pub catalog: PgPool,
    pub reports: PgPool,
    pub notifications: PgPool,
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
}

/// Pools connect on first use, so one unreachable store only degrades the
/// requests that touch it.
pub fn create_pool(config: &DatabaseConfig, url: &str) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect_lazy(url)
}

impl Datastores {
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        Ok(Self {
            sites: create_pool(config, &config.sites_url)?,
            catalog: create_pool(config, &config.catalog_url)?,
            reports: create_pool(config, &config.reports_url)?,
            notifications: create_pool(config, &config.notifications_url)?,
        })
    }

    /// Apply each store's migrations to its own pool.
    ///
    /// Version numbers are unique across stores and missing versions are
    /// ignored, so every store may also point at one shared database.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        let stores = [
            ("sites", sqlx::migrate!("./migrations/sites"), &self.sites),
            ("catalog", sqlx::migrate!("./migrations/catalog"), &self.catalog),
            ("reports", sqlx::migrate!("./migrations/reports"), &self.reports),
            (
                "notifications",
                sqlx::migrate!("./migrations/notifications"),
                &self.notifications,
            ),
        ];

        for (name, mut migrator, pool) in stores {
            migrator.set_ignore_missing(true);
            migrator.run(pool).await?;
            tracing::info!("Migrations applied for {} datastore", name);
        }

        Ok(())
    }
}
