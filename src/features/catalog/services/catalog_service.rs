use sqlx::PgPool;

use crate::core::error::{or_degraded, AppError, Result};
use crate::features::catalog::models::{Category, Fault, Site};
use crate::features::catalog::services::LabelMaps;

/// Read-only access to the catalog (categories, faults) and sites datastores
pub struct CatalogService {
    catalog: PgPool,
    sites: PgPool,
}

impl CatalogService {
    pub fn new(catalog: PgPool, sites: PgPool) -> Self {
        Self { catalog, sites }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, nombre AS name, inf AS info
            FROM categorias
            ORDER BY id
            "#,
        )
        .fetch_all(&self.catalog)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn find_category(&self, id: i32) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, nombre AS name, inf AS info
            FROM categorias
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.catalog)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    /// Category names in lexical order
    pub async fn category_names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT nombre FROM categorias ORDER BY nombre ASC")
            .fetch_all(&self.catalog)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list category names: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn faults_for_category(&self, category_id: i32) -> Result<Vec<Fault>> {
        sqlx::query_as::<_, Fault>(
            r#"
            SELECT id, categoria_id AS category_id, descripcion AS description, inf AS info
            FROM fallas
            WHERE categoria_id = $1
            ORDER BY id
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.catalog)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list faults for category {}: {:?}", category_id, e);
            AppError::Database(e)
        })
    }

    pub async fn list_faults(&self) -> Result<Vec<Fault>> {
        sqlx::query_as::<_, Fault>(
            r#"
            SELECT id, categoria_id AS category_id, descripcion AS description, inf AS info
            FROM fallas
            ORDER BY id
            "#,
        )
        .fetch_all(&self.catalog)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list faults: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn list_sites(&self) -> Result<Vec<Site>> {
        sqlx::query_as::<_, Site>(
            r#"
            SELECT id, nombre AS name, latitud AS latitude, longitud AS longitude
            FROM sedes
            ORDER BY id
            "#,
        )
        .fetch_all(&self.sites)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list sites: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Fetch the three lookup tables, one query each.
    ///
    /// A store that cannot be reached contributes an empty table, so
    /// affected labels fall back to their markers.
    pub async fn label_maps(&self) -> LabelMaps {
        let (categories, faults, sites) =
            tokio::join!(self.list_categories(), self.list_faults(), self.list_sites());

        LabelMaps::from_rows(
            or_degraded(categories, "category labels"),
            or_degraded(faults, "fault labels"),
            or_degraded(sites, "site labels"),
        )
    }
}
